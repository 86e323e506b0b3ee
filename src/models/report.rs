// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// ---
// 1. Status do Laudo
// ---
// Os status formam uma ordem total; a ordem de declaração define
// o `Ord` derivado (BOOKED < SAMPLE_COLLECTED < ... < DELIVERED).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "report_status", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum ReportStatus {
    Booked,
    SampleCollected,
    InProcess,
    ReportReady,
    Delivered,
}

impl ReportStatus {
    // DELIVERED é terminal; nenhuma transição sai dele.
    pub fn is_terminal(self) -> bool {
        self == ReportStatus::Delivered
    }
}

// ---
// 2. Report (O Laudo)
// ---
// A entidade central do fluxo: um agendamento de exames para um paciente.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Report {
    pub id: i32,
    pub lab_id: i32,
    pub hospital_id: Option<i32>,
    pub patient_id: i32,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// 3. ReportTest (Execução de um exame dentro do Laudo)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_test_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportTestStatus {
    InProcess,
    Done,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReportTest {
    pub id: i32,
    pub report_id: i32,
    pub lab_test_id: i32,
    pub result_value: Option<String>,
    pub status: ReportTestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// 4. ReportFile (Documento de resultado anexado)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReportFile {
    pub id: i32,
    pub report_id: i32,
    pub file_url: String,
    pub uploaded_by: i32,
    pub uploaded_at: DateTime<Utc>,
    pub is_signed: bool,
}

// ---
// 5. Visão detalhada (laudo + exames + arquivos)
// ---
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportDetail {
    pub report: Report,
    pub tests: Vec<ReportTest>,
    pub files: Vec<ReportFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_form_a_total_order() {
        assert!(ReportStatus::Booked < ReportStatus::SampleCollected);
        assert!(ReportStatus::SampleCollected < ReportStatus::InProcess);
        assert!(ReportStatus::InProcess < ReportStatus::ReportReady);
        assert!(ReportStatus::ReportReady < ReportStatus::Delivered);
    }

    #[test]
    fn only_delivered_is_terminal() {
        assert!(ReportStatus::Delivered.is_terminal());
        assert!(!ReportStatus::Booked.is_terminal());
        assert!(!ReportStatus::ReportReady.is_terminal());
    }

    #[test]
    fn status_serializes_with_its_tag() {
        assert_eq!(
            serde_json::to_string(&ReportStatus::SampleCollected).unwrap(),
            "\"SAMPLE_COLLECTED\""
        );
        let parsed: ReportStatus = serde_json::from_str("\"REPORT_READY\"").unwrap();
        assert_eq!(parsed, ReportStatus::ReportReady);
    }
}
