// src/models/catalog.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// ---
// 1. Lab (O "Tenant")
// ---
// A raiz do tenant. Nunca é removido fisicamente, apenas desativado.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Lab {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub contact_info: String,
    // Slug único e global do laboratório
    pub url: String,
    pub admin_user_id: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// 2. Hospital
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "hospital_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HospitalStatus {
    Active,
    Inactive,
}

// Pertence a exatamente um Lab.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Hospital {
    pub id: i32,
    pub lab_id: i32,
    pub name: String,
    pub address: String,
    pub contact_info: String,
    pub status: HospitalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// 3. Patient
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "gender", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

// Pertence a um Lab e, opcionalmente, a um Hospital do mesmo Lab.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: i32,
    pub lab_id: i32,
    pub hospital_id: Option<i32>,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub has_mediclaim: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// 4. TestMaster (Catálogo de exames)
// ---
// Definição de um tipo de exame, independente de laboratório.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TestMaster {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    // Tipo de amostra (sangue, urina, etc.)
    pub sample_type: String,
    // Prazo esperado em horas
    pub turnaround_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---
// 5. LabTest (Oferta de exame de um Lab)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lab_test_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabTestStatus {
    Active,
    Inactive,
}

// Único por par (lab_id, test_id).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LabTest {
    pub id: i32,
    pub lab_id: i32,
    pub test_id: i32,
    pub price: Option<Decimal>,
    pub status: LabTestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
