// src/db/report_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::report::{Report, ReportFile, ReportStatus, ReportTest},
};

// Filtros da listagem de laudos (todos opcionais)
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportFilter {
    pub lab_id: Option<i32>,
    pub hospital_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub status: Option<ReportStatus>,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // O laudo nasce BOOKED; as linhas de exame entram na mesma transação (via executor).
    pub async fn insert_report<'e, E>(
        &self,
        executor: E,
        lab_id: i32,
        hospital_id: Option<i32>,
        patient_id: i32,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (lab_id, hospital_id, patient_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(lab_id)
        .bind(hospital_id)
        .bind(patient_id)
        .fetch_one(executor)
        .await?;
        Ok(report)
    }

    pub async fn insert_report_test<'e, E>(
        &self,
        executor: E,
        report_id: i32,
        lab_test_id: i32,
    ) -> Result<ReportTest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report_test = sqlx::query_as::<_, ReportTest>(
            r#"
            INSERT INTO report_tests (report_id, lab_test_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(lab_test_id)
        .fetch_one(executor)
        .await?;
        Ok(report_test)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    pub async fn list(
        &self,
        filter: ReportFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT * FROM reports
            WHERE ($1::INT IS NULL OR lab_id = $1)
              AND ($2::INT IS NULL OR hospital_id = $2)
              AND ($3::INT IS NULL OR patient_id = $3)
              AND ($4::report_status IS NULL OR status = $4)
            ORDER BY id OFFSET $5 LIMIT $6
            "#,
        )
        .bind(filter.lab_id)
        .bind(filter.hospital_id)
        .bind(filter.patient_id)
        .bind(filter.status)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    pub async fn update_status(
        &self,
        id: i32,
        status: ReportStatus,
    ) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    pub async fn list_tests(&self, report_id: i32) -> Result<Vec<ReportTest>, AppError> {
        let tests = sqlx::query_as::<_, ReportTest>(
            "SELECT * FROM report_tests WHERE report_id = $1 ORDER BY id",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    // ---
    // Arquivos de laudo
    // ---

    pub async fn insert_file(
        &self,
        report_id: i32,
        file_url: &str,
        uploaded_by: i32,
    ) -> Result<ReportFile, AppError> {
        let file = sqlx::query_as::<_, ReportFile>(
            r#"
            INSERT INTO report_files (report_id, file_url, uploaded_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(file_url)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(file)
    }

    pub async fn list_files(&self, report_id: i32) -> Result<Vec<ReportFile>, AppError> {
        let files = sqlx::query_as::<_, ReportFile>(
            "SELECT * FROM report_files WHERE report_id = $1 ORDER BY id",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    // O arquivo precisa pertencer ao laudo pedido.
    pub async fn find_file(
        &self,
        report_id: i32,
        file_id: i32,
    ) -> Result<Option<ReportFile>, AppError> {
        let file = sqlx::query_as::<_, ReportFile>(
            "SELECT * FROM report_files WHERE id = $1 AND report_id = $2",
        )
        .bind(file_id)
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }
}
