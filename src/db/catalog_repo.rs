// src/db/catalog_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{Gender, Hospital, HospitalStatus, Lab, LabTest, LabTestStatus, Patient, TestMaster},
};

// Dados mestres do tenant: laboratórios, hospitais, pacientes e ofertas de exame.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  1. LABORATÓRIOS
    // =========================================================================

    pub async fn create_lab<'e, E>(
        &self,
        executor: E,
        name: &str,
        address: &str,
        contact_info: &str,
        url: &str,
        admin_user_id: i32,
    ) -> Result<Lab, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lab>(
            r#"
            INSERT INTO labs (name, address, contact_info, url, admin_user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(contact_info)
        .bind(url)
        .bind(admin_user_id)
        .fetch_one(executor)
        .await
        .map_err(map_lab_unique_violation)
    }

    pub async fn find_lab(&self, id: i32) -> Result<Option<Lab>, AppError> {
        let lab = sqlx::query_as::<_, Lab>("SELECT * FROM labs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lab)
    }

    pub async fn list_labs(&self, skip: i64, limit: i64) -> Result<Vec<Lab>, AppError> {
        let labs = sqlx::query_as::<_, Lab>(
            "SELECT * FROM labs ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(labs)
    }

    // Atualização parcial: campos ausentes ficam como estão.
    pub async fn update_lab(
        &self,
        id: i32,
        name: Option<&str>,
        address: Option<&str>,
        contact_info: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<Lab>, AppError> {
        sqlx::query_as::<_, Lab>(
            r#"
            UPDATE labs SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                contact_info = COALESCE($4, contact_info),
                url = COALESCE($5, url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(contact_info)
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_lab_unique_violation)
    }

    // Soft delete: o laboratório nunca é removido fisicamente.
    pub async fn deactivate_lab(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE labs SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  2. HOSPITAIS
    // =========================================================================

    pub async fn create_hospital(
        &self,
        lab_id: i32,
        name: &str,
        address: &str,
        contact_info: &str,
    ) -> Result<Hospital, AppError> {
        let hospital = sqlx::query_as::<_, Hospital>(
            r#"
            INSERT INTO hospitals (lab_id, name, address, contact_info)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(lab_id)
        .bind(name)
        .bind(address)
        .bind(contact_info)
        .fetch_one(&self.pool)
        .await?;
        Ok(hospital)
    }

    pub async fn find_hospital(&self, id: i32) -> Result<Option<Hospital>, AppError> {
        let hospital = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hospital)
    }

    pub async fn list_hospitals(
        &self,
        lab_id: Option<i32>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Hospital>, AppError> {
        let hospitals = sqlx::query_as::<_, Hospital>(
            r#"
            SELECT * FROM hospitals
            WHERE ($1::INT IS NULL OR lab_id = $1)
            ORDER BY id OFFSET $2 LIMIT $3
            "#,
        )
        .bind(lab_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(hospitals)
    }

    pub async fn update_hospital(
        &self,
        id: i32,
        name: Option<&str>,
        address: Option<&str>,
        contact_info: Option<&str>,
        status: Option<HospitalStatus>,
    ) -> Result<Option<Hospital>, AppError> {
        let hospital = sqlx::query_as::<_, Hospital>(
            r#"
            UPDATE hospitals SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                contact_info = COALESCE($4, contact_info),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(contact_info)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hospital)
    }

    pub async fn deactivate_hospital(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE hospitals SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(HospitalStatus::Inactive)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  3. PACIENTES
    // =========================================================================

    pub async fn create_patient(
        &self,
        lab_id: i32,
        hospital_id: Option<i32>,
        name: &str,
        dob: NaiveDate,
        gender: Gender,
        phone: Option<&str>,
        address: Option<&str>,
        has_mediclaim: bool,
    ) -> Result<Patient, AppError> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (lab_id, hospital_id, name, dob, gender, phone, address, has_mediclaim)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(lab_id)
        .bind(hospital_id)
        .bind(name)
        .bind(dob)
        .bind(gender)
        .bind(phone)
        .bind(address)
        .bind(has_mediclaim)
        .fetch_one(&self.pool)
        .await?;
        Ok(patient)
    }

    pub async fn find_patient(&self, id: i32) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(patient)
    }

    pub async fn list_patients(
        &self,
        lab_id: Option<i32>,
        hospital_id: Option<i32>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Patient>, AppError> {
        let patients = sqlx::query_as::<_, Patient>(
            r#"
            SELECT * FROM patients
            WHERE ($1::INT IS NULL OR lab_id = $1)
              AND ($2::INT IS NULL OR hospital_id = $2)
            ORDER BY id OFFSET $3 LIMIT $4
            "#,
        )
        .bind(lab_id)
        .bind(hospital_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(patients)
    }

    pub async fn update_patient(
        &self,
        id: i32,
        hospital_id: Option<i32>,
        name: Option<&str>,
        dob: Option<NaiveDate>,
        gender: Option<Gender>,
        phone: Option<&str>,
        address: Option<&str>,
        has_mediclaim: Option<bool>,
    ) -> Result<Option<Patient>, AppError> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            UPDATE patients SET
                hospital_id = COALESCE($2, hospital_id),
                name = COALESCE($3, name),
                dob = COALESCE($4, dob),
                gender = COALESCE($5, gender),
                phone = COALESCE($6, phone),
                address = COALESCE($7, address),
                has_mediclaim = COALESCE($8, has_mediclaim),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(hospital_id)
        .bind(name)
        .bind(dob)
        .bind(gender)
        .bind(phone)
        .bind(address)
        .bind(has_mediclaim)
        .fetch_optional(&self.pool)
        .await?;
        Ok(patient)
    }

    pub async fn delete_patient(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  4. CATÁLOGO DE EXAMES (TestMaster)
    // =========================================================================

    pub async fn list_test_masters(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<TestMaster>, AppError> {
        let tests = sqlx::query_as::<_, TestMaster>(
            "SELECT * FROM test_masters ORDER BY id OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    pub async fn find_test_master(&self, id: i32) -> Result<Option<TestMaster>, AppError> {
        let test = sqlx::query_as::<_, TestMaster>("SELECT * FROM test_masters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(test)
    }

    // =========================================================================
    //  5. OFERTAS DE EXAME (LabTest)
    // =========================================================================

    pub async fn create_lab_test(
        &self,
        lab_id: i32,
        test_id: i32,
        price: Option<Decimal>,
    ) -> Result<LabTest, AppError> {
        sqlx::query_as::<_, LabTest>(
            r#"
            INSERT INTO lab_tests (lab_id, test_id, price)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(lab_id)
        .bind(test_id)
        .bind(price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // O par (lab_id, test_id) é único
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("lab_tests_lab_id_test_id_key")
                {
                    return AppError::LabTestAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn find_lab_test(&self, id: i32) -> Result<Option<LabTest>, AppError> {
        let lab_test = sqlx::query_as::<_, LabTest>("SELECT * FROM lab_tests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lab_test)
    }

    pub async fn list_lab_tests(&self, lab_id: i32) -> Result<Vec<LabTest>, AppError> {
        let lab_tests = sqlx::query_as::<_, LabTest>(
            "SELECT * FROM lab_tests WHERE lab_id = $1 ORDER BY id",
        )
        .bind(lab_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lab_tests)
    }

    // Resolve os ids pedidos CONTRA o laboratório dono; quem não pertence fica de fora.
    pub async fn find_lab_tests_for_lab(
        &self,
        lab_id: i32,
        ids: &[i32],
    ) -> Result<Vec<LabTest>, AppError> {
        let lab_tests = sqlx::query_as::<_, LabTest>(
            "SELECT * FROM lab_tests WHERE lab_id = $1 AND id = ANY($2)",
        )
        .bind(lab_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(lab_tests)
    }

    pub async fn update_lab_test(
        &self,
        id: i32,
        price: Option<Decimal>,
        status: Option<LabTestStatus>,
    ) -> Result<Option<LabTest>, AppError> {
        let lab_test = sqlx::query_as::<_, LabTest>(
            r#"
            UPDATE lab_tests SET
                price = COALESCE($2, price),
                status = COALESCE($3, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(price)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lab_test)
    }

    pub async fn deactivate_lab_test(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE lab_tests SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(LabTestStatus::Inactive)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// A migration nomeia o "UNIQUE" da coluna url como 'labs_url_key'
fn map_lab_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some("labs_url_key") {
            return AppError::LabUrlAlreadyExists;
        }
    }
    e.into()
}
