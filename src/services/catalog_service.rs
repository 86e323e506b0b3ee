// src/services/catalog_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, UserRepository},
    models::catalog::{Gender, Hospital, HospitalStatus, Lab, LabTest, LabTestStatus, Patient, TestMaster},
};

// Dados mestres: laboratórios, hospitais, pacientes e ofertas de exame.
// A regra recorrente aqui é integridade referencial dentro do tenant:
// tudo que aponta para um hospital precisa ficar no mesmo laboratório.
#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self {
            repo,
            user_repo,
            pool,
        }
    }

    // =========================================================================
    //  1. LABORATÓRIOS
    // =========================================================================

    pub async fn create_lab(
        &self,
        name: &str,
        address: &str,
        contact_info: &str,
        url: &str,
        admin_user_id: i32,
    ) -> Result<Lab, AppError> {
        // O administrador precisa existir antes do tenant
        self.user_repo
            .find_by_id(admin_user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário administrador"))?;

        // Duplicidade de url vira LabUrlAlreadyExists no repositório
        self.repo
            .create_lab(&self.pool, name, address, contact_info, url, admin_user_id)
            .await
    }

    pub async fn get_lab(&self, id: i32) -> Result<Lab, AppError> {
        self.repo
            .find_lab(id)
            .await?
            .ok_or(AppError::NotFound("Laboratório"))
    }

    pub async fn list_labs(&self, skip: i64, limit: i64) -> Result<Vec<Lab>, AppError> {
        self.repo.list_labs(skip, limit).await
    }

    pub async fn update_lab(
        &self,
        id: i32,
        name: Option<&str>,
        address: Option<&str>,
        contact_info: Option<&str>,
        url: Option<&str>,
    ) -> Result<Lab, AppError> {
        self.repo
            .update_lab(id, name, address, contact_info, url)
            .await?
            .ok_or(AppError::NotFound("Laboratório"))
    }

    pub async fn deactivate_lab(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.deactivate_lab(id).await? {
            return Err(AppError::NotFound("Laboratório"));
        }
        Ok(())
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
        self.repo
            .find_lab(lab_id)
            .await?
            .ok_or(AppError::NotFound("Laboratório"))?;
        self.repo
            .create_hospital(lab_id, name, address, contact_info)
            .await
    }

    pub async fn get_hospital(&self, id: i32) -> Result<Hospital, AppError> {
        self.repo
            .find_hospital(id)
            .await?
            .ok_or(AppError::NotFound("Hospital"))
    }

    pub async fn list_hospitals(
        &self,
        lab_id: Option<i32>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Hospital>, AppError> {
        self.repo.list_hospitals(lab_id, skip, limit).await
    }

    pub async fn update_hospital(
        &self,
        id: i32,
        name: Option<&str>,
        address: Option<&str>,
        contact_info: Option<&str>,
        status: Option<HospitalStatus>,
    ) -> Result<Hospital, AppError> {
        self.repo
            .update_hospital(id, name, address, contact_info, status)
            .await?
            .ok_or(AppError::NotFound("Hospital"))
    }

    pub async fn deactivate_hospital(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.deactivate_hospital(id).await? {
            return Err(AppError::NotFound("Hospital"));
        }
        Ok(())
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
        self.repo
            .find_lab(lab_id)
            .await?
            .ok_or(AppError::NotFound("Laboratório"))?;

        if let Some(hospital_id) = hospital_id {
            self.check_hospital_in_lab(hospital_id, lab_id).await?;
        }

        self.repo
            .create_patient(
                lab_id,
                hospital_id,
                name,
                dob,
                gender,
                phone,
                address,
                has_mediclaim,
            )
            .await
    }

    pub async fn get_patient(&self, id: i32) -> Result<Patient, AppError> {
        self.repo
            .find_patient(id)
            .await?
            .ok_or(AppError::NotFound("Paciente"))
    }

    pub async fn list_patients(
        &self,
        lab_id: Option<i32>,
        hospital_id: Option<i32>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Patient>, AppError> {
        self.repo.list_patients(lab_id, hospital_id, skip, limit).await
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
    ) -> Result<Patient, AppError> {
        let patient = self
            .repo
            .find_patient(id)
            .await?
            .ok_or(AppError::NotFound("Paciente"))?;

        // O novo hospital precisa ficar no laboratório do paciente
        if let Some(hospital_id) = hospital_id {
            self.check_hospital_in_lab(hospital_id, patient.lab_id).await?;
        }

        self.repo
            .update_patient(id, hospital_id, name, dob, gender, phone, address, has_mediclaim)
            .await?
            .ok_or(AppError::NotFound("Paciente"))
    }

    pub async fn delete_patient(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.delete_patient(id).await? {
            return Err(AppError::NotFound("Paciente"));
        }
        Ok(())
    }

    async fn check_hospital_in_lab(&self, hospital_id: i32, lab_id: i32) -> Result<(), AppError> {
        let hospital = self
            .repo
            .find_hospital(hospital_id)
            .await?
            .ok_or(AppError::NotFound("Hospital"))?;
        if hospital.lab_id != lab_id {
            return Err(AppError::Validation(
                "O hospital não pertence a este laboratório.".to_string(),
            ));
        }
        Ok(())
    }

    // =========================================================================
    //  4. CATÁLOGO E OFERTAS DE EXAME
    // =========================================================================

    pub async fn list_test_masters(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<TestMaster>, AppError> {
        self.repo.list_test_masters(skip, limit).await
    }

    pub async fn get_test_master(&self, id: i32) -> Result<TestMaster, AppError> {
        self.repo
            .find_test_master(id)
            .await?
            .ok_or(AppError::NotFound("Exame do catálogo"))
    }

    pub async fn create_lab_test(
        &self,
        lab_id: i32,
        test_id: i32,
        price: Option<Decimal>,
    ) -> Result<LabTest, AppError> {
        self.repo
            .find_lab(lab_id)
            .await?
            .ok_or(AppError::NotFound("Laboratório"))?;
        self.repo
            .find_test_master(test_id)
            .await?
            .ok_or(AppError::NotFound("Exame do catálogo"))?;

        // O par (lab, exame) é único; duplicata vira LabTestAlreadyExists
        self.repo.create_lab_test(lab_id, test_id, price).await
    }

    pub async fn list_lab_tests(&self, lab_id: i32) -> Result<Vec<LabTest>, AppError> {
        self.repo
            .find_lab(lab_id)
            .await?
            .ok_or(AppError::NotFound("Laboratório"))?;
        self.repo.list_lab_tests(lab_id).await
    }

    pub async fn update_lab_test(
        &self,
        id: i32,
        price: Option<Decimal>,
        status: Option<LabTestStatus>,
    ) -> Result<LabTest, AppError> {
        self.repo
            .update_lab_test(id, price, status)
            .await?
            .ok_or(AppError::NotFound("Oferta de exame"))
    }

    pub async fn deactivate_lab_test(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.deactivate_lab_test(id).await? {
            return Err(AppError::NotFound("Oferta de exame"));
        }
        Ok(())
    }
}
