// src/services/report_service.rs

use std::collections::BTreeSet;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{report_repo::ReportFilter, CatalogRepository, ReportRepository},
    models::report::{Report, ReportDetail, ReportFile, ReportStatus},
    services::{
        file_storage::{validate_file, StorageGateway, REPORT_ALLOWED_TYPES},
        notification_service::NotificationService,
    },
};

// Validade padrão da referência de download assinada
const PRESIGN_TTL_SECS: u64 = 3600;

// Os status formam uma ordem total; só avançamos nela.
// Repetir o status atual também é rejeitado.
fn check_transition(old: ReportStatus, new: ReportStatus) -> Result<(), AppError> {
    if old.is_terminal() {
        return Err(AppError::Validation(
            "O laudo já foi entregue; nenhuma transição é permitida.".to_string(),
        ));
    }
    if new == old {
        return Err(AppError::Validation(
            "O laudo já está neste status.".to_string(),
        ));
    }
    if new < old {
        return Err(AppError::Validation(format!(
            "Transição de status para trás não é permitida ({:?} -> {:?}).",
            old, new
        )));
    }
    Ok(())
}

// ---
// O Motor do Ciclo de Vida do Laudo
// ---
#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
    catalog_repo: CatalogRepository,
    notifier: NotificationService,
    storage: StorageGateway,
    // Teto de upload em MB (configurável; padrão 20)
    max_file_mb: usize,
    pool: PgPool,
}

impl ReportService {
    pub fn new(
        repo: ReportRepository,
        catalog_repo: CatalogRepository,
        notifier: NotificationService,
        storage: StorageGateway,
        max_file_mb: usize,
        pool: PgPool,
    ) -> Self {
        Self {
            repo,
            catalog_repo,
            notifier,
            storage,
            max_file_mb,
            pool,
        }
    }

    // Cria o agendamento: um Report BOOKED + um ReportTest IN_PROCESS por exame.
    // Toda a validação referencial acontece ANTES de qualquer escrita, e as
    // escritas entram numa única transação (tudo ou nada).
    pub async fn create_report(
        &self,
        lab_id: i32,
        patient_id: i32,
        hospital_id: Option<i32>,
        lab_test_ids: &[i32],
    ) -> Result<Report, AppError> {
        let lab = self
            .catalog_repo
            .find_lab(lab_id)
            .await?
            .ok_or(AppError::NotFound("Laboratório"))?;
        if !lab.is_active {
            return Err(AppError::Validation(
                "O laboratório está inativo.".to_string(),
            ));
        }

        let patient = self
            .catalog_repo
            .find_patient(patient_id)
            .await?
            .ok_or(AppError::NotFound("Paciente"))?;
        if patient.lab_id != lab_id {
            return Err(AppError::Validation(
                "O paciente não pertence a este laboratório.".to_string(),
            ));
        }

        if let Some(hospital_id) = hospital_id {
            let hospital = self
                .catalog_repo
                .find_hospital(hospital_id)
                .await?
                .ok_or(AppError::NotFound("Hospital"))?;
            if hospital.lab_id != lab_id {
                return Err(AppError::Validation(
                    "O hospital não pertence a este laboratório.".to_string(),
                ));
            }
        }

        // Conjunto (sem duplicatas) e não vazio
        let unique_ids: Vec<i32> = lab_test_ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if unique_ids.is_empty() {
            return Err(AppError::Validation(
                "O laudo precisa de pelo menos um exame.".to_string(),
            ));
        }

        // Resolução exata contra o laboratório dono: qualquer id não
        // encontrado invalida a operação inteira. Reportamos a contagem,
        // não os ids ofensores.
        let lab_tests = self
            .catalog_repo
            .find_lab_tests_for_lab(lab_id, &unique_ids)
            .await?;
        if lab_tests.len() != unique_ids.len() {
            return Err(AppError::Validation(format!(
                "{} de {} exames não foram encontrados ou não pertencem a este laboratório.",
                unique_ids.len() - lab_tests.len(),
                unique_ids.len()
            )));
        }

        let mut tx = self.pool.begin().await?;
        let report = self
            .repo
            .insert_report(&mut *tx, lab_id, hospital_id, patient_id)
            .await?;
        for lab_test in &lab_tests {
            self.repo
                .insert_report_test(&mut *tx, report.id, lab_test.id)
                .await?;
        }
        tx.commit().await?;

        // Fan-out síncrono, mas isolado: falha de notificação nunca
        // desfaz o laudo já gravado.
        if let Err(e) = self.notifier.on_report_created(&report, &patient.name).await {
            tracing::error!(
                "Falha no fan-out de criação do laudo {}: {}",
                report.id,
                e
            );
        }

        Ok(report)
    }

    // Avança o status e dispara o evento "status mudou".
    pub async fn transition(
        &self,
        report_id: i32,
        new_status: ReportStatus,
    ) -> Result<Report, AppError> {
        let report = self
            .repo
            .find_by_id(report_id)
            .await?
            .ok_or(AppError::NotFound("Laudo"))?;

        check_transition(report.status, new_status)?;

        let old_status = report.status;
        let updated = self
            .repo
            .update_status(report_id, new_status)
            .await?
            .ok_or(AppError::NotFound("Laudo"))?;

        match self.catalog_repo.find_patient(updated.patient_id).await {
            Ok(Some(patient)) => {
                if let Err(e) = self
                    .notifier
                    .on_status_changed(&updated, old_status, &patient.name)
                    .await
                {
                    tracing::error!(
                        "Falha no fan-out de status do laudo {}: {}",
                        updated.id,
                        e
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(
                    "Paciente {} do laudo {} não encontrado; fan-out pulado",
                    updated.patient_id,
                    updated.id
                );
            }
            Err(e) => {
                tracing::error!("Falha ao carregar paciente para o fan-out: {}", e);
            }
        }

        Ok(updated)
    }

    pub async fn list_reports(
        &self,
        filter: ReportFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Report>, AppError> {
        self.repo.list(filter, skip, limit).await
    }

    pub async fn get_report(&self, report_id: i32) -> Result<ReportDetail, AppError> {
        let report = self
            .repo
            .find_by_id(report_id)
            .await?
            .ok_or(AppError::NotFound("Laudo"))?;
        let tests = self.repo.list_tests(report_id).await?;
        let files = self.repo.list_files(report_id).await?;
        Ok(ReportDetail {
            report,
            tests,
            files,
        })
    }

    // Valida ANTES de tocar o armazenamento; depois grava os metadados.
    // Se a gravação dos metadados falhar após o upload, o objeto fica
    // órfão no store (vazamento aceitável, sem rollback distribuído).
    pub async fn attach_file(
        &self,
        report_id: i32,
        bytes: &[u8],
        content_type: &str,
        uploader_id: i32,
    ) -> Result<ReportFile, AppError> {
        self.repo
            .find_by_id(report_id)
            .await?
            .ok_or(AppError::NotFound("Laudo"))?;

        validate_file(content_type, bytes.len(), self.max_file_mb, REPORT_ALLOWED_TYPES)?;

        let folder = format!("reports/{}", report_id);
        let file_url = self.storage.upload(bytes, content_type, &folder).await?;

        self.repo
            .insert_file(report_id, &file_url, uploader_id)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Metadados do arquivo do laudo {} não gravados; objeto órfão em {}",
                    report_id,
                    file_url
                );
                e
            })
    }

    pub async fn list_files(&self, report_id: i32) -> Result<Vec<ReportFile>, AppError> {
        self.repo
            .find_by_id(report_id)
            .await?
            .ok_or(AppError::NotFound("Laudo"))?;
        self.repo.list_files(report_id).await
    }

    // Referência de download com tempo limitado; sem assinatura disponível,
    // devolve a URL permanente gravada.
    pub async fn download_reference(
        &self,
        report_id: i32,
        file_id: i32,
    ) -> Result<String, AppError> {
        self.repo
            .find_by_id(report_id)
            .await?
            .ok_or(AppError::NotFound("Laudo"))?;
        let file = self
            .repo
            .find_file(report_id, file_id)
            .await?
            .ok_or(AppError::NotFound("Arquivo do laudo"))?;

        let url = self
            .storage
            .presign(&file.file_url, PRESIGN_TTL_SECS)
            .await
            .unwrap_or(file.file_url);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(check_transition(ReportStatus::Booked, ReportStatus::SampleCollected).is_ok());
        assert!(check_transition(ReportStatus::Booked, ReportStatus::ReportReady).is_ok());
        assert!(check_transition(ReportStatus::ReportReady, ReportStatus::Delivered).is_ok());
    }

    #[test]
    fn backward_transitions_are_rejected() {
        let result = check_transition(ReportStatus::InProcess, ReportStatus::Booked);
        assert!(matches!(result, Err(AppError::Validation(_))));
        let result = check_transition(ReportStatus::Delivered, ReportStatus::ReportReady);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn repeating_the_current_status_is_rejected() {
        let result = check_transition(ReportStatus::Booked, ReportStatus::Booked);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn nothing_leaves_the_terminal_status() {
        let result = check_transition(ReportStatus::Delivered, ReportStatus::Delivered);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
