// src/services/notification_service.rs

use crate::{
    common::error::AppError,
    db::{NotificationRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        notification::Notification,
        report::{Report, ReportStatus},
    },
};

// Papéis do laboratório avisados quando um laudo é criado
const LAB_CREATED_ROLES: &[UserRole] =
    &[UserRole::LabAdmin, UserRole::LabStaff, UserRole::LabCourier];

// Papéis do laboratório avisados nas mudanças de status que exigem ação do lab
const LAB_STATUS_ROLES: &[UserRole] = &[UserRole::LabAdmin, UserRole::LabStaff];

// ---
// Templates (funções puras, testáveis sem banco)
// ---

fn created_lab_message(patient_name: &str, report_id: i32) -> String {
    format!(
        "Novo agendamento de laudo criado para o paciente {} (Laudo ID: {})",
        patient_name, report_id
    )
}

fn created_hospital_message(patient_name: &str, report_id: i32) -> String {
    format!(
        "Agendamento de laudo confirmado para o paciente {} (Laudo ID: {})",
        patient_name, report_id
    )
}

// BOOKED não tem template: é o status de criação e não re-notifica.
fn status_change_message(
    new_status: ReportStatus,
    patient_name: &str,
    report_id: i32,
) -> Option<String> {
    let prefix = match new_status {
        ReportStatus::Booked => return None,
        ReportStatus::SampleCollected => "Amostra coletada para o laudo",
        ReportStatus::InProcess => "O processamento do laudo foi iniciado",
        ReportStatus::ReportReady => "O laudo está pronto para entrega",
        ReportStatus::Delivered => "O laudo foi entregue",
    };
    Some(format!(
        "{} - Paciente: {} (Laudo ID: {})",
        prefix, patient_name, report_id
    ))
}

// O time do laboratório só é avisado quando precisa agir ou confirmar.
fn lab_notified_on(new_status: ReportStatus) -> bool {
    matches!(
        new_status,
        ReportStatus::ReportReady | ReportStatus::Delivered
    )
}

// ---
// O Despachante
// ---
// Reage aos eventos do ciclo de vida do laudo criando uma linha de
// notificação por destinatário. A ordem de envio entre destinatários
// não é garantida.
#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    user_repo: UserRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self { repo, user_repo }
    }

    // Evento "laudo criado": avisa o time do laboratório e, se houver
    // hospital de origem, os usuários do hospital (com outro template).
    pub async fn on_report_created(
        &self,
        report: &Report,
        patient_name: &str,
    ) -> Result<(), AppError> {
        let lab_users = self
            .user_repo
            .find_active_by_lab_and_roles(report.lab_id, LAB_CREATED_ROLES)
            .await?;
        let message = created_lab_message(patient_name, report.id);
        for user in &lab_users {
            self.notify(user, &message, report.id).await;
        }

        if let Some(hospital_id) = report.hospital_id {
            let hospital_users = self.user_repo.find_active_hospital_users(hospital_id).await?;
            let message = created_hospital_message(patient_name, report.id);
            for user in &hospital_users {
                self.notify(user, &message, report.id).await;
            }
        }

        Ok(())
    }

    // Evento "status mudou": hospital sempre (quando houver template),
    // laboratório apenas em REPORT_READY e DELIVERED.
    pub async fn on_status_changed(
        &self,
        report: &Report,
        old_status: ReportStatus,
        patient_name: &str,
    ) -> Result<(), AppError> {
        let Some(message) = status_change_message(report.status, patient_name, report.id) else {
            // Sem template para o novo status: nada a enviar.
            return Ok(());
        };

        tracing::info!(
            "Laudo {} mudou de {:?} para {:?}; despachando notificações",
            report.id,
            old_status,
            report.status
        );

        if let Some(hospital_id) = report.hospital_id {
            let hospital_users = self.user_repo.find_active_hospital_users(hospital_id).await?;
            for user in &hospital_users {
                self.notify(user, &message, report.id).await;
            }
        }

        if lab_notified_on(report.status) {
            let lab_users = self
                .user_repo
                .find_active_by_lab_and_roles(report.lab_id, LAB_STATUS_ROLES)
                .await?;
            for user in &lab_users {
                self.notify(user, &message, report.id).await;
            }
        }

        Ok(())
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        limit: i64,
    ) -> Result<Vec<Notification>, AppError> {
        self.repo.list_for_user(user_id, limit).await
    }

    // Idempotente: true enquanto a notificação pertencer ao usuário.
    pub async fn mark_read(&self, notification_id: i32, user_id: i32) -> Result<bool, AppError> {
        self.repo.mark_read(notification_id, user_id).await
    }

    // Melhor esforço por destinatário: uma falha aqui nunca desfaz a
    // mutação do laudo que disparou o evento.
    async fn notify(&self, user: &User, message: &str, report_id: i32) {
        if let Err(e) = self.repo.insert(user.id, Some(report_id), message).await {
            tracing::error!(
                "Falha ao criar notificação para o usuário {}: {}",
                user.id,
                e
            );
            return;
        }
        self.send_email_placeholder(&user.email, "Atualização de laudo", message);
    }

    // Canal externo ainda não integrado (SendGrid, SES, etc.)
    fn send_email_placeholder(&self, user_email: &str, subject: &str, message: &str) {
        tracing::info!("E-mail para {}: {} - {}", user_email, subject, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_messages_carry_patient_and_report_id() {
        let lab = created_lab_message("John Doe", 7);
        let hospital = created_hospital_message("John Doe", 7);
        assert!(lab.contains("John Doe") && lab.contains("7"));
        assert!(hospital.contains("John Doe") && hospital.contains("7"));
        // Os dois lados recebem templates distintos
        assert_ne!(lab, hospital);
    }

    #[test]
    fn booked_has_no_status_template() {
        assert!(status_change_message(ReportStatus::Booked, "John Doe", 1).is_none());
    }

    #[test]
    fn every_other_status_has_a_template() {
        for status in [
            ReportStatus::SampleCollected,
            ReportStatus::InProcess,
            ReportStatus::ReportReady,
            ReportStatus::Delivered,
        ] {
            let message = status_change_message(status, "John Doe", 9).unwrap();
            assert!(message.contains("John Doe") && message.contains("9"));
        }
    }

    #[test]
    fn lab_is_only_notified_when_it_must_act() {
        assert!(lab_notified_on(ReportStatus::ReportReady));
        assert!(lab_notified_on(ReportStatus::Delivered));
        assert!(!lab_notified_on(ReportStatus::SampleCollected));
        assert!(!lab_notified_on(ReportStatus::InProcess));
        assert!(!lab_notified_on(ReportStatus::Booked));
    }

    #[test]
    fn courier_is_told_about_new_bookings_but_not_status_changes() {
        assert!(LAB_CREATED_ROLES.contains(&UserRole::LabCourier));
        assert!(!LAB_STATUS_ROLES.contains(&UserRole::LabCourier));
    }
}
