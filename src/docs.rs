// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Labs ---
        handlers::labs::create_lab,
        handlers::labs::get_labs,
        handlers::labs::get_lab,
        handlers::labs::update_lab,
        handlers::labs::delete_lab,

        // --- Hospitals ---
        handlers::hospitals::create_hospital,
        handlers::hospitals::get_hospitals,
        handlers::hospitals::get_hospital,
        handlers::hospitals::update_hospital,
        handlers::hospitals::delete_hospital,

        // --- Patients ---
        handlers::patients::create_patient,
        handlers::patients::get_patients,
        handlers::patients::get_patient,
        handlers::patients::update_patient,
        handlers::patients::delete_patient,

        // --- Tests ---
        handlers::tests::get_test_masters,
        handlers::tests::get_test_master,
        handlers::tests::create_lab_test,
        handlers::tests::get_lab_tests,
        handlers::tests::update_lab_test,
        handlers::tests::delete_lab_test,

        // --- Reports ---
        handlers::reports::create_report,
        handlers::reports::request_report,
        handlers::reports::get_reports,
        handlers::reports::get_report,
        handlers::reports::update_report,
        handlers::reports::upload_report_file,
        handlers::reports::get_report_files,
        handlers::reports::download_report_file,

        // --- Requests (courier) ---
        handlers::requests::list_requests,
        handlers::requests::view_request,
        handlers::requests::update_request_status,
        handlers::requests::confirm_pickup,
        handlers::requests::upload_report,

        // --- Notifications ---
        handlers::notifications::get_notifications,
        handlers::notifications::mark_notification_read,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::Lab,
            models::catalog::HospitalStatus,
            models::catalog::Hospital,
            models::catalog::Gender,
            models::catalog::Patient,
            models::catalog::TestMaster,
            models::catalog::LabTestStatus,
            models::catalog::LabTest,

            // --- Reports ---
            models::report::ReportStatus,
            models::report::Report,
            models::report::ReportTestStatus,
            models::report::ReportTest,
            models::report::ReportFile,
            models::report::ReportDetail,

            // --- Notifications ---
            models::notification::NotificationStatus,
            models::notification::Notification,
            models::notification::MarkReadResponse,

            // --- Payloads ---
            handlers::MessageResponse,
            handlers::labs::CreateLabPayload,
            handlers::labs::UpdateLabPayload,
            handlers::hospitals::CreateHospitalPayload,
            handlers::hospitals::UpdateHospitalPayload,
            handlers::patients::CreatePatientPayload,
            handlers::patients::UpdatePatientPayload,
            handlers::tests::CreateLabTestPayload,
            handlers::tests::UpdateLabTestPayload,
            handlers::reports::CreateReportPayload,
            handlers::reports::UpdateReportPayload,
            handlers::reports::DownloadLinkResponse,
            handlers::requests::RequestStatusPayload,
            handlers::requests::RequestActionResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Labs", description = "Laboratórios (tenants)"),
        (name = "Hospitals", description = "Hospitais de um laboratório"),
        (name = "Patients", description = "Pacientes"),
        (name = "Tests", description = "Catálogo e ofertas de exames"),
        (name = "Reports", description = "Laudos: agendamento, status e arquivos"),
        (name = "Requests", description = "Atalhos de coleta para o courier"),
        (name = "Notifications", description = "Notificações por usuário")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
