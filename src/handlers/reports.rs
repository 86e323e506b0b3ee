// src/handlers/reports.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::report_repo::ReportFilter,
    handlers::Pagination,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{require_role, HOSPITAL_ONLY, LAB_STAFF},
    },
    models::report::{Report, ReportDetail, ReportFile, ReportStatus},
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReportPayload {
    pub lab_id: i32,
    pub hospital_id: Option<i32>,
    pub patient_id: i32,

    // Exames a serem realizados
    #[validate(length(min = 1, message = "Informe ao menos um exame."))]
    pub lab_test_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReportPayload {
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportListFilter {
    pub lab_id: Option<i32>,
    pub hospital_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadLinkResponse {
    pub url: String,
}

// ---
// Handlers
// ---

// Agendamento feito pela equipe do laboratório
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = CreateReportPayload,
    responses(
        (status = 201, description = "Laudo agendado", body = Report),
        (status = 400, description = "Exames inválidos ou fora do laboratório"),
        (status = 404, description = "Laboratório, paciente ou hospital não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn create_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, LAB_STAFF)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let report = app_state
        .report_service
        .create_report(
            payload.lab_id,
            payload.patient_id,
            payload.hospital_id,
            &payload.lab_test_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

// Agendamento solicitado pelo hospital; aqui o hospital_id é obrigatório
#[utoipa::path(
    post,
    path = "/api/v1/reports/request",
    request_body = CreateReportPayload,
    responses(
        (status = 201, description = "Laudo solicitado", body = Report),
        (status = 400, description = "hospital_id ausente ou exames inválidos"),
        (status = 404, description = "Laboratório, paciente ou hospital não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn request_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, HOSPITAL_ONLY)?;
    payload.validate().map_err(AppError::ValidationError)?;

    if payload.hospital_id.is_none() {
        return Err(AppError::Validation(
            "O campo hospitalId é obrigatório para solicitações de hospital.".to_string(),
        ));
    }

    let report = app_state
        .report_service
        .create_report(
            payload.lab_id,
            payload.patient_id,
            payload.hospital_id,
            &payload.lab_test_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(ReportListFilter, Pagination),
    responses((status = 200, description = "Lista de laudos", body = [Report])),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn get_reports(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<ReportListFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Report>>, AppError> {
    require_role(&user, LAB_STAFF)?;

    let reports = app_state
        .report_service
        .list_reports(
            ReportFilter {
                lab_id: filter.lab_id,
                hospital_id: filter.hospital_id,
                patient_id: filter.patient_id,
                status: filter.status,
            },
            page.skip,
            page.limit,
        )
        .await?;

    Ok(Json(reports))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = i32, Path, description = "ID do laudo")),
    responses(
        (status = 200, description = "Laudo com exames e arquivos", body = ReportDetail),
        (status = 404, description = "Laudo não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<ReportDetail>, AppError> {
    require_role(&user, LAB_STAFF)?;
    let detail = app_state.report_service.get_report(id).await?;
    Ok(Json(detail))
}

// Atualização de status; dispara o fan-out de notificações quando muda
#[utoipa::path(
    put,
    path = "/api/v1/reports/{id}",
    params(("id" = i32, Path, description = "ID do laudo")),
    request_body = UpdateReportPayload,
    responses(
        (status = 200, description = "Laudo atualizado", body = Report),
        (status = 400, description = "Transição de status inválida"),
        (status = 404, description = "Laudo não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn update_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateReportPayload>,
) -> Result<Json<Report>, AppError> {
    require_role(&user, LAB_STAFF)?;

    let report = match payload.status {
        Some(status) => app_state.report_service.transition(id, status).await?,
        // Sem status no corpo, nada a mudar
        None => app_state.report_service.get_report(id).await?.report,
    };

    Ok(Json(report))
}

// Upload multipart do documento de resultado (campo "file"; apenas PDF)
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/upload",
    params(("id" = i32, Path, description = "ID do laudo")),
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Arquivo anexado", body = ReportFile),
        (status = 400, description = "Arquivo rejeitado na validação"),
        (status = 404, description = "Laudo não encontrado"),
        (status = 503, description = "Armazenamento indisponível")
    ),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn upload_report_file(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, LAB_STAFF)?;

    // Procura o campo "file" no corpo multipart
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Corpo multipart inválido: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Validation("O arquivo enviado não informou content-type.".to_string())
            })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Falha ao ler o arquivo enviado: {e}")))?;

        let report_file = app_state
            .report_service
            .attach_file(id, &bytes, &content_type, user.id)
            .await?;

        return Ok((StatusCode::CREATED, Json(report_file)));
    }

    Err(AppError::Validation(
        "Nenhum campo 'file' foi enviado.".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/files",
    params(("id" = i32, Path, description = "ID do laudo")),
    responses(
        (status = 200, description = "Arquivos do laudo", body = [ReportFile]),
        (status = 404, description = "Laudo não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn get_report_files(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ReportFile>>, AppError> {
    require_role(&user, LAB_STAFF)?;
    let files = app_state.report_service.list_files(id).await?;
    Ok(Json(files))
}

// Referência de download para o hospital (assinada quando possível)
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/files/{file_id}/download",
    params(
        ("id" = i32, Path, description = "ID do laudo"),
        ("file_id" = i32, Path, description = "ID do arquivo")
    ),
    responses(
        (status = 200, description = "URL de download", body = DownloadLinkResponse),
        (status = 404, description = "Laudo ou arquivo não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn download_report_file(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((id, file_id)): Path<(i32, i32)>,
) -> Result<Json<DownloadLinkResponse>, AppError> {
    require_role(&user, HOSPITAL_ONLY)?;
    let url = app_state.report_service.download_reference(id, file_id).await?;
    Ok(Json(DownloadLinkResponse { url }))
}
