// src/handlers/requests.rs

// Atalhos de ciclo de vida voltados ao courier: as rotas de "requests"
// enxergam os mesmos laudos, mas com ações de status fixas. Todas as
// mudanças passam pelo motor de transição (ordem e fan-out valem aqui).

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    db::report_repo::ReportFilter,
    handlers::Pagination,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{require_role, LAB_STAFF, LAB_TEAM},
    },
    models::report::{Report, ReportDetail, ReportStatus},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestStatusPayload {
    pub status: ReportStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestActionResponse {
    pub message: String,
    pub request_id: i32,
}

#[utoipa::path(
    get,
    path = "/api/v1/requests",
    params(Pagination),
    responses((status = 200, description = "Solicitações de coleta", body = [Report])),
    security(("api_jwt" = [])),
    tag = "Requests"
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Report>>, AppError> {
    require_role(&user, LAB_TEAM)?;
    let reports = app_state
        .report_service
        .list_reports(ReportFilter::default(), page.skip, page.limit)
        .await?;
    Ok(Json(reports))
}

#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Detalhes da solicitação", body = ReportDetail),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = [])),
    tag = "Requests"
)]
pub async fn view_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<ReportDetail>, AppError> {
    require_role(&user, LAB_TEAM)?;
    let detail = app_state.report_service.get_report(id).await?;
    Ok(Json(detail))
}

// O laboratório pode definir o status da solicitação diretamente
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}/status",
    params(("id" = i32, Path, description = "ID da solicitação")),
    request_body = RequestStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Report),
        (status = 400, description = "Transição de status inválida"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = [])),
    tag = "Requests"
)]
pub async fn update_request_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<RequestStatusPayload>,
) -> Result<Json<Report>, AppError> {
    require_role(&user, LAB_STAFF)?;
    let report = app_state.report_service.transition(id, payload.status).await?;
    Ok(Json(report))
}

// Coleta confirmada: a solicitação entra em processamento
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/confirm-pickup",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Coleta confirmada", body = RequestActionResponse),
        (status = 400, description = "Transição de status inválida"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = [])),
    tag = "Requests"
)]
pub async fn confirm_pickup(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<RequestActionResponse>, AppError> {
    require_role(&user, LAB_TEAM)?;
    app_state
        .report_service
        .transition(id, ReportStatus::InProcess)
        .await?;
    Ok(Json(RequestActionResponse {
        message: "Coleta confirmada.".to_string(),
        request_id: id,
    }))
}

// Resultado pronto: a solicitação fica aguardando entrega
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/upload-report",
    params(("id" = i32, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Laudo marcado como pronto", body = RequestActionResponse),
        (status = 400, description = "Transição de status inválida"),
        (status = 404, description = "Solicitação não encontrada")
    ),
    security(("api_jwt" = [])),
    tag = "Requests"
)]
pub async fn upload_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<RequestActionResponse>, AppError> {
    require_role(&user, LAB_TEAM)?;
    app_state
        .report_service
        .transition(id, ReportStatus::ReportReady)
        .await?;
    Ok(Json(RequestActionResponse {
        message: "Laudo enviado.".to_string(),
        request_id: id,
    }))
}
