// src/handlers/labs.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{MessageResponse, Pagination},
    middleware::{auth::AuthenticatedUser, rbac::{require_role, LAB_ADMIN_ONLY}},
    models::catalog::Lab,
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLabPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[validate(length(min = 1, message = "As informações de contato são obrigatórias."))]
    pub contact_info: String,

    // Slug único e global do laboratório
    #[validate(length(min = 1, message = "A URL é obrigatória."))]
    pub url: String,

    pub admin_user_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLabPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_info: Option<String>,
    pub url: Option<String>,
}

// ---
// Handlers (todas as rotas de Lab exigem LAB_ADMIN)
// ---

#[utoipa::path(
    post,
    path = "/api/v1/labs",
    request_body = CreateLabPayload,
    responses(
        (status = 201, description = "Laboratório criado", body = Lab),
        (status = 400, description = "URL já em uso ou payload inválido"),
        (status = 404, description = "Usuário administrador não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Labs"
)]
pub async fn create_lab(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateLabPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let lab = app_state
        .catalog_service
        .create_lab(
            &payload.name,
            &payload.address,
            &payload.contact_info,
            &payload.url,
            payload.admin_user_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lab)))
}

#[utoipa::path(
    get,
    path = "/api/v1/labs",
    params(Pagination),
    responses((status = 200, description = "Lista de laboratórios", body = [Lab])),
    security(("api_jwt" = [])),
    tag = "Labs"
)]
pub async fn get_labs(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Lab>>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    let labs = app_state.catalog_service.list_labs(page.skip, page.limit).await?;
    Ok(Json(labs))
}

#[utoipa::path(
    get,
    path = "/api/v1/labs/{id}",
    params(("id" = i32, Path, description = "ID do laboratório")),
    responses(
        (status = 200, description = "Laboratório", body = Lab),
        (status = 404, description = "Laboratório não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Labs"
)]
pub async fn get_lab(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Lab>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    let lab = app_state.catalog_service.get_lab(id).await?;
    Ok(Json(lab))
}

#[utoipa::path(
    put,
    path = "/api/v1/labs/{id}",
    params(("id" = i32, Path, description = "ID do laboratório")),
    request_body = UpdateLabPayload,
    responses(
        (status = 200, description = "Laboratório atualizado", body = Lab),
        (status = 400, description = "URL já em uso"),
        (status = 404, description = "Laboratório não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Labs"
)]
pub async fn update_lab(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateLabPayload>,
) -> Result<Json<Lab>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;

    let lab = app_state
        .catalog_service
        .update_lab(
            id,
            payload.name.as_deref(),
            payload.address.as_deref(),
            payload.contact_info.as_deref(),
            payload.url.as_deref(),
        )
        .await?;

    Ok(Json(lab))
}

// Soft delete: apenas marca is_active = false
#[utoipa::path(
    delete,
    path = "/api/v1/labs/{id}",
    params(("id" = i32, Path, description = "ID do laboratório")),
    responses(
        (status = 200, description = "Laboratório desativado", body = MessageResponse),
        (status = 404, description = "Laboratório não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Labs"
)]
pub async fn delete_lab(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    app_state.catalog_service.deactivate_lab(id).await?;
    Ok(Json(MessageResponse {
        message: "Laboratório desativado com sucesso.".to_string(),
    }))
}
