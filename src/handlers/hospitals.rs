// src/handlers/hospitals.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{MessageResponse, Pagination},
    middleware::{auth::AuthenticatedUser, rbac::{require_role, LAB_STAFF}},
    models::catalog::{Hospital, HospitalStatus},
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateHospitalPayload {
    pub lab_id: i32,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[validate(length(min = 1, message = "As informações de contato são obrigatórias."))]
    pub contact_info: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateHospitalPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_info: Option<String>,
    pub status: Option<HospitalStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HospitalFilter {
    pub lab_id: Option<i32>,
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/v1/hospitals",
    request_body = CreateHospitalPayload,
    responses(
        (status = 201, description = "Hospital criado", body = Hospital),
        (status = 404, description = "Laboratório não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Hospitals"
)]
pub async fn create_hospital(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateHospitalPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, LAB_STAFF)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let hospital = app_state
        .catalog_service
        .create_hospital(
            payload.lab_id,
            &payload.name,
            &payload.address,
            &payload.contact_info,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(hospital)))
}

#[utoipa::path(
    get,
    path = "/api/v1/hospitals",
    params(HospitalFilter, Pagination),
    responses((status = 200, description = "Lista de hospitais", body = [Hospital])),
    security(("api_jwt" = [])),
    tag = "Hospitals"
)]
pub async fn get_hospitals(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<HospitalFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Hospital>>, AppError> {
    require_role(&user, LAB_STAFF)?;
    let hospitals = app_state
        .catalog_service
        .list_hospitals(filter.lab_id, page.skip, page.limit)
        .await?;
    Ok(Json(hospitals))
}

#[utoipa::path(
    get,
    path = "/api/v1/hospitals/{id}",
    params(("id" = i32, Path, description = "ID do hospital")),
    responses(
        (status = 200, description = "Hospital", body = Hospital),
        (status = 404, description = "Hospital não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Hospitals"
)]
pub async fn get_hospital(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Hospital>, AppError> {
    require_role(&user, LAB_STAFF)?;
    let hospital = app_state.catalog_service.get_hospital(id).await?;
    Ok(Json(hospital))
}

#[utoipa::path(
    put,
    path = "/api/v1/hospitals/{id}",
    params(("id" = i32, Path, description = "ID do hospital")),
    request_body = UpdateHospitalPayload,
    responses(
        (status = 200, description = "Hospital atualizado", body = Hospital),
        (status = 404, description = "Hospital não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Hospitals"
)]
pub async fn update_hospital(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateHospitalPayload>,
) -> Result<Json<Hospital>, AppError> {
    require_role(&user, LAB_STAFF)?;

    let hospital = app_state
        .catalog_service
        .update_hospital(
            id,
            payload.name.as_deref(),
            payload.address.as_deref(),
            payload.contact_info.as_deref(),
            payload.status,
        )
        .await?;

    Ok(Json(hospital))
}

// Soft delete: o hospital fica INACTIVE
#[utoipa::path(
    delete,
    path = "/api/v1/hospitals/{id}",
    params(("id" = i32, Path, description = "ID do hospital")),
    responses(
        (status = 200, description = "Hospital desativado", body = MessageResponse),
        (status = 404, description = "Hospital não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Hospitals"
)]
pub async fn delete_hospital(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&user, LAB_STAFF)?;
    app_state.catalog_service.deactivate_hospital(id).await?;
    Ok(Json(MessageResponse {
        message: "Hospital desativado com sucesso.".to_string(),
    }))
}
