// src/handlers/patients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{MessageResponse, Pagination},
    middleware::{auth::AuthenticatedUser, rbac::{require_role, LAB_STAFF}},
    models::catalog::{Gender, Patient},
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePatientPayload {
    pub lab_id: i32,
    pub hospital_id: Option<i32>,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub dob: NaiveDate,
    pub gender: Gender,
    pub phone: Option<String>,
    pub address: Option<String>,

    #[serde(default)]
    pub has_mediclaim: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePatientPayload {
    pub hospital_id: Option<i32>,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub has_mediclaim: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PatientFilter {
    pub lab_id: Option<i32>,
    pub hospital_id: Option<i32>,
}

// ---
// Handlers (equipe do laboratório)
// ---

#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = CreatePatientPayload,
    responses(
        (status = 201, description = "Paciente criado", body = Patient),
        (status = 400, description = "Hospital fora do laboratório ou payload inválido"),
        (status = 404, description = "Laboratório ou hospital não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Patients"
)]
pub async fn create_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreatePatientPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, LAB_STAFF)?;
    payload.validate().map_err(AppError::ValidationError)?;

    let patient = app_state
        .catalog_service
        .create_patient(
            payload.lab_id,
            payload.hospital_id,
            &payload.name,
            payload.dob,
            payload.gender,
            payload.phone.as_deref(),
            payload.address.as_deref(),
            payload.has_mediclaim,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients",
    params(PatientFilter, Pagination),
    responses((status = 200, description = "Lista de pacientes", body = [Patient])),
    security(("api_jwt" = [])),
    tag = "Patients"
)]
pub async fn get_patients(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<PatientFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Patient>>, AppError> {
    require_role(&user, LAB_STAFF)?;
    let patients = app_state
        .catalog_service
        .list_patients(filter.lab_id, filter.hospital_id, page.skip, page.limit)
        .await?;
    Ok(Json(patients))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    params(("id" = i32, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente", body = Patient),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Patients"
)]
pub async fn get_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, LAB_STAFF)?;
    let patient = app_state.catalog_service.get_patient(id).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{id}",
    params(("id" = i32, Path, description = "ID do paciente")),
    request_body = UpdatePatientPayload,
    responses(
        (status = 200, description = "Paciente atualizado", body = Patient),
        (status = 400, description = "Hospital fora do laboratório"),
        (status = 404, description = "Paciente ou hospital não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Patients"
)]
pub async fn update_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePatientPayload>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, LAB_STAFF)?;

    let patient = app_state
        .catalog_service
        .update_patient(
            id,
            payload.hospital_id,
            payload.name.as_deref(),
            payload.dob,
            payload.gender,
            payload.phone.as_deref(),
            payload.address.as_deref(),
            payload.has_mediclaim,
        )
        .await?;

    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patients/{id}",
    params(("id" = i32, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente removido", body = MessageResponse),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Patients"
)]
pub async fn delete_patient(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&user, LAB_STAFF)?;
    app_state.catalog_service.delete_patient(id).await?;
    Ok(Json(MessageResponse {
        message: "Paciente removido com sucesso.".to_string(),
    }))
}
