// src/handlers/tests.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{MessageResponse, Pagination},
    middleware::{auth::AuthenticatedUser, rbac::{require_role, LAB_ADMIN_ONLY}},
    models::catalog::{LabTest, LabTestStatus, TestMaster},
};

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLabTestPayload {
    pub lab_id: i32,
    pub test_id: i32,
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLabTestPayload {
    pub price: Option<Decimal>,
    pub status: Option<LabTestStatus>,
}

// ---
// Catálogo de exames (TestMaster, independente de laboratório)
// ---

#[utoipa::path(
    get,
    path = "/api/v1/tests/master",
    params(Pagination),
    responses((status = 200, description = "Catálogo de exames", body = [TestMaster])),
    security(("api_jwt" = [])),
    tag = "Tests"
)]
pub async fn get_test_masters(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<TestMaster>>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    let tests = app_state
        .catalog_service
        .list_test_masters(page.skip, page.limit)
        .await?;
    Ok(Json(tests))
}

#[utoipa::path(
    get,
    path = "/api/v1/tests/master/{id}",
    params(("id" = i32, Path, description = "ID do exame no catálogo")),
    responses(
        (status = 200, description = "Exame do catálogo", body = TestMaster),
        (status = 404, description = "Exame não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Tests"
)]
pub async fn get_test_master(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<TestMaster>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    let test = app_state.catalog_service.get_test_master(id).await?;
    Ok(Json(test))
}

// ---
// Ofertas de exame (LabTest)
// ---

#[utoipa::path(
    post,
    path = "/api/v1/tests/lab",
    request_body = CreateLabTestPayload,
    responses(
        (status = 201, description = "Oferta de exame criada", body = LabTest),
        (status = 400, description = "O laboratório já oferece este exame"),
        (status = 404, description = "Laboratório ou exame não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Tests"
)]
pub async fn create_lab_test(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateLabTestPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;

    let lab_test = app_state
        .catalog_service
        .create_lab_test(payload.lab_id, payload.test_id, payload.price)
        .await?;

    Ok((StatusCode::CREATED, Json(lab_test)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tests/lab/{lab_id}",
    params(("lab_id" = i32, Path, description = "ID do laboratório")),
    responses(
        (status = 200, description = "Ofertas do laboratório", body = [LabTest]),
        (status = 404, description = "Laboratório não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "Tests"
)]
pub async fn get_lab_tests(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(lab_id): Path<i32>,
) -> Result<Json<Vec<LabTest>>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    let lab_tests = app_state.catalog_service.list_lab_tests(lab_id).await?;
    Ok(Json(lab_tests))
}

#[utoipa::path(
    put,
    path = "/api/v1/tests/lab/{id}",
    params(("id" = i32, Path, description = "ID da oferta de exame")),
    request_body = UpdateLabTestPayload,
    responses(
        (status = 200, description = "Oferta atualizada", body = LabTest),
        (status = 404, description = "Oferta não encontrada")
    ),
    security(("api_jwt" = [])),
    tag = "Tests"
)]
pub async fn update_lab_test(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateLabTestPayload>,
) -> Result<Json<LabTest>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    let lab_test = app_state
        .catalog_service
        .update_lab_test(id, payload.price, payload.status)
        .await?;
    Ok(Json(lab_test))
}

// Soft delete: a oferta fica INACTIVE
#[utoipa::path(
    delete,
    path = "/api/v1/tests/lab/{id}",
    params(("id" = i32, Path, description = "ID da oferta de exame")),
    responses(
        (status = 200, description = "Oferta desativada", body = MessageResponse),
        (status = 404, description = "Oferta não encontrada")
    ),
    security(("api_jwt" = [])),
    tag = "Tests"
)]
pub async fn delete_lab_test(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&user, LAB_ADMIN_ONLY)?;
    app_state.catalog_service.deactivate_lab_test(id).await?;
    Ok(Json(MessageResponse {
        message: "Oferta de exame desativada com sucesso.".to_string(),
    }))
}
