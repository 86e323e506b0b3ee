// src/handlers/notifications.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::notification::{MarkReadResponse, Notification},
};

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

// Notificações do usuário autenticado, mais recentes primeiro
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationListQuery),
    responses((status = 200, description = "Notificações do usuário", body = [Notification])),
    security(("api_jwt" = [])),
    tag = "Notifications"
)]
pub async fn get_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = app_state
        .notification_service
        .list_for_user(user.id, query.limit)
        .await?;
    Ok(Json(notifications))
}

// Idempotente: `read` é true sempre que a notificação pertence ao usuário,
// mesmo que já estivesse lida. false não é erro, só "nada correspondeu".
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = i32, Path, description = "ID da notificação")),
    responses((status = 200, description = "Resultado da marcação", body = MarkReadResponse)),
    security(("api_jwt" = [])),
    tag = "Notifications"
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let read = app_state.notification_service.mark_read(id, user.id).await?;
    Ok(Json(MarkReadResponse { read }))
}
