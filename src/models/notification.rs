// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// O status só avança em direção a READ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Sent,
    Delivered,
    Read,
}

// Uma mensagem por destinatário, criada apenas pelo despachante de notificações.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub report_id: Option<i32>,
    pub message: String,
    pub status: NotificationStatus,
    pub sent_at: DateTime<Utc>,
}

// Resposta do endpoint de marcar como lida
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    pub read: bool,
}
