// src/db/notification_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::notification::{Notification, NotificationStatus},
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Só o despachante de notificações insere linhas aqui.
    pub async fn insert(
        &self,
        user_id: i32,
        report_id: Option<i32>,
        message: &str,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, report_id, message)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(report_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        limit: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY sent_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    // Idempotente: marcar de novo uma notificação já lida continua retornando true,
    // desde que ela pertença ao usuário. Sem linha correspondente, retorna false.
    pub async fn mark_read(&self, notification_id: i32, user_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET status = $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(NotificationStatus::Read)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
