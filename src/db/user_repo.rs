// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

const USER_COLUMNS: &str = r#"
    id, name, email, phone, password_hash, role, lab_id, hospital_id,
    is_active, created_at, updated_at
"#;

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        phone: Option<&str>,
        password_hash: &str,
        role: UserRole,
        lab_id: Option<i32>,
        hospital_id: Option<i32>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, phone, password_hash, role, lab_id, hospital_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .bind(role)
        .bind(lab_id)
        .bind(hospital_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    // O nome que a migration dá ao "UNIQUE" da coluna email
                    if db_err.constraint() == Some("users_email_key") {
                        return AppError::EmailAlreadyExists;
                    }
                }
            }
            e.into()
        })?;

        Ok(user)
    }

    // Destinatários do lado do laboratório: usuários ativos do lab com um dos papéis dados.
    pub async fn find_active_by_lab_and_roles(
        &self,
        lab_id: i32,
        roles: &[UserRole],
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE lab_id = $1 AND role = ANY($2) AND is_active = TRUE
            "#
        ))
        .bind(lab_id)
        .bind(roles)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // Destinatários do lado do hospital: usuários ativos afiliados ao hospital.
    pub async fn find_active_hospital_users(
        &self,
        hospital_id: i32,
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE hospital_id = $1 AND role = $2 AND is_active = TRUE
            "#
        ))
        .bind(hospital_id)
        .bind(UserRole::HospitalUser)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
