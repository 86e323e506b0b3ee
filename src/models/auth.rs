// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// ---
// 1. Papel do usuário
// ---
// O papel é imutável depois do cadastro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum UserRole {
    LabAdmin,     // Vira "LAB_ADMIN"
    LabStaff,     // Vira "LAB_STAFF"
    LabCourier,   // Vira "LAB_COURIER"
    HospitalUser, // Vira "HOSPITAL_USER"
    Patient,      // Vira "PATIENT"
}

// ---
// 2. Usuário
// ---
// Representa um usuário vindo do banco de dados.
// A afiliação (lab_id/hospital_id) decide quem recebe notificações.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: UserRole,
    pub lab_id: Option<i32>,
    pub hospital_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    pub phone: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    pub role: UserRole,
    pub lab_id: Option<i32>,
    pub hospital_id: Option<i32>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,   // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_role_serializes_to_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::LabCourier).unwrap(),
            "\"LAB_COURIER\""
        );
        assert_eq!(
            serde_json::to_string(&UserRole::HospitalUser).unwrap(),
            "\"HOSPITAL_USER\""
        );
    }

    #[test]
    fn register_payload_rejects_invalid_email() {
        let payload = RegisterUserPayload {
            name: "Ana".to_string(),
            email: "nao-e-email".to_string(),
            phone: None,
            password: "segredo".to_string(),
            role: UserRole::LabStaff,
            lab_id: Some(1),
            hospital_id: None,
        };
        assert!(payload.validate().is_err());
    }
}
