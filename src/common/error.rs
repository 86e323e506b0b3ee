use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante mapeia para um status HTTP no `IntoResponse` abaixo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validações de negócio (conjunto de exames vazio, transição inválida, etc.)
    #[error("{0}")]
    Validation(String),

    // Entidade referenciada não existe ("Laboratório", "Paciente", "Laudo"...)
    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Este laboratório já oferece este exame")]
    LabTestAlreadyExists,

    #[error("A URL do laboratório já está em uso")]
    LabUrlAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(&'static str),

    // Falha no armazenamento de arquivos (upload para o object store)
    #[error("Erro de armazenamento: {0}")]
    StorageError(String),

    // Configuração externa obrigatória ausente; nunca vira sucesso silencioso
    #[error("Erro de configuração: {0}")]
    ConfigError(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação de payload.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Validation(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(entity) => {
                let body = Json(json!({ "error": format!("{} não encontrado.", entity) }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso."),
            AppError::LabTestAlreadyExists => {
                (StatusCode::BAD_REQUEST, "Este laboratório já oferece este exame.")
            }
            AppError::LabUrlAlreadyExists => {
                (StatusCode::BAD_REQUEST, "A URL do laboratório já está em uso.")
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos."),
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.")
            }
            AppError::Forbidden(msg) => {
                let body = Json(json!({ "error": msg }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }
            // O object store está fora do ar; o cliente pode tentar novamente.
            AppError::StorageError(ref e) => {
                tracing::error!("Falha no armazenamento de arquivos: {}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "O armazenamento de arquivos está indisponível.")
            }
            AppError::ConfigError(ref e) => {
                tracing::error!("Configuração ausente: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "O servidor está mal configurado.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
