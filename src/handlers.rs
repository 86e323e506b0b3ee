pub mod auth;
pub mod hospitals;
pub mod labs;
pub mod notifications;
pub mod patients;
pub mod reports;
pub mod requests;
pub mod tests;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

fn default_limit() -> i64 {
    100
}

// Paginação padrão das listagens
#[derive(Debug, Deserialize, IntoParams)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

// Resposta simples para operações sem corpo útil (deletes, etc.)
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
