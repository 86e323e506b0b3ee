// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CatalogRepository, NotificationRepository, ReportRepository, UserRepository},
    services::{
        AuthService, CatalogService, NotificationService, ReportService, StorageGateway,
    },
};

// Teto padrão de upload para arquivos de laudo
const DEFAULT_MAX_REPORT_FILE_MB: usize = 20;

// ---
// Configuração lida UMA vez do ambiente e passada explicitamente adiante.
// Nenhum componente lê variável de ambiente por conta própria.
// ---
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    // Armazenamento de arquivos (opcional; sem ele, uploads falham com ConfigError)
    pub storage_root: Option<PathBuf>,
    pub storage_public_url: Option<String>,
    pub max_report_file_mb: usize,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let storage_root = env::var("STORAGE_ROOT").ok().map(PathBuf::from);
        let storage_public_url = env::var("STORAGE_PUBLIC_URL").ok();

        let max_report_file_mb = env::var("MAX_REPORT_FILE_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_REPORT_FILE_MB);

        Self {
            database_url,
            jwt_secret,
            server_addr,
            storage_root,
            storage_public_url,
            max_report_file_mb,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub server_addr: String,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub report_service: ReportService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let storage = match (&settings.storage_root, &settings.storage_public_url) {
            (Some(root), Some(base_url)) => StorageGateway::disk(root, base_url),
            _ => {
                tracing::warn!(
                    "⚠️ STORAGE_ROOT/STORAGE_PUBLIC_URL ausentes; uploads de laudo ficarão indisponíveis."
                );
                StorageGateway::unconfigured()
            }
        };

        let auth_service = AuthService::new(
            user_repo.clone(),
            catalog_repo.clone(),
            settings.jwt_secret.clone(),
            db_pool.clone(),
        );
        let catalog_service =
            CatalogService::new(catalog_repo.clone(), user_repo.clone(), db_pool.clone());
        let notification_service = NotificationService::new(notification_repo, user_repo);
        let report_service = ReportService::new(
            report_repo,
            catalog_repo,
            notification_service.clone(),
            storage,
            settings.max_report_file_mb,
            db_pool.clone(),
        );

        // Retorna Ok com o estado montado
        Ok(Self {
            db_pool,
            server_addr: settings.server_addr,
            auth_service,
            catalog_service,
            report_service,
            notification_service,
        })
    }
}
