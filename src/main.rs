//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::{AppState, Settings};
use crate::middleware::auth::auth_guard;

// Corpo máximo aceito nas rotas de upload; o teto de negócio (20MB por
// padrão) é validado depois, no gateway, para responder 400 e não 413.
const UPLOAD_BODY_LIMIT_BYTES: usize = 64 * 1024 * 1024;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Configuração explícita: lida uma vez e injetada em cada componente.
    let settings = Settings::from_env();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new(settings)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas de autenticação + /me protegida
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::get_me))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
        );

    let lab_routes = Router::new()
        .route("/", post(handlers::labs::create_lab).get(handlers::labs::get_labs))
        .route(
            "/{id}",
            get(handlers::labs::get_lab)
                .put(handlers::labs::update_lab)
                .delete(handlers::labs::delete_lab),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let hospital_routes = Router::new()
        .route(
            "/",
            post(handlers::hospitals::create_hospital).get(handlers::hospitals::get_hospitals),
        )
        .route(
            "/{id}",
            get(handlers::hospitals::get_hospital)
                .put(handlers::hospitals::update_hospital)
                .delete(handlers::hospitals::delete_hospital),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let patient_routes = Router::new()
        .route(
            "/",
            post(handlers::patients::create_patient).get(handlers::patients::get_patients),
        )
        .route(
            "/{id}",
            get(handlers::patients::get_patient)
                .put(handlers::patients::update_patient)
                .delete(handlers::patients::delete_patient),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let test_routes = Router::new()
        .route("/master", get(handlers::tests::get_test_masters))
        .route("/master/{id}", get(handlers::tests::get_test_master))
        .route("/lab", post(handlers::tests::create_lab_test))
        .route("/lab/{id}", get(handlers::tests::get_lab_tests)
            .put(handlers::tests::update_lab_test)
            .delete(handlers::tests::delete_lab_test),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let report_routes = Router::new()
        .route(
            "/",
            post(handlers::reports::create_report).get(handlers::reports::get_reports),
        )
        .route("/request", post(handlers::reports::request_report))
        .route(
            "/{id}",
            get(handlers::reports::get_report).put(handlers::reports::update_report),
        )
        .route("/{id}/upload", post(handlers::reports::upload_report_file))
        .route("/{id}/files", get(handlers::reports::get_report_files))
        .route(
            "/{id}/files/{file_id}/download",
            get(handlers::reports::download_report_file),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT_BYTES))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let request_routes = Router::new()
        .route("/", get(handlers::requests::list_requests))
        .route("/{id}", get(handlers::requests::view_request))
        .route("/{id}/status", patch(handlers::requests::update_request_status))
        .route("/{id}/confirm-pickup", post(handlers::requests::confirm_pickup))
        .route("/{id}/upload-report", post(handlers::requests::upload_report))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::get_notifications))
        .route(
            "/{id}/read",
            post(handlers::notifications::mark_notification_read),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/labs", lab_routes)
        .nest("/api/v1/hospitals", hospital_routes)
        .nest("/api/v1/patients", patient_routes)
        .nest("/api/v1/tests", test_routes)
        .nest("/api/v1/reports", report_routes)
        .nest("/api/v1/requests", request_routes)
        .nest("/api/v1/notifications", notification_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state.clone());

    // Inicia o servidor
    let listener = TcpListener::bind(&app_state.server_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
