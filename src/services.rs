pub mod auth;
pub use auth::AuthService;
pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod file_storage;
pub use file_storage::StorageGateway;
pub mod notification_service;
pub use notification_service::NotificationService;
pub mod report_service;
pub use report_service::ReportService;
