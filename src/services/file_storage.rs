// src/services/file_storage.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;

// Tipos aceitos por padrão para documentos de resultado
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/tiff",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

// O endpoint de upload de laudo é estrito: só PDF
pub const REPORT_ALLOWED_TYPES: &[&str] = &["application/pdf"];

// ---
// 1. Validação (antes de qualquer chamada ao armazenamento)
// ---
pub fn validate_file(
    content_type: &str,
    size_bytes: usize,
    max_size_mb: usize,
    allowed_types: &[&str],
) -> Result<(), AppError> {
    if !allowed_types.contains(&content_type) {
        return Err(AppError::Validation(format!(
            "Tipo de arquivo {} não permitido. Tipos aceitos: {}",
            content_type,
            allowed_types.join(", ")
        )));
    }

    let max_size_bytes = max_size_mb * 1024 * 1024;
    if size_bytes > max_size_bytes {
        return Err(AppError::Validation(format!(
            "O arquivo tem {:.2}MB e excede o tamanho máximo de {}MB.",
            size_bytes as f64 / (1024.0 * 1024.0),
            max_size_mb
        )));
    }

    Ok(())
}

// Extensão derivada do content-type (o nome original do arquivo não é confiável)
fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "application/pdf" => "pdf",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/tiff" => "tiff",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        _ => "bin",
    }
}

// ---
// 2. O contrato de armazenamento
// ---
// O motor de laudos depende apenas deste trait, nunca de um backend concreto.
#[async_trait]
pub trait FileStorage: Send + Sync {
    // Armazena os bytes e devolve uma URL durável de referência.
    async fn upload(
        &self,
        bytes: &[u8],
        content_type: &str,
        folder: &str,
    ) -> Result<String, AppError>;

    // Nunca propaga erro: retorna false em qualquer falha.
    async fn delete(&self, file_url: &str) -> bool;

    // Referência de acesso com tempo limitado; None se o backend não souber assinar.
    async fn presign(&self, file_url: &str, expires_secs: u64) -> Option<String>;
}

// ---
// 3. Backend em disco
// ---
// Guarda os arquivos sob um diretório raiz e monta a URL pública a partir
// da base configurada. Não existe assinatura de URL em disco, então
// `presign` devolve None e os chamadores usam a URL permanente.
pub struct DiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl DiskStorage {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        let public_base_url = public_base_url.trim_end_matches('/').to_string();
        Self { root, public_base_url }
    }

    // Converte a URL pública de volta para o caminho no disco.
    fn path_for(&self, file_url: &str) -> Option<PathBuf> {
        let relative = file_url.strip_prefix(&self.public_base_url)?;
        let relative = relative.trim_start_matches('/');
        // Sem componentes de navegação: a URL foi gerada por nós.
        if relative.is_empty() || relative.split('/').any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for DiskStorage {
    async fn upload(
        &self,
        bytes: &[u8],
        content_type: &str,
        folder: &str,
    ) -> Result<String, AppError> {
        // Nome único: o mesmo laudo pode receber vários arquivos.
        let filename = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        let dir = self.root.join(folder);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::StorageError(format!("falha ao criar diretório: {e}")))?;

        tokio::fs::write(dir.join(&filename), bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("falha ao gravar arquivo: {e}")))?;

        Ok(format!("{}/{}/{}", self.public_base_url, folder, filename))
    }

    async fn delete(&self, file_url: &str) -> bool {
        match self.path_for(file_url) {
            Some(path) => match tokio::fs::remove_file(&path).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Falha ao remover arquivo {}: {}", path.display(), e);
                    false
                }
            },
            None => false,
        }
    }

    async fn presign(&self, _file_url: &str, _expires_secs: u64) -> Option<String> {
        None
    }
}

// ---
// 4. O Gateway (o que os serviços realmente usam)
// ---
// Carrega o backend configurado, se houver. Sem configuração, o upload
// falha com ConfigError em vez de fingir sucesso.
#[derive(Clone)]
pub struct StorageGateway {
    backend: Option<Arc<dyn FileStorage>>,
}

impl StorageGateway {
    pub fn new(backend: Option<Arc<dyn FileStorage>>) -> Self {
        Self { backend }
    }

    pub fn disk(root: &Path, public_base_url: &str) -> Self {
        Self::new(Some(Arc::new(DiskStorage::new(
            root.to_path_buf(),
            public_base_url.to_string(),
        ))))
    }

    pub fn unconfigured() -> Self {
        Self::new(None)
    }

    pub async fn upload(
        &self,
        bytes: &[u8],
        content_type: &str,
        folder: &str,
    ) -> Result<String, AppError> {
        let backend = self.backend.as_ref().ok_or_else(|| {
            AppError::ConfigError("armazenamento de arquivos não configurado".to_string())
        })?;
        backend.upload(bytes, content_type, folder).await
    }

    pub async fn delete(&self, file_url: &str) -> bool {
        match &self.backend {
            Some(backend) => backend.delete(file_url).await,
            None => false,
        }
    }

    pub async fn presign(&self, file_url: &str, expires_secs: u64) -> Option<String> {
        self.backend.as_ref()?.presign(file_url, expires_secs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_within_the_limit() {
        assert!(validate_file("application/pdf", 5 * 1024 * 1024, 20, REPORT_ALLOWED_TYPES).is_ok());
    }

    #[test]
    fn rejects_oversized_file_before_any_storage_call() {
        // 25MB contra um teto de 20MB
        let result = validate_file("application/pdf", 25 * 1024 * 1024, 20, REPORT_ALLOWED_TYPES);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_disallowed_content_type() {
        let result = validate_file("image/png", 1024, 20, REPORT_ALLOWED_TYPES);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn default_list_is_broader_than_the_strict_report_list() {
        // PNG passa na lista padrão, mas não no endpoint estrito de laudos
        assert!(validate_file("image/png", 1024, 10, DEFAULT_ALLOWED_TYPES).is_ok());
        assert!(validate_file("text/plain", 1024, 10, DEFAULT_ALLOWED_TYPES).is_err());
    }

    #[test]
    fn file_at_exact_limit_is_accepted() {
        assert!(validate_file("application/pdf", 20 * 1024 * 1024, 20, REPORT_ALLOWED_TYPES).is_ok());
    }

    #[tokio::test]
    async fn unconfigured_gateway_fails_upload_with_config_error() {
        let gateway = StorageGateway::unconfigured();
        let result = gateway.upload(b"dados", "application/pdf", "reports/1").await;
        assert!(matches!(result, Err(AppError::ConfigError(_))));
        assert!(!gateway.delete("http://arquivos/reports/1/x.pdf").await);
        assert!(gateway.presign("http://arquivos/reports/1/x.pdf", 3600).await.is_none());
    }

    #[tokio::test]
    async fn disk_storage_roundtrip() {
        let root = std::env::temp_dir().join(format!("labbuddy-test-{}", Uuid::new_v4()));
        let storage = DiskStorage::new(root.clone(), "http://localhost:3000/files".to_string());

        let url = storage
            .upload(b"%PDF-1.4", "application/pdf", "reports/42")
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:3000/files/reports/42/"));
        assert!(url.ends_with(".pdf"));

        let path = storage.path_for(&url).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.4");

        assert!(storage.delete(&url).await);
        // Segunda remoção não encontra mais o arquivo
        assert!(!storage.delete(&url).await);

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn disk_storage_never_signs_urls() {
        let storage = DiskStorage::new(std::env::temp_dir(), "http://localhost/files".to_string());
        assert!(storage.presign("http://localhost/files/reports/1/a.pdf", 3600).await.is_none());
    }

    #[test]
    fn path_for_rejects_foreign_and_traversal_urls() {
        let storage = DiskStorage::new(PathBuf::from("/srv/files"), "http://localhost/files".to_string());
        assert!(storage.path_for("http://outro-host/files/a.pdf").is_none());
        assert!(storage.path_for("http://localhost/files/../segredo").is_none());
    }
}
