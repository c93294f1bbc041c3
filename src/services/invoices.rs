use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::{ApiError, UploadError};
use crate::models::Invoice;
use crate::services::api::ApiClient;
use crate::utils::is_supported_upload;

pub const NO_FILE_MESSAGE: &str = "No file selected.";
pub const UPLOAD_OK_MESSAGE: &str = "Upload successful!";
pub const UPLOAD_FAILED_MESSAGE: &str = "Error during upload.";

/// Read-only list of saved invoices with a single selected entry.
#[derive(Debug, Clone)]
pub struct InvoiceViewer {
    client: ApiClient,
    invoices: Vec<Invoice>,
    selected: Option<Invoice>,
}

impl InvoiceViewer {
    pub fn new(client: ApiClient) -> Self {
        InvoiceViewer {
            client,
            invoices: Vec::new(),
            selected: None,
        }
    }

    /// A failed fetch is logged and leaves the list as it was.
    pub async fn load(&mut self) -> Result<usize, ApiError> {
        match self.client.list_invoices().await {
            Ok(invoices) => {
                self.invoices = invoices;
                Ok(self.invoices.len())
            }
            Err(err) => {
                error!(error = %err, "Failed to load invoices");
                Err(err)
            }
        }
    }

    pub fn select(&mut self, id: &str) -> Option<&Invoice> {
        self.selected = self
            .invoices
            .iter()
            .find(|invoice| invoice.id().as_deref() == Some(id))
            .cloned();
        self.selected.as_ref()
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn selected(&self) -> Option<&Invoice> {
        self.selected.as_ref()
    }
}

type UploadCallback = Box<dyn Fn() + Send + Sync>;

/// Uploads one invoice file for server-side extraction.
pub struct InvoiceUploader {
    client: ApiClient,
    file: Option<PathBuf>,
    message: String,
    on_uploaded: Option<UploadCallback>,
}

impl InvoiceUploader {
    pub fn new(client: ApiClient) -> Self {
        InvoiceUploader {
            client,
            file: None,
            message: String::new(),
            on_uploaded: None,
        }
    }

    /// Called after every successful upload.
    pub fn on_uploaded(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_uploaded = Some(Box::new(callback));
        self
    }

    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !is_supported_upload(&path) {
            warn!(file = %path.display(), "file is neither a PDF nor an image");
        }
        self.file = Some(path);
        self.message.clear();
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub async fn upload(&mut self) -> Result<(), UploadError> {
        let Some(path) = self.file.clone() else {
            self.message = NO_FILE_MESSAGE.to_string();
            return Err(UploadError::NoFileSelected);
        };

        match self.client.extract_invoice(&path).await {
            Ok(()) => {
                info!(file = %path.display(), "invoice uploaded");
                self.message = UPLOAD_OK_MESSAGE.to_string();
                if let Some(callback) = &self.on_uploaded {
                    callback();
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, file = %path.display(), "invoice upload failed");
                self.message = UPLOAD_FAILED_MESSAGE.to_string();
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn build_client(url: String) -> ApiClient {
        ApiClient::new(&url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn viewer_loads_and_selects_by_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/invoices")
            .with_status(200)
            .with_body(
                json!([
                    {"_id": "i1", "invoice_number": "INV-001", "total": 120.5},
                    {"_id": "i2"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let mut viewer = InvoiceViewer::new(build_client(server.url()));
        assert_eq!(viewer.load().await.unwrap(), 2);

        let selected = viewer.select("i1").unwrap();
        assert_eq!(selected.invoice_number(), Some("INV-001"));
        assert!(viewer.select("missing").is_none());
        assert!(viewer.selected().is_none());
    }

    #[tokio::test]
    async fn viewer_keeps_list_on_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/invoices")
            .with_status(500)
            .create_async()
            .await;

        let mut viewer = InvoiceViewer::new(build_client(server.url()));
        assert!(viewer.load().await.is_err());
        assert!(viewer.invoices().is_empty());
    }

    #[tokio::test]
    async fn upload_without_file_sends_nothing() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/extract-invoice")
            .expect(0)
            .create_async()
            .await;

        let mut uploader = InvoiceUploader::new(build_client(server.url()));
        let err = uploader.upload().await.unwrap_err();

        assert!(matches!(err, UploadError::NoFileSelected));
        assert_eq!(uploader.message(), NO_FILE_MESSAGE);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn successful_upload_notifies_callback() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/extract-invoice")
            .with_status(200)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"\x89PNG fake").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut uploader = InvoiceUploader::new(build_client(server.url())).on_uploaded(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        uploader.select_file(&path);
        uploader.upload().await.unwrap();

        assert_eq!(uploader.message(), UPLOAD_OK_MESSAGE);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_upload_sets_error_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/extract-invoice")
            .with_status(422)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let mut uploader = InvoiceUploader::new(build_client(server.url()));
        uploader.select_file(path);
        assert!(uploader.upload().await.is_err());
        assert_eq!(uploader.message(), UPLOAD_FAILED_MESSAGE);
    }
}
