use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{HealthStatus, Invoice, Record, RecordFields, Settings};
use crate::utils::upload_mime_type;

/// Thin wrapper over the backend's REST surface. Mutations ignore the
/// response body; callers re-read the collection instead.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(
            &settings.base_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn status(&self) -> Result<HealthStatus, ApiError> {
        debug!("GET /status");
        let response = ensure_success(self.http.get(self.url("/status")).send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn list_records(&self) -> Result<Vec<Record>, ApiError> {
        debug!("GET /dpp");
        let response = ensure_success(self.http.get(self.url("/dpp")).send().await?).await?;
        let body = response.text().await?;
        parse_collection(&body)
    }

    pub async fn create_record(&self, fields: &RecordFields) -> Result<(), ApiError> {
        debug!(name = %fields.name, "POST /dpp");
        let response = self.http.post(self.url("/dpp")).json(fields).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn update_record(&self, id: &str, fields: &RecordFields) -> Result<(), ApiError> {
        debug!("PUT /dpp/{}", id);
        let response = self
            .http
            .put(self.url(&format!("/dpp/{}", id)))
            .json(fields)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn delete_record(&self, id: &str) -> Result<(), ApiError> {
        debug!("DELETE /dpp/{}", id);
        let response = self
            .http
            .delete(self.url(&format!("/dpp/{}", id)))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        debug!("GET /invoices");
        let response = ensure_success(self.http.get(self.url("/invoices")).send().await?).await?;
        let body = response.text().await?;
        parse_collection(&body)
    }

    /// Sends the file as the single multipart field `file`. Only the HTTP
    /// status of the reply is inspected.
    pub async fn extract_invoice(&self, path: &Path) -> Result<(), ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        debug!(file = %file_name, size = bytes.len(), "POST /extract-invoice");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(upload_mime_type(path).essence_str())?;
        let form = Form::new().part("file", part);
        let response = self
            .http
            .post(self.url("/extract-invoice"))
            .multipart(form)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

/// The backend may answer an empty collection with `null` (or nothing at all).
pub fn parse_collection<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ApiError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Option<Vec<T>> = serde_json::from_str(body)?;
    Ok(items.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::io::Write;

    fn build_client(url: String) -> ApiClient {
        ApiClient::new(&url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn parse_collection_normalizes_null_and_empty_bodies() {
        assert!(parse_collection::<Record>("null").unwrap().is_empty());
        assert!(parse_collection::<Record>("  ").unwrap().is_empty());
        assert!(parse_collection::<Record>("[]").unwrap().is_empty());
        assert!(matches!(
            parse_collection::<Record>("{\"id\": 1}"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = build_client("http://127.0.0.1:8000/".to_string());
        assert_eq!(client.url("/dpp"), "http://127.0.0.1:8000/dpp");
    }

    #[tokio::test]
    async fn list_records_decodes_collection() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/dpp")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"id": "a1", "name": "Chair", "category": "Furniture", "status": "active"},
                    {"id": "b2", "product_name": "Desk", "compliance_status": "pending"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let records = build_client(server.url()).list_records().await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].display_name(), "Desk");
    }

    #[tokio::test]
    async fn update_sends_fields_to_record_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/dpp/a1")
            .match_body(Matcher::Json(json!({
                "name": "Chair",
                "category": "Furniture",
                "status": "retired"
            })))
            .with_status(200)
            .with_body(r#"{"message": "DPP updated", "id": "a1"}"#)
            .create_async()
            .await;

        let fields = RecordFields {
            name: "Chair".into(),
            category: "Furniture".into(),
            status: "retired".into(),
        };
        build_client(server.url())
            .update_record("a1", &fields)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/dpp/missing")
            .with_status(404)
            .with_body(r#"{"detail": "DPP not found"}"#)
            .create_async()
            .await;

        let err = build_client(server.url())
            .delete_record("missing")
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert!(body.contains("DPP not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn status_reads_health_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/status")
            .with_status(200)
            .with_body(r#"{"status": "OK"}"#)
            .create_async()
            .await;

        let health = build_client(server.url()).status().await.unwrap();
        assert_eq!(health.status, "OK");
    }

    #[tokio::test]
    async fn extract_invoice_posts_multipart_file_field() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/extract-invoice")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::Regex(
                r#"name="file"; filename="invoice.pdf""#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4 test invoice").unwrap();

        build_client(server.url())
            .extract_invoice(&path)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn extract_invoice_reports_missing_file() {
        let client = build_client("http://127.0.0.1:9".to_string());
        let err = client
            .extract_invoice(Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }
}
