use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::services::api::ApiClient;
use crate::services::invoices::{InvoiceUploader, InvoiceViewer};
use crate::view::render_invoices;

pub async fn list(client: ApiClient, show: Option<&str>) -> Result<()> {
    let mut viewer = InvoiceViewer::new(client);
    viewer.load().await.context("Failed to load invoices")?;
    if let Some(id) = show {
        viewer
            .select(id)
            .ok_or_else(|| anyhow!("Invoice not found: {}", id))?;
    }
    print!("{}", render_invoices(&viewer));
    Ok(())
}

/// Uploads the file, then refreshes the invoice list once the backend
/// has accepted it.
pub async fn upload(client: ApiClient, file: PathBuf) -> Result<()> {
    let uploaded = Arc::new(AtomicBool::new(false));
    let flag = uploaded.clone();
    let mut uploader = InvoiceUploader::new(client.clone()).on_uploaded(move || {
        flag.store(true, Ordering::SeqCst);
    });
    uploader.select_file(file);

    let result = uploader.upload().await;
    println!("{}", uploader.message());
    result?;

    if uploaded.load(Ordering::SeqCst) {
        let mut viewer = InvoiceViewer::new(client);
        if viewer.load().await.is_ok() {
            print!("{}", render_invoices(&viewer));
        }
    }
    Ok(())
}
