use anyhow::{anyhow, Context, Result};

use crate::models::FormField;
use crate::services::api::ApiClient;
use crate::services::editor::{EditorState, ResourceListEditor};
use crate::view::{render_dashboard, render_records};

pub async fn status(client: &ApiClient) -> Result<()> {
    let health = client
        .status()
        .await
        .with_context(|| format!("Backend at {} is not reachable", client.base_url()))?;
    println!("Backend status: {}", health.status);
    Ok(())
}

pub async fn list(client: ApiClient) -> Result<()> {
    let editor = ResourceListEditor::mount(client).await;
    let state = editor.snapshot()?;
    println!("{}", state.status);
    print!("{}", render_records(&state.records));
    fail_on_error(&state)
}

pub async fn add(client: ApiClient, name: String, category: String, status: String) -> Result<()> {
    let editor = ResourceListEditor::new(client);
    editor.begin_create()?;
    editor.set_field(FormField::Name, name)?;
    editor.set_field(FormField::Category, category)?;
    editor.set_field(FormField::Status, status)?;
    editor.save().await.context("Failed to save DPP")?;

    print!("{}", render_dashboard(&editor.snapshot()?));
    Ok(())
}

pub async fn edit(
    client: ApiClient,
    id: &str,
    name: Option<String>,
    category: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let editor = ResourceListEditor::mount(client).await;
    fail_on_error(&editor.snapshot()?)?;
    editor.begin_edit_by_id(id)?;

    let changes = [
        (FormField::Name, name),
        (FormField::Category, category),
        (FormField::Status, status),
    ];
    for (field, value) in changes {
        if let Some(value) = value {
            editor.set_field(field, value)?;
        }
    }
    editor.save().await.context("Failed to save DPP")?;

    print!("{}", render_dashboard(&editor.snapshot()?));
    Ok(())
}

pub async fn delete(client: ApiClient, id: &str) -> Result<()> {
    let editor = ResourceListEditor::new(client);
    if let Err(err) = editor.delete(id).await {
        let alert = editor.take_alert()?.unwrap_or_default();
        return Err(anyhow!("{} ({})", alert, err));
    }
    print!("{}", render_records(&editor.snapshot()?.records));
    Ok(())
}

fn fail_on_error(state: &EditorState) -> Result<()> {
    if state.status.is_error() {
        return Err(anyhow!("{}", state.status));
    }
    Ok(())
}
