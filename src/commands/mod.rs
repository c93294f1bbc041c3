pub mod dashboard;
pub mod invoices;
pub mod records;

use clap::Subcommand;
use std::path::PathBuf;

use crate::services::api::ApiClient;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the backend answers on /status
    Status,
    /// Print the DPP collection
    List,
    /// Create a new DPP
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        status: String,
    },
    /// Update fields of an existing DPP
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a DPP
    Delete { id: String },
    /// List saved invoices, optionally showing one in full
    Invoices {
        #[arg(long)]
        show: Option<String>,
    },
    /// Upload an invoice (PDF or image) for extraction
    Upload { file: PathBuf },
    /// Interactive dashboard
    Dashboard,
}

impl Command {
    pub async fn run(self, client: ApiClient) -> anyhow::Result<()> {
        match self {
            Command::Status => records::status(&client).await,
            Command::List => records::list(client).await,
            Command::Add {
                name,
                category,
                status,
            } => records::add(client, name, category, status).await,
            Command::Edit {
                id,
                name,
                category,
                status,
            } => records::edit(client, &id, name, category, status).await,
            Command::Delete { id } => records::delete(client, &id).await,
            Command::Invoices { show } => invoices::list(client, show.as_deref()).await,
            Command::Upload { file } => invoices::upload(client, file).await,
            Command::Dashboard => dashboard::run(client).await,
        }
    }
}
