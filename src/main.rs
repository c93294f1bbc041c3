use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing::Level;

use dpp_dashboard::commands::Command;
use dpp_dashboard::models::{Settings, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use dpp_dashboard::services::api::ApiClient;

#[derive(Debug, Parser)]
#[command(name = "dpp-dashboard", version, about = "Econetra DPP dashboard client")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings {
        base_url: cli.base_url,
        request_timeout_secs: cli.timeout_secs,
    };
    let client = ApiClient::from_settings(&settings)?;

    cli.command.unwrap_or(Command::Dashboard).run(client).await
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
