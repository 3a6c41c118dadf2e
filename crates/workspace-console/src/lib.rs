// ABOUTME: Library root for workspace-console.
// ABOUTME: Exports the console loop, command table, config and rendering helpers.

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod parse;
pub mod render;
pub mod resolve;

pub use cli::Cli;
pub use commands::{Command, CommandRegistry, Context, Outcome};
pub use config::ConsoleConfig;
pub use console::Console;

use std::sync::Arc;

use anyhow::Context as _;
use tokio::io::BufReader;
use tracing::info;
use workspace_client::WorkspaceClient;

/// Run the console on stdin/stdout with options resolved from `cli`.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;

    if cli.log_file {
        workspace_log::init_file(workspace_log::APP_DIR, config.debug);
    } else {
        workspace_log::init(config.debug);
    }
    info!(?config, "Configuration loaded");

    let client = WorkspaceClient::new(config.client_options()?)
        .context("Failed to create workspace client")?;
    let console = Console::new(Arc::new(client), config);

    let mut stdout = std::io::stdout();
    console
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await
}
