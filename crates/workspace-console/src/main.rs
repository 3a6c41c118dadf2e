// ABOUTME: Entry point for the workspace-console binary.
// ABOUTME: Loads .env, parses flags and hands off to the interactive console.

use anyhow::Result;
use clap::Parser;
use workspace_console::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    workspace_console::run(cli).await
}
