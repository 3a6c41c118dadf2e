// ABOUTME: Command-line flags for the workspace-console binary
// ABOUTME: Every option can also come from a WORKSPACE_* environment variable

use std::path::PathBuf;

use clap::Parser;

use crate::config::ConsoleConfig;

#[derive(Parser, Debug)]
#[command(name = "workspace-console")]
#[command(about = "Interactive console for a telephony workspace session")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ~/.config/workspace-console/config.toml)
    #[arg(short, long, env = "WORKSPACE_CONSOLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace service base URL
    #[arg(long, env = "WORKSPACE_BASE_URL")]
    pub base_url: Option<String>,

    /// Authentication service base URL (defaults to the base URL)
    #[arg(long, env = "WORKSPACE_AUTH_URL")]
    pub auth_url: Option<String>,

    /// API key sent with every request
    #[arg(long, env = "WORKSPACE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "WORKSPACE_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "WORKSPACE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, env = "WORKSPACE_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "WORKSPACE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Pre-issued access token (skips the password grant)
    #[arg(long, env = "WORKSPACE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Agent id used by activate-channels when none is given
    #[arg(long, env = "WORKSPACE_DEFAULT_AGENT_ID")]
    pub default_agent_id: Option<String>,

    /// DN used by activate-channels when none is given
    #[arg(long, env = "WORKSPACE_DEFAULT_DN")]
    pub default_dn: Option<String>,

    /// Destination used by make-call when none is given
    #[arg(long, env = "WORKSPACE_DEFAULT_DESTINATION")]
    pub default_destination: Option<String>,

    /// Initialize and activate channels on startup
    #[arg(long, env = "WORKSPACE_AUTO_LOGIN")]
    pub auto_login: bool,

    /// Verbose client logging
    #[arg(short, long, env = "WORKSPACE_DEBUG")]
    pub debug: bool,

    /// Write logs to ~/.config/workspace-console/workspace-console.log instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Flags and environment values as a config overlay
    pub fn overrides(&self) -> ConsoleConfig {
        ConsoleConfig {
            base_url: self.base_url.clone(),
            auth_url: self.auth_url.clone(),
            api_key: self.api_key.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            token: self.token.clone(),
            default_agent_id: self.default_agent_id.clone(),
            default_dn: self.default_dn.clone(),
            default_destination: self.default_destination.clone(),
            auto_login: self.auto_login,
            debug: self.debug,
        }
    }

    /// Config file overlaid with flags
    pub fn resolve_config(&self) -> anyhow::Result<ConsoleConfig> {
        Ok(ConsoleConfig::load(self.config.as_deref())?.merge(self.overrides()))
    }
}
