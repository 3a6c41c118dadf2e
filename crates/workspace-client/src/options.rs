// ABOUTME: Connection options for the workspace client
// ABOUTME: Base URLs, API key and credentials, with secrets redacted in Debug output

use std::time::Duration;

use crate::error::{Result, WorkspaceError};

/// How long to wait for the initialization notification after initialize-workspace
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the client needs to authenticate and reach the service
#[derive(Clone)]
pub struct ClientOptions {
    /// Workspace service base URL (e.g., "https://gws.example.com")
    pub base_url: String,
    /// Authentication service base URL; defaults to `base_url`
    pub auth_url: Option<String>,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Pre-issued access token; skips the password grant when set
    pub token: Option<String>,
    pub debug: bool,
    pub init_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_url: None,
            api_key: None,
            username: None,
            password: None,
            client_id: None,
            client_secret: None,
            token: None,
            debug: false,
            init_timeout: DEFAULT_INIT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("debug", &self.debug)
            .field("init_timeout", &self.init_timeout)
            .finish()
    }
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Workspace base URL without a trailing slash
    pub fn workspace_url(&self) -> Result<String> {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(WorkspaceError::Config("base_url is required".into()));
        }
        Ok(base.to_string())
    }

    /// Authentication base URL without a trailing slash
    pub fn auth_base_url(&self) -> Result<String> {
        match self.auth_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.trim_end_matches('/').to_string()),
            _ => self.workspace_url(),
        }
    }
}
