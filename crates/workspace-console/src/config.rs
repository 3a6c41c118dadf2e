// ABOUTME: Startup options for the console: credentials, defaults, URLs and flags
// ABOUTME: Loaded from a TOML file and overlaid with CLI flags / environment variables

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use workspace_client::ClientOptions;

/// Fields never echoed back by the `config` command
const SECRET_FIELDS: &[&str] = &["api_key", "password", "client_secret", "token"];

/// Everything the console knows at startup
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Workspace service base URL
    pub base_url: Option<String>,
    /// Authentication service base URL (defaults to base_url)
    pub auth_url: Option<String>,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Pre-issued access token, used instead of the password grant
    pub token: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub default_agent_id: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub default_dn: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub default_destination: Option<String>,
    /// Initialize and activate channels on startup
    pub auto_login: bool,
    pub debug: bool,
}

impl std::fmt::Debug for ConsoleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ConsoleConfig")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("api_key", &redact(&self.api_key))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("token", &redact(&self.token))
            .field("default_agent_id", &self.default_agent_id)
            .field("default_dn", &self.default_dn)
            .field("default_destination", &self.default_destination)
            .field("auto_login", &self.auto_login)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Directory numbers and agent ids are often written as bare integers in TOML.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}

impl ConsoleConfig {
    /// Returns the default config path (~/.config/workspace-console/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(workspace_log::APP_DIR).join("config.toml"))
    }

    /// Load from an explicit path, or from the default path when it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Overlay `overrides` on top of `self`: set values win, flags accumulate.
    pub fn merge(self, overrides: ConsoleConfig) -> Self {
        Self {
            base_url: overrides.base_url.or(self.base_url),
            auth_url: overrides.auth_url.or(self.auth_url),
            api_key: overrides.api_key.or(self.api_key),
            username: overrides.username.or(self.username),
            password: overrides.password.or(self.password),
            client_id: overrides.client_id.or(self.client_id),
            client_secret: overrides.client_secret.or(self.client_secret),
            token: overrides.token.or(self.token),
            default_agent_id: overrides.default_agent_id.or(self.default_agent_id),
            default_dn: overrides.default_dn.or(self.default_dn),
            default_destination: overrides.default_destination.or(self.default_destination),
            auto_login: overrides.auto_login || self.auto_login,
            debug: overrides.debug || self.debug,
        }
    }

    /// Options for the workspace client
    pub fn client_options(&self) -> Result<ClientOptions> {
        let Some(base_url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            bail!("No base URL configured. Use --base-url, WORKSPACE_BASE_URL or base_url in the config file.");
        };

        Ok(ClientOptions {
            base_url: base_url.to_string(),
            auth_url: self.auth_url.clone(),
            api_key: self.api_key.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            token: self.token.clone(),
            debug: self.debug,
            ..ClientOptions::default()
        })
    }

    /// JSON view for display, with secrets masked
    pub fn redacted(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            for field in SECRET_FIELDS {
                if let Some(slot) = map.get_mut(*field) {
                    if !slot.is_null() {
                        *slot = Value::String("[REDACTED]".into());
                    }
                }
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
base_url = "https://gws.example.com"
api_key = "key-1"
username = "agent1"
default_agent_id = "A100"
default_dn = 7001
auto_login = true
"#,
        );

        let config = ConsoleConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://gws.example.com"));
        assert_eq!(config.default_agent_id.as_deref(), Some("A100"));
        assert_eq!(config.default_dn.as_deref(), Some("7001"));
        assert!(config.default_destination.is_none());
        assert!(config.auto_login);
        assert!(!config.debug);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let result = ConsoleConfig::load(Some(Path::new("/nonexistent/workspace-console.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let file = write_config("base_url = [unterminated");
        let err = ConsoleConfig::load(Some(file.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_merge_overrides_win() {
        let file_config = ConsoleConfig {
            base_url: Some("https://file.example.com".into()),
            default_dn: Some("7001".into()),
            auto_login: true,
            ..Default::default()
        };
        let overrides = ConsoleConfig {
            base_url: Some("https://flag.example.com".into()),
            debug: true,
            ..Default::default()
        };

        let merged = file_config.merge(overrides);
        assert_eq!(merged.base_url.as_deref(), Some("https://flag.example.com"));
        assert_eq!(merged.default_dn.as_deref(), Some("7001"));
        assert!(merged.auto_login);
        assert!(merged.debug);
    }

    #[test]
    fn test_client_options_requires_base_url() {
        assert!(ConsoleConfig::default().client_options().is_err());

        let config = ConsoleConfig {
            base_url: Some("https://gws.example.com".into()),
            token: Some("tok".into()),
            debug: true,
            ..Default::default()
        };
        let options = config.client_options().unwrap();
        assert_eq!(options.base_url, "https://gws.example.com");
        assert_eq!(options.token.as_deref(), Some("tok"));
        assert!(options.debug);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let config = ConsoleConfig {
            base_url: Some("https://gws.example.com".into()),
            password: Some("hunter2".into()),
            client_secret: Some("s3cret".into()),
            username: Some("agent1".into()),
            ..Default::default()
        };
        let value = config.redacted();
        assert_eq!(value["password"], "[REDACTED]");
        assert_eq!(value["client_secret"], "[REDACTED]");
        assert_eq!(value["username"], "agent1");
        assert!(value["token"].is_null());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ConsoleConfig {
            token: Some("tok-123".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
