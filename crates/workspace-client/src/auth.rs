// ABOUTME: OAuth password-grant authentication against the auth service
// ABOUTME: Returns a bearer token, or the pre-issued one from the options

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, WorkspaceError};
use crate::options::ClientOptions;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fields the password grant needs
struct PasswordGrant<'a> {
    username: &'a str,
    password: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

fn password_grant(options: &ClientOptions) -> Result<PasswordGrant<'_>> {
    let username = required(options.username.as_deref(), "username")?;
    let password = required(options.password.as_deref(), "password")?;
    let client_id = required(options.client_id.as_deref(), "client_id")?;
    let client_secret = options.client_secret.as_deref().unwrap_or_default();

    Ok(PasswordGrant {
        username,
        password,
        client_id,
        client_secret,
    })
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WorkspaceError::Auth(format!(
            "{} is required when no token is supplied",
            name
        ))),
    }
}

/// Obtain an access token.
///
/// A token supplied in the options is used as-is; otherwise a password grant
/// is posted to `<auth>/auth/v3/oauth/token`.
pub async fn fetch_token(http: &reqwest::Client, options: &ClientOptions) -> Result<String> {
    if let Some(token) = options.token.as_deref().filter(|t| !t.is_empty()) {
        debug!("Using pre-issued access token");
        return Ok(token.to_string());
    }

    let grant = password_grant(options)?;
    let url = format!("{}/auth/v3/oauth/token", options.auth_base_url()?);
    info!(url = %url, username = %grant.username, "Requesting access token");

    let mut request = http
        .post(&url)
        .basic_auth(grant.client_id, Some(grant.client_secret))
        .form(&[
            ("grant_type", "password"),
            ("scope", "*"),
            ("username", grant.username),
            ("password", grant.password),
            ("client_id", grant.client_id),
        ]);
    if let Some(key) = options.api_key.as_deref() {
        request = request.header("x-api-key", key);
    }

    let resp = request.send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(WorkspaceError::Auth(format!("{}: {}", status, body)));
    }

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| WorkspaceError::InvalidResponse(format!("token response: {}", e)))?;
    Ok(token.access_token)
}
