// ABOUTME: Error types for workspace-client
// ABOUTME: Unified error handling for authentication, REST calls and notifications

use thiserror::Error;

/// Errors that can occur in workspace-client operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Workspace api is not initialized")]
    NotInitialized,

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_error_display_auth() {
        let err = WorkspaceError::Auth("invalid_grant".to_string());
        let display = format!("{}", err);
        assert!(display.contains("Authentication failed"));
        assert!(display.contains("invalid_grant"));
    }

    #[test]
    fn test_workspace_error_display_api() {
        let err = WorkspaceError::Api {
            code: 502,
            message: "Call not found".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("API error 502"));
        assert!(display.contains("Call not found"));
    }

    #[test]
    fn test_workspace_error_display_not_initialized() {
        let err = WorkspaceError::NotInitialized;
        assert_eq!(format!("{}", err), "Workspace api is not initialized");
    }

    #[test]
    fn test_workspace_error_display_notification() {
        let err = WorkspaceError::Notification("handshake denied".to_string());
        let display = format!("{}", err);
        assert!(display.contains("Notification error"));
        assert!(display.contains("handshake denied"));
    }

    #[test]
    fn test_workspace_error_display_invalid_response() {
        let err = WorkspaceError::InvalidResponse("missing status".to_string());
        let display = format!("{}", err);
        assert!(display.contains("Invalid response"));
        assert!(display.contains("missing status"));
    }

    #[test]
    fn test_workspace_error_display_config() {
        let err = WorkspaceError::Config("base_url is required".to_string());
        assert!(format!("{}", err).contains("base_url is required"));
    }

    #[test]
    fn test_workspace_error_debug() {
        let err = WorkspaceError::Auth("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Auth"));
        assert!(debug_str.contains("test"));
    }
}
