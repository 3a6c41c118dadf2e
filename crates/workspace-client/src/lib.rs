// ABOUTME: Workspace client library driven by the console
// ABOUTME: Provides the WorkspaceApi trait, its HTTP implementation, models and push events

mod api;
mod auth;
mod client;
mod error;
mod models;
mod notifications;
mod options;
mod state;

pub use api::WorkspaceApi;
pub use client::{Lifecycle, WorkspaceClient};
pub use error::{Result, WorkspaceError};
pub use models::*;
pub use options::{ClientOptions, DEFAULT_INIT_TIMEOUT};
pub use state::VoiceState;
