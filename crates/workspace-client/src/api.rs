// ABOUTME: The WorkspaceApi trait: everything a front end can ask of a workspace session
// ABOUTME: Lifecycle, state reads, agent state, call control, user data and target search

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::models::{Call, Dn, KvPair, User, WorkspaceEvent};

/// A workspace session.
///
/// Reads return the state last pushed by the service. Every mutating call is a
/// single request; implementations reject them with
/// [`WorkspaceError::NotInitialized`](crate::WorkspaceError::NotInitialized)
/// until [`initialize`](WorkspaceApi::initialize) has succeeded.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    // Lifecycle

    /// Obtain an access token for the configured credentials
    async fn authenticate(&self) -> Result<()>;

    /// Start the workspace session and the notification channel
    async fn initialize(&self) -> Result<()>;

    /// Log out and stop notifications
    async fn destroy(&self) -> Result<()>;

    fn is_initialized(&self) -> bool;

    fn is_debug_enabled(&self) -> bool;

    fn set_debug_enabled(&self, enabled: bool);

    /// Receive pushed call and DN state changes
    fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent>;

    // Reads

    fn calls(&self) -> Vec<Call>;

    fn dn(&self) -> Option<Dn>;

    fn user(&self) -> Option<User>;

    /// Server-side configuration delivered at initialization
    fn configuration(&self) -> Option<Value>;

    // Agent state

    async fn activate_channels(&self, agent_id: &str, dn: &str) -> Result<()>;

    async fn ready(&self) -> Result<()>;

    async fn not_ready(&self, reason_code: Option<&str>, work_mode: Option<&str>) -> Result<()>;

    async fn dnd_on(&self) -> Result<()>;

    async fn dnd_off(&self) -> Result<()>;

    async fn set_forward(&self, destination: &str) -> Result<()>;

    async fn cancel_forward(&self) -> Result<()>;

    async fn voice_login(&self) -> Result<()>;

    async fn voice_logout(&self) -> Result<()>;

    // Call control

    async fn make_call(&self, destination: &str) -> Result<()>;

    async fn answer_call(&self, conn_id: &str) -> Result<()>;

    async fn hold_call(&self, conn_id: &str) -> Result<()>;

    async fn retrieve_call(&self, conn_id: &str) -> Result<()>;

    async fn release_call(&self, conn_id: &str) -> Result<()>;

    async fn clear_call(&self, conn_id: &str) -> Result<()>;

    async fn redirect_call(&self, conn_id: &str, destination: &str) -> Result<()>;

    // Multi-party

    async fn initiate_conference(&self, conn_id: &str, destination: &str) -> Result<()>;

    async fn complete_conference(&self, conn_id: &str, parent_conn_id: &str) -> Result<()>;

    async fn initiate_transfer(&self, conn_id: &str, destination: &str) -> Result<()>;

    async fn complete_transfer(&self, conn_id: &str, parent_conn_id: &str) -> Result<()>;

    async fn single_step_transfer(&self, conn_id: &str, destination: &str) -> Result<()>;

    async fn single_step_conference(&self, conn_id: &str, destination: &str) -> Result<()>;

    async fn delete_from_conference(&self, conn_id: &str, dn_to_drop: &str) -> Result<()>;

    async fn alternate_calls(&self, conn_id: &str, held_conn_id: &str) -> Result<()>;

    async fn merge_calls(&self, conn_id: &str, other_conn_id: &str) -> Result<()>;

    async fn reconnect_call(&self, conn_id: &str, held_conn_id: &str) -> Result<()>;

    // Call metadata

    async fn attach_user_data(&self, conn_id: &str, data: &[KvPair]) -> Result<()>;

    async fn update_user_data(&self, conn_id: &str, data: &[KvPair]) -> Result<()>;

    async fn delete_user_data_pair(&self, conn_id: &str, key: &str) -> Result<()>;

    async fn send_dtmf(&self, conn_id: &str, digits: &str) -> Result<()>;

    async fn start_recording(&self, conn_id: &str) -> Result<()>;

    async fn pause_recording(&self, conn_id: &str) -> Result<()>;

    async fn resume_recording(&self, conn_id: &str) -> Result<()>;

    async fn stop_recording(&self, conn_id: &str) -> Result<()>;

    async fn send_user_event(&self, data: &[KvPair], call_uuid: Option<&str>) -> Result<()>;

    // Directory

    async fn search_targets(&self, search_term: &str, limit: Option<u32>) -> Result<Value>;
}
