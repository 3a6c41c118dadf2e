// ABOUTME: HTTP implementation of WorkspaceApi
// ABOUTME: One REST request per operation, state tracked from the notification channel

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::api::WorkspaceApi;
use crate::auth;
use crate::error::{Result, WorkspaceError};
use crate::models::{Call, Dn, Initialization, KvPair, User, WorkspaceEvent};
use crate::notifications::{self, NotificationTask, Sinks};
use crate::options::ClientOptions;
use crate::state::VoiceState;

const EVENT_CAPACITY: usize = 256;

/// Status codes the service uses for accepted requests
const STATUS_OK: i64 = 0;
const STATUS_ASYNC_OK: i64 = 1;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    Destroyed,
}

#[derive(Deserialize)]
struct ApiStatus {
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: Option<ApiStatus>,
    #[serde(default)]
    data: Option<Value>,
}

/// Check the `{status, data}` envelope and return `data`
fn check_envelope(body: Value) -> Result<Value> {
    let envelope: ApiResponse = serde_json::from_value(body)
        .map_err(|e| WorkspaceError::InvalidResponse(e.to_string()))?;
    let status = envelope
        .status
        .ok_or_else(|| WorkspaceError::InvalidResponse("missing status".into()))?;
    match status.code {
        STATUS_OK | STATUS_ASYNC_OK => Ok(envelope.data.unwrap_or(Value::Null)),
        code => Err(WorkspaceError::Api {
            code,
            message: status.message.unwrap_or_default(),
        }),
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

fn call_path(conn_id: &str, operation: &str) -> String {
    format!("/voice/calls/{}/{}", encode(conn_id), operation)
}

/// `{"data": {...}}` request body
fn data(body: Value) -> Value {
    json!({ "data": body })
}

#[derive(Default)]
struct Session {
    token: Option<String>,
    notifications: Option<NotificationTask>,
}

/// Workspace session over HTTP.
///
/// Holds the cookie-carrying HTTP client, the access token, and the call/DN
/// state fed by the notification loop.
pub struct WorkspaceClient {
    options: ClientOptions,
    http: reqwest::Client,
    lifecycle: Mutex<Lifecycle>,
    debug: std::sync::atomic::AtomicBool,
    session: tokio::sync::Mutex<Session>,
    profile: RwLock<(Option<User>, Option<Value>)>,
    state: Arc<RwLock<VoiceState>>,
    events: broadcast::Sender<WorkspaceEvent>,
}

impl WorkspaceClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        options.workspace_url()?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let debug = std::sync::atomic::AtomicBool::new(options.debug);

        Ok(Self {
            options,
            http,
            lifecycle: Mutex::new(Lifecycle::Uninitialized),
            debug,
            session: tokio::sync::Mutex::new(Session::default()),
            profile: RwLock::new((None, None)),
            state: Arc::new(RwLock::new(VoiceState::new())),
            events,
        })
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
            .lock()
            .map(|l| *l)
            .unwrap_or(Lifecycle::Uninitialized)
    }

    fn set_lifecycle(&self, next: Lifecycle) {
        if let Ok(mut lifecycle) = self.lifecycle.lock() {
            *lifecycle = next;
        }
    }

    fn workspace_url(&self, path: &str) -> Result<String> {
        Ok(format!("{}/workspace/v3{}", self.options.workspace_url()?, path))
    }

    fn log_request(&self, method: &str, path: &str, body: Option<&Value>) {
        if self.is_debug_enabled() {
            info!(method, path, body = ?body, "Workspace request");
        } else {
            debug!(method, path, "Workspace request");
        }
    }

    fn authorize(
        &self,
        mut request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        if let Some(key) = self.options.api_key.as_deref() {
            request = request.header("x-api-key", key);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let resp = request.send().await?;
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() && body.get("status").is_none() {
            return Err(WorkspaceError::Api {
                code: i64::from(status.as_u16()),
                message: status.to_string(),
            });
        }
        let data = check_envelope(body)?;
        if self.is_debug_enabled() {
            info!(data = %data, "Workspace response");
        }
        Ok(data)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value> {
        if !self.is_initialized() {
            return Err(WorkspaceError::NotInitialized);
        }
        self.log_request("POST", path, body.as_ref());
        let request = self.http.post(self.workspace_url(path)?);
        let request = self.authorize(request, None);
        let request = match body {
            Some(body) => request.json(&body),
            None => request.json(&json!({})),
        };
        self.send(request).await
    }

    async fn post_call(&self, conn_id: &str, operation: &str, body: Option<Value>) -> Result<()> {
        self.post(&call_path(conn_id, operation), body).await?;
        Ok(())
    }

    async fn wait_for_initialization(
        &self,
        rx: oneshot::Receiver<Result<Initialization>>,
    ) -> Result<Initialization> {
        match tokio::time::timeout(self.options.init_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(WorkspaceError::Notification(
                "notification channel closed during initialization".into(),
            )),
            Err(_) => Err(WorkspaceError::Notification(format!(
                "no initialization notification within {:?}",
                self.options.init_timeout
            ))),
        }
    }
}

#[async_trait]
impl WorkspaceApi for WorkspaceClient {
    async fn authenticate(&self) -> Result<()> {
        let token = auth::fetch_token(&self.http, &self.options).await?;
        self.session.lock().await.token = Some(token);
        info!("Authenticated");
        Ok(())
    }

    async fn initialize(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if self.is_initialized() {
            debug!("Already initialized");
            return Ok(());
        }
        let token = session
            .token
            .clone()
            .ok_or_else(|| WorkspaceError::Auth("authenticate before initializing".into()))?;

        let url = self.workspace_url("/initialize-workspace")?;
        self.log_request("POST", "/initialize-workspace", None);
        let request = self.authorize(self.http.post(url), Some(&token));
        self.send(request).await?;

        let (init_tx, init_rx) = oneshot::channel();
        let sinks = Sinks {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
            init: Arc::new(Mutex::new(Some(init_tx))),
        };
        let task = notifications::start(
            self.http.clone(),
            &self.options.workspace_url()?,
            self.options.api_key.clone(),
            sinks,
        )
        .await?;

        let init = match self.wait_for_initialization(init_rx).await {
            Ok(init) => init,
            Err(e) => {
                task.stop().await;
                return Err(e);
            }
        };

        info!(agent_id = %init.user.agent_id, "Workspace initialized");
        session.notifications = Some(task);
        if let Ok(mut profile) = self.profile.write() {
            *profile = (Some(init.user), Some(init.configuration));
        }
        self.set_lifecycle(Lifecycle::Initialized);
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if !self.is_initialized() {
            return Ok(());
        }

        let logout = self.post("/logout", None).await;
        if let Some(task) = session.notifications.take() {
            task.stop().await;
        }
        session.token = None;
        if let Ok(mut profile) = self.profile.write() {
            *profile = (None, None);
        }
        if let Ok(mut state) = self.state.write() {
            state.clear();
        }
        self.set_lifecycle(Lifecycle::Destroyed);

        if let Err(e) = &logout {
            warn!(error = %e, "Logout request failed");
        }
        logout.map(|_| ())
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle() == Lifecycle::Initialized
    }

    fn is_debug_enabled(&self) -> bool {
        self.debug.load(std::sync::atomic::Ordering::Relaxed)
    }

    fn set_debug_enabled(&self, enabled: bool) {
        self.debug.store(enabled, std::sync::atomic::Ordering::Relaxed);
    }

    fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.events.subscribe()
    }

    fn calls(&self) -> Vec<Call> {
        self.state
            .read()
            .map(|s| s.calls().to_vec())
            .unwrap_or_default()
    }

    fn dn(&self) -> Option<Dn> {
        self.state.read().ok().and_then(|s| s.dn().cloned())
    }

    fn user(&self) -> Option<User> {
        self.profile.read().ok().and_then(|p| p.0.clone())
    }

    fn configuration(&self) -> Option<Value> {
        self.profile.read().ok().and_then(|p| p.1.clone())
    }

    async fn activate_channels(&self, agent_id: &str, dn: &str) -> Result<()> {
        self.post(
            "/activate-channels",
            Some(data(json!({ "agentId": agent_id, "dn": dn }))),
        )
        .await?;
        Ok(())
    }

    async fn ready(&self) -> Result<()> {
        self.post("/voice/ready", None).await?;
        Ok(())
    }

    async fn not_ready(&self, reason_code: Option<&str>, work_mode: Option<&str>) -> Result<()> {
        let mut body = serde_json::Map::new();
        if let Some(reason) = reason_code {
            body.insert("reasonCode".into(), json!(reason));
        }
        if let Some(mode) = work_mode {
            body.insert("agentWorkMode".into(), json!(mode));
        }
        self.post("/voice/not-ready", Some(data(Value::Object(body)))).await?;
        Ok(())
    }

    async fn dnd_on(&self) -> Result<()> {
        self.post("/voice/set-dnd-on", None).await?;
        Ok(())
    }

    async fn dnd_off(&self) -> Result<()> {
        self.post("/voice/set-dnd-off", None).await?;
        Ok(())
    }

    async fn set_forward(&self, destination: &str) -> Result<()> {
        self.post(
            "/voice/set-forward",
            Some(data(json!({ "forwardTo": destination }))),
        )
        .await?;
        Ok(())
    }

    async fn cancel_forward(&self) -> Result<()> {
        self.post("/voice/cancel-forward", None).await?;
        Ok(())
    }

    async fn voice_login(&self) -> Result<()> {
        self.post("/voice/login", None).await?;
        Ok(())
    }

    async fn voice_logout(&self) -> Result<()> {
        self.post("/voice/logout", None).await?;
        Ok(())
    }

    async fn make_call(&self, destination: &str) -> Result<()> {
        self.post(
            "/voice/make-call",
            Some(data(json!({ "destination": destination }))),
        )
        .await?;
        Ok(())
    }

    async fn answer_call(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "answer", None).await
    }

    async fn hold_call(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "hold", None).await
    }

    async fn retrieve_call(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "retrieve", None).await
    }

    async fn release_call(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "release", None).await
    }

    async fn clear_call(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "clear", None).await
    }

    async fn redirect_call(&self, conn_id: &str, destination: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "redirect",
            Some(data(json!({ "destination": destination }))),
        )
        .await
    }

    async fn initiate_conference(&self, conn_id: &str, destination: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "initiate-conference",
            Some(data(json!({ "destination": destination }))),
        )
        .await
    }

    async fn complete_conference(&self, conn_id: &str, parent_conn_id: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "complete-conference",
            Some(data(json!({ "parentConnId": parent_conn_id }))),
        )
        .await
    }

    async fn initiate_transfer(&self, conn_id: &str, destination: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "initiate-transfer",
            Some(data(json!({ "destination": destination }))),
        )
        .await
    }

    async fn complete_transfer(&self, conn_id: &str, parent_conn_id: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "complete-transfer",
            Some(data(json!({ "parentConnId": parent_conn_id }))),
        )
        .await
    }

    async fn single_step_transfer(&self, conn_id: &str, destination: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "single-step-transfer",
            Some(data(json!({ "destination": destination }))),
        )
        .await
    }

    async fn single_step_conference(&self, conn_id: &str, destination: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "single-step-conference",
            Some(data(json!({ "destination": destination }))),
        )
        .await
    }

    async fn delete_from_conference(&self, conn_id: &str, dn_to_drop: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "delete-from-conference",
            Some(data(json!({ "dnToDrop": dn_to_drop }))),
        )
        .await
    }

    async fn alternate_calls(&self, conn_id: &str, held_conn_id: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "alternate",
            Some(data(json!({ "heldConnId": held_conn_id }))),
        )
        .await
    }

    async fn merge_calls(&self, conn_id: &str, other_conn_id: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "merge",
            Some(data(json!({ "otherConnId": other_conn_id }))),
        )
        .await
    }

    async fn reconnect_call(&self, conn_id: &str, held_conn_id: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "reconnect",
            Some(data(json!({ "heldConnId": held_conn_id }))),
        )
        .await
    }

    async fn attach_user_data(&self, conn_id: &str, pairs: &[KvPair]) -> Result<()> {
        self.post_call(
            conn_id,
            "attach-user-data",
            Some(data(json!({ "userData": pairs }))),
        )
        .await
    }

    async fn update_user_data(&self, conn_id: &str, pairs: &[KvPair]) -> Result<()> {
        self.post_call(
            conn_id,
            "update-user-data",
            Some(data(json!({ "userData": pairs }))),
        )
        .await
    }

    async fn delete_user_data_pair(&self, conn_id: &str, key: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "delete-user-data-pair",
            Some(data(json!({ "key": key }))),
        )
        .await
    }

    async fn send_dtmf(&self, conn_id: &str, digits: &str) -> Result<()> {
        self.post_call(
            conn_id,
            "send-dtmf",
            Some(data(json!({ "dtmfDigits": digits }))),
        )
        .await
    }

    async fn start_recording(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "start-recording", None).await
    }

    async fn pause_recording(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "pause-recording", None).await
    }

    async fn resume_recording(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "resume-recording", None).await
    }

    async fn stop_recording(&self, conn_id: &str) -> Result<()> {
        self.post_call(conn_id, "stop-recording", None).await
    }

    async fn send_user_event(&self, pairs: &[KvPair], call_uuid: Option<&str>) -> Result<()> {
        let mut body = json!({ "userData": pairs });
        if let Some(uuid) = call_uuid {
            body["callUuid"] = json!(uuid);
        }
        self.post("/voice/send-user-event", Some(data(body))).await?;
        Ok(())
    }

    async fn search_targets(&self, search_term: &str, limit: Option<u32>) -> Result<Value> {
        if !self.is_initialized() {
            return Err(WorkspaceError::NotInitialized);
        }
        self.log_request("GET", "/targets", None);
        let mut query = vec![("searchTerm", search_term.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        let request = self.http.get(self.workspace_url("/targets")?).query(&query);
        let request = self.authorize(request, None);
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WorkspaceClient {
        WorkspaceClient::new(ClientOptions::new("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn test_check_envelope_ok() {
        let data = check_envelope(json!({"status": {"code": 0}, "data": {"targets": []}})).unwrap();
        assert_eq!(data, json!({"targets": []}));
    }

    #[test]
    fn test_check_envelope_async_ok_without_data() {
        let data = check_envelope(json!({"status": {"code": 1, "message": "accepted"}})).unwrap();
        assert_eq!(data, Value::Null);
    }

    #[test]
    fn test_check_envelope_error_code() {
        match check_envelope(json!({"status": {"code": 502, "message": "Call not found"}})) {
            Err(WorkspaceError::Api { code, message }) => {
                assert_eq!(code, 502);
                assert_eq!(message, "Call not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_check_envelope_missing_status() {
        assert!(matches!(
            check_envelope(json!({"data": {}})),
            Err(WorkspaceError::InvalidResponse(_))
        ));
        assert!(matches!(
            check_envelope(Value::Null),
            Err(WorkspaceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_call_path_encodes_id() {
        assert_eq!(call_path("00a1", "answer"), "/voice/calls/00a1/answer");
        assert_eq!(call_path("a/b c", "hold"), "/voice/calls/a%2Fb%20c/hold");
    }

    #[test]
    fn test_new_requires_base_url() {
        assert!(matches!(
            WorkspaceClient::new(ClientOptions::default()),
            Err(WorkspaceError::Config(_))
        ));
    }

    #[test]
    fn test_new_client_is_uninitialized() {
        let client = client();
        assert_eq!(client.lifecycle(), Lifecycle::Uninitialized);
        assert!(!client.is_initialized());
        assert!(client.calls().is_empty());
        assert!(client.dn().is_none());
        assert!(client.user().is_none());
        assert!(client.configuration().is_none());
    }

    #[test]
    fn test_debug_toggle() {
        let client = client();
        assert!(!client.is_debug_enabled());
        client.set_debug_enabled(true);
        assert!(client.is_debug_enabled());
    }

    #[tokio::test]
    async fn test_mutations_rejected_before_initialize() {
        let client = client();
        assert!(matches!(
            client.ready().await,
            Err(WorkspaceError::NotInitialized)
        ));
        assert!(matches!(
            client.answer_call("C1").await,
            Err(WorkspaceError::NotInitialized)
        ));
        assert!(matches!(
            client.search_targets("bob", Some(5)).await,
            Err(WorkspaceError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_destroy_before_initialize_is_noop() {
        let client = client();
        client.destroy().await.unwrap();
        assert_eq!(client.lifecycle(), Lifecycle::Uninitialized);
    }

    #[tokio::test]
    async fn test_initialize_requires_token() {
        let client = client();
        assert!(matches!(
            client.initialize().await,
            Err(WorkspaceError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribers_receive_state_changes() {
        let client = client();
        let mut rx = client.subscribe();
        let event = WorkspaceEvent::DnStateChanged { dn: Dn::default() };
        client.events.send(event.clone()).unwrap();
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
