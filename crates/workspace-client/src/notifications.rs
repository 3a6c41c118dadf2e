// ABOUTME: CometD long-polling notification channel for pushed workspace events
// ABOUTME: Handshakes, subscribes, then loops on /meta/connect feeding state and subscribers

use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, WorkspaceError};
use crate::models::{Initialization, User, WorkspaceEvent};
use crate::state::VoiceState;

pub const INITIALIZATION_CHANNEL: &str = "/workspace/v3/initialization";
pub const VOICE_CHANNEL: &str = "/workspace/v3/voice";

const HANDSHAKE: &str = "/meta/handshake";
const SUBSCRIBE: &str = "/meta/subscribe";
const CONNECT: &str = "/meta/connect";
const DISCONNECT: &str = "/meta/disconnect";

/// Reconnect advice from the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
}

/// One Bayeux message, both directions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CometMessage {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successful: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_connection_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CometMessage {
    pub fn handshake() -> Self {
        Self {
            channel: HANDSHAKE.into(),
            version: Some("1.0".into()),
            supported_connection_types: Some(vec!["long-polling".into()]),
            ..Default::default()
        }
    }

    pub fn subscribe(client_id: &str, subscription: &str) -> Self {
        Self {
            channel: SUBSCRIBE.into(),
            client_id: Some(client_id.into()),
            subscription: Some(subscription.into()),
            ..Default::default()
        }
    }

    pub fn connect(client_id: &str) -> Self {
        Self {
            channel: CONNECT.into(),
            client_id: Some(client_id.into()),
            connection_type: Some("long-polling".into()),
            ..Default::default()
        }
    }

    pub fn disconnect(client_id: &str) -> Self {
        Self {
            channel: DISCONNECT.into(),
            client_id: Some(client_id.into()),
            ..Default::default()
        }
    }

    fn is_meta(&self) -> bool {
        self.channel.starts_with("/meta/")
    }

    fn failure(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| format!("{} unsuccessful", self.channel))
    }
}

/// Shared sinks the notification loop writes into
#[derive(Clone)]
pub struct Sinks {
    pub state: Arc<RwLock<VoiceState>>,
    pub events: broadcast::Sender<WorkspaceEvent>,
    pub init: Arc<Mutex<Option<oneshot::Sender<Result<Initialization>>>>>,
}

impl Sinks {
    /// Route one non-meta message to state, subscribers, or the initialization waiter
    pub fn route(&self, message: &CometMessage) {
        let Some(data) = message.data.as_ref() else {
            return;
        };

        match message.channel.as_str() {
            VOICE_CHANNEL => {
                let Some(event) = WorkspaceEvent::from_voice_message(data) else {
                    debug!(data = %data, "Ignoring voice message");
                    return;
                };
                if let Ok(mut state) = self.state.write() {
                    state.apply(&event);
                }
                // No receivers is fine; the console may not have subscribed yet.
                let _ = self.events.send(event);
            }
            INITIALIZATION_CHANNEL => {
                let outcome = parse_initialization(data);
                if let Some(tx) = self.init.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = tx.send(outcome);
                }
            }
            other => debug!(channel = %other, "Ignoring message on unknown channel"),
        }
    }
}

fn parse_initialization(data: &Value) -> Result<Initialization> {
    let state = data.get("state").and_then(Value::as_str).unwrap_or_default();
    match state {
        "Complete" => {
            let payload = data.get("data").cloned().unwrap_or(Value::Null);
            let user: User = payload
                .get("user")
                .cloned()
                .map(serde_json::from_value::<User>)
                .transpose()
                .map_err(|e| WorkspaceError::InvalidResponse(format!("user: {}", e)))?
                .unwrap_or_default();
            let configuration = payload
                .get("configuration")
                .cloned()
                .unwrap_or(Value::Null);
            Ok(Initialization {
                user,
                configuration,
            })
        }
        "Failed" => Err(WorkspaceError::Notification(format!(
            "workspace initialization failed: {}",
            data
        ))),
        other => Err(WorkspaceError::InvalidResponse(format!(
            "unexpected initialization state '{}'",
            other
        ))),
    }
}

/// A running notification loop
pub struct NotificationTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl NotificationTask {
    /// Stop polling and wait for the loop to exit
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Notification task ended abnormally");
        }
    }
}

struct CometClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    client_id: Option<String>,
}

impl CometClient {
    async fn exchange(&self, message: CometMessage) -> Result<Vec<CometMessage>> {
        let mut request = self.http.post(&self.url).json(&[message]);
        if let Some(key) = self.api_key.as_deref() {
            request = request.header("x-api-key", key);
        }
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(WorkspaceError::Notification(format!(
                "notification endpoint returned {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| WorkspaceError::InvalidResponse(format!("cometd reply: {}", e)))
    }

    /// Handshake and subscribe to the workspace channels
    async fn open(&mut self) -> Result<()> {
        let replies = self.exchange(CometMessage::handshake()).await?;
        let reply = meta_reply(&replies, HANDSHAKE)?;
        let client_id = reply
            .client_id
            .clone()
            .ok_or_else(|| WorkspaceError::InvalidResponse("handshake without clientId".into()))?;
        debug!(client_id = %client_id, "CometD handshake complete");

        for channel in [INITIALIZATION_CHANNEL, VOICE_CHANNEL] {
            let replies = self
                .exchange(CometMessage::subscribe(&client_id, channel))
                .await?;
            meta_reply(&replies, SUBSCRIBE)?;
            debug!(channel = %channel, "Subscribed");
        }

        self.client_id = Some(client_id);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(client_id) = self.client_id.take() {
            if let Err(e) = self.exchange(CometMessage::disconnect(&client_id)).await {
                debug!(error = %e, "CometD disconnect failed");
            }
        }
    }
}

fn meta_reply<'a>(replies: &'a [CometMessage], channel: &str) -> Result<&'a CometMessage> {
    let reply = replies
        .iter()
        .find(|m| m.channel == channel)
        .ok_or_else(|| WorkspaceError::InvalidResponse(format!("no reply on {}", channel)))?;
    if reply.successful != Some(true) {
        return Err(WorkspaceError::Notification(reply.failure()));
    }
    Ok(reply)
}

/// What the loop should do after a connect reply
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Connect,
    Handshake,
    Stop,
}

fn next_step(replies: &[CometMessage]) -> Next {
    let Some(reply) = replies.iter().find(|m| m.channel == CONNECT) else {
        return Next::Connect;
    };
    let advice = reply
        .advice
        .as_ref()
        .and_then(|a| a.reconnect.as_deref());
    match (reply.successful, advice) {
        (_, Some("none")) => Next::Stop,
        (_, Some("handshake")) => Next::Handshake,
        (Some(true), _) => Next::Connect,
        _ => Next::Handshake,
    }
}

/// Open the notification channel and spawn the long-poll loop.
///
/// Fails if the initial handshake or subscriptions fail.
pub async fn start(
    http: reqwest::Client,
    base_url: &str,
    api_key: Option<String>,
    sinks: Sinks,
) -> Result<NotificationTask> {
    let mut comet = CometClient {
        http,
        url: format!("{}/workspace/v3/notifications", base_url),
        api_key,
        client_id: None,
    };
    comet.open().await?;
    info!(url = %comet.url, "Notification channel open");

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move {
        run_loop(&mut comet, &sinks, &token).await;
        comet.close().await;
    });

    Ok(NotificationTask { cancel, handle })
}

async fn run_loop(comet: &mut CometClient, sinks: &Sinks, cancel: &CancellationToken) {
    loop {
        let Some(client_id) = comet.client_id.clone() else {
            return;
        };

        let replies = tokio::select! {
            _ = cancel.cancelled() => return,
            replies = comet.exchange(CometMessage::connect(&client_id)) => replies,
        };

        let replies = match replies {
            Ok(replies) => replies,
            Err(e) => {
                warn!(error = %e, "Notification poll failed");
                if !rehandshake(comet, cancel).await {
                    return;
                }
                continue;
            }
        };

        for message in replies.iter().filter(|m| !m.is_meta()) {
            sinks.route(message);
        }

        match next_step(&replies) {
            Next::Connect => {}
            Next::Handshake => {
                if !rehandshake(comet, cancel).await {
                    return;
                }
            }
            Next::Stop => {
                warn!("Server advised no reconnect; notifications stopped");
                comet.client_id = None;
                return;
            }
        }
    }
}

/// One re-handshake attempt after a short pause; false when cancelled or failed.
async fn rehandshake(comet: &mut CometClient, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => return false,
        _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
    }
    comet.client_id = None;
    match comet.open().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Notification re-handshake failed; notifications stopped");
            false
        }
    }
}
