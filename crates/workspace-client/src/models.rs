// ABOUTME: Data models for workspace-client
// ABOUTME: Call, Participant, Dn, User, KvPair and pushed WorkspaceEvent types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One party on a call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default)]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A key/value pair attached to a call or user event. Values are always strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvPair {
    pub key: String,
    #[serde(rename = "type", default = "string_type")]
    pub kind: String,
    pub value: String,
}

fn string_type() -> String {
    "str".to_string()
}

impl KvPair {
    /// Build a string-typed pair
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: string_type(),
            value: value.into(),
        }
    }
}

/// A voice call as tracked by the workspace service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub call_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_conn_id: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ani: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnis: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_data: Vec<KvPair>,
}

impl Call {
    /// Whether the service reported the call as gone
    pub fn is_released(&self) -> bool {
        self.state.eq_ignore_ascii_case("released")
    }
}

/// Directory number and the agent state bound to it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dn {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub agent_state: String,
    #[serde(default)]
    pub agent_work_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnd: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_to: Option<String>,
}

/// The signed-in user's profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub default_place: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Session data delivered once initialization completes
#[derive(Debug, Clone, Default)]
pub struct Initialization {
    pub user: User,
    pub configuration: Value,
}

/// Events pushed by the workspace service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// A call changed state, or was re-keyed when `previous_conn_id` is set
    CallStateChanged {
        call: Call,
        previous_conn_id: Option<String>,
    },
    /// The agent's DN changed state
    DnStateChanged { dn: Dn },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallStateChangedBody {
    call: Call,
    #[serde(default)]
    previous_conn_id: Option<String>,
}

#[derive(Deserialize)]
struct DnStateChangedBody {
    dn: Dn,
}

impl WorkspaceEvent {
    /// Parse the `data` payload of a voice channel message.
    ///
    /// Returns `None` for message types the console does not render.
    pub fn from_voice_message(data: &Value) -> Option<Self> {
        let message_type = data.get("messageType")?.as_str()?;
        match message_type {
            "CallStateChanged" => {
                let body: CallStateChangedBody = serde_json::from_value(data.clone()).ok()?;
                Some(Self::CallStateChanged {
                    call: body.call,
                    previous_conn_id: body.previous_conn_id.filter(|id| !id.is_empty()),
                })
            }
            "DnStateChanged" => {
                let body: DnStateChangedBody = serde_json::from_value(data.clone()).ok()?;
                Some(Self::DnStateChanged { dn: body.dn })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_from_wire() {
        let call: Call = serde_json::from_value(json!({
            "id": "C1",
            "state": "Talking",
            "callType": "Internal",
            "parentConnId": "C0",
            "participants": [{"number": "5551234"}, {"number": "5550000", "role": "RoleOrigination"}],
            "userData": [{"key": "account", "type": "str", "value": "42"}]
        }))
        .unwrap();

        assert_eq!(call.id, "C1");
        assert_eq!(call.call_type, "Internal");
        assert_eq!(call.parent_conn_id.as_deref(), Some("C0"));
        assert_eq!(call.participants.len(), 2);
        assert_eq!(call.participants[1].role.as_deref(), Some("RoleOrigination"));
        assert_eq!(call.user_data, vec![KvPair::string("account", "42")]);
    }

    #[test]
    fn test_call_minimal_fields() {
        let call: Call = serde_json::from_value(json!({"id": "C2"})).unwrap();
        assert_eq!(call.id, "C2");
        assert!(call.state.is_empty());
        assert!(call.participants.is_empty());
        assert!(call.parent_conn_id.is_none());
    }

    #[test]
    fn test_call_serializes_camel_case() {
        let call = Call {
            id: "C1".into(),
            state: "Held".into(),
            call_type: "Outbound".into(),
            parent_conn_id: Some("C0".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["callType"], "Outbound");
        assert_eq!(value["parentConnId"], "C0");
        assert!(value.get("userData").is_none());
    }

    #[test]
    fn test_call_is_released() {
        let mut call = Call {
            id: "C1".into(),
            state: "Released".into(),
            ..Default::default()
        };
        assert!(call.is_released());
        call.state = "Dialing".into();
        assert!(!call.is_released());
    }

    #[test]
    fn test_kv_pair_is_string_typed() {
        let pair = KvPair::string("reason", "billing");
        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value, json!({"key": "reason", "type": "str", "value": "billing"}));
    }

    #[test]
    fn test_dn_optional_flags() {
        let dn: Dn = serde_json::from_value(json!({
            "number": "7001",
            "agentState": "NotReady",
            "agentWorkMode": "AfterCallWork",
            "dnd": true,
            "forwardTo": "7002"
        }))
        .unwrap();
        assert_eq!(dn.agent_work_mode, "AfterCallWork");
        assert_eq!(dn.dnd, Some(true));
        assert_eq!(dn.forward_to.as_deref(), Some("7002"));
    }

    #[test]
    fn test_event_call_state_changed() {
        let event = WorkspaceEvent::from_voice_message(&json!({
            "messageType": "CallStateChanged",
            "call": {"id": "C1", "state": "Ringing"}
        }))
        .unwrap();

        match event {
            WorkspaceEvent::CallStateChanged {
                call,
                previous_conn_id,
            } => {
                assert_eq!(call.id, "C1");
                assert_eq!(call.state, "Ringing");
                assert!(previous_conn_id.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_event_call_id_changed() {
        let event = WorkspaceEvent::from_voice_message(&json!({
            "messageType": "CallStateChanged",
            "previousConnId": "C1",
            "call": {"id": "C9", "state": "Talking"}
        }))
        .unwrap();
        assert!(matches!(
            event,
            WorkspaceEvent::CallStateChanged { previous_conn_id: Some(ref prev), .. } if prev == "C1"
        ));
    }

    #[test]
    fn test_event_empty_previous_id_is_none() {
        let event = WorkspaceEvent::from_voice_message(&json!({
            "messageType": "CallStateChanged",
            "previousConnId": "",
            "call": {"id": "C1"}
        }))
        .unwrap();
        assert!(matches!(
            event,
            WorkspaceEvent::CallStateChanged {
                previous_conn_id: None,
                ..
            }
        ));
    }

    #[test]
    fn test_event_dn_state_changed() {
        let event = WorkspaceEvent::from_voice_message(&json!({
            "messageType": "DnStateChanged",
            "dn": {"number": "7001", "agentState": "Ready", "agentWorkMode": "Unknown"}
        }))
        .unwrap();
        match event {
            WorkspaceEvent::DnStateChanged { dn } => {
                assert_eq!(dn.number, "7001");
                assert_eq!(dn.agent_state, "Ready");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_event_unknown_type_ignored() {
        assert!(
            WorkspaceEvent::from_voice_message(&json!({"messageType": "EventError"})).is_none()
        );
        assert!(WorkspaceEvent::from_voice_message(&json!({"call": {"id": "C1"}})).is_none());
    }

    #[test]
    fn test_user_from_wire() {
        let user: User = serde_json::from_value(json!({
            "employeeId": "E100",
            "agentId": "A100",
            "defaultPlace": "Place_7001",
            "userName": "jdoe"
        }))
        .unwrap();
        assert_eq!(user.employee_id, "E100");
        assert_eq!(user.default_place, "Place_7001");
        assert_eq!(user.user_name.as_deref(), Some("jdoe"));
    }
}
