// ABOUTME: Voice state tracked from pushed events
// ABOUTME: Keeps the active call list and the agent DN current

use crate::models::{Call, Dn, WorkspaceEvent};

/// Calls and DN as last reported by the workspace service
#[derive(Debug, Default, Clone)]
pub struct VoiceState {
    calls: Vec<Call>,
    dn: Option<Dn>,
}

impl VoiceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active calls in the order they were first reported
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn dn(&self) -> Option<&Dn> {
        self.dn.as_ref()
    }

    /// Fold one pushed event into the state
    pub fn apply(&mut self, event: &WorkspaceEvent) {
        match event {
            WorkspaceEvent::CallStateChanged {
                call,
                previous_conn_id,
            } => {
                if let Some(previous) = previous_conn_id {
                    if self.calls.iter().any(|c| &c.id == previous) {
                        self.rekey(previous, call);
                        return;
                    }
                }

                if call.is_released() {
                    self.calls.retain(|c| c.id != call.id);
                } else if let Some(existing) = self.calls.iter_mut().find(|c| c.id == call.id) {
                    *existing = call.clone();
                } else {
                    self.calls.push(call.clone());
                }
            }
            WorkspaceEvent::DnStateChanged { dn } => {
                self.dn = Some(dn.clone());
            }
        }
    }

    /// Forget everything, used on logout
    pub fn clear(&mut self) {
        self.calls.clear();
        self.dn = None;
    }

    // The entry under `previous` takes over the new id; any entry already
    // reported under that id is stale.
    fn rekey(&mut self, previous: &str, call: &Call) {
        self.calls.retain(|c| c.id == previous || c.id != call.id);
        if call.is_released() {
            self.calls.retain(|c| c.id != previous);
        } else if let Some(existing) = self.calls.iter_mut().find(|c| c.id == previous) {
            *existing = call.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str, state: &str) -> Call {
        Call {
            id: id.to_string(),
            state: state.to_string(),
            ..Default::default()
        }
    }

    fn changed(call: Call) -> WorkspaceEvent {
        WorkspaceEvent::CallStateChanged {
            call,
            previous_conn_id: None,
        }
    }

    #[test]
    fn test_new_call_is_added() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Ringing")));
        assert_eq!(state.calls().len(), 1);
        assert_eq!(state.calls()[0].state, "Ringing");
    }

    #[test]
    fn test_existing_call_is_updated_in_place() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Ringing")));
        state.apply(&changed(call("C2", "Dialing")));
        state.apply(&changed(call("C1", "Talking")));

        let ids: Vec<&str> = state.calls().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2"]);
        assert_eq!(state.calls()[0].state, "Talking");
    }

    #[test]
    fn test_released_call_is_removed() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Talking")));
        state.apply(&changed(call("C1", "Released")));
        assert!(state.calls().is_empty());
    }

    #[test]
    fn test_released_unknown_call_is_ignored() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Released")));
        assert!(state.calls().is_empty());
    }

    #[test]
    fn test_call_id_reassigned() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Dialing")));
        state.apply(&WorkspaceEvent::CallStateChanged {
            call: call("C9", "Talking"),
            previous_conn_id: Some("C1".into()),
        });

        assert_eq!(state.calls().len(), 1);
        assert_eq!(state.calls()[0].id, "C9");
        assert_eq!(state.calls()[0].state, "Talking");
    }

    #[test]
    fn test_call_id_reassigned_onto_known_id() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Dialing")));
        state.apply(&changed(call("C9", "Dialing")));
        state.apply(&WorkspaceEvent::CallStateChanged {
            call: call("C9", "Talking"),
            previous_conn_id: Some("C1".into()),
        });

        assert_eq!(state.calls().len(), 1);
        assert_eq!(state.calls()[0].state, "Talking");
    }

    #[test]
    fn test_call_id_reassigned_onto_earlier_known_id_keeps_new_data() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C9", "Dialing")));
        state.apply(&changed(call("C1", "Dialing")));
        state.apply(&WorkspaceEvent::CallStateChanged {
            call: call("C9", "Talking"),
            previous_conn_id: Some("C1".into()),
        });

        assert_eq!(state.calls().len(), 1);
        assert_eq!(state.calls()[0].id, "C9");
        assert_eq!(state.calls()[0].state, "Talking");
    }

    #[test]
    fn test_call_id_reassigned_and_released_is_removed() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Dialing")));
        state.apply(&WorkspaceEvent::CallStateChanged {
            call: call("C9", "Released"),
            previous_conn_id: Some("C1".into()),
        });
        assert!(state.calls().is_empty());
    }

    #[test]
    fn test_call_id_reassigned_and_released_drops_both_ids() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Dialing")));
        state.apply(&changed(call("C9", "Dialing")));
        state.apply(&changed(call("C5", "Talking")));
        state.apply(&WorkspaceEvent::CallStateChanged {
            call: call("C9", "Released"),
            previous_conn_id: Some("C1".into()),
        });

        let ids: Vec<&str> = state.calls().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C5"]);
    }

    #[test]
    fn test_call_id_reassigned_from_unknown_id_adds_call() {
        let mut state = VoiceState::new();
        state.apply(&WorkspaceEvent::CallStateChanged {
            call: call("C9", "Talking"),
            previous_conn_id: Some("C1".into()),
        });
        assert_eq!(state.calls().len(), 1);
        assert_eq!(state.calls()[0].id, "C9");
    }

    #[test]
    fn test_dn_state_replaced() {
        let mut state = VoiceState::new();
        assert!(state.dn().is_none());
        state.apply(&WorkspaceEvent::DnStateChanged {
            dn: Dn {
                number: "7001".into(),
                agent_state: "Ready".into(),
                ..Default::default()
            },
        });
        assert_eq!(state.dn().unwrap().agent_state, "Ready");
    }

    #[test]
    fn test_clear() {
        let mut state = VoiceState::new();
        state.apply(&changed(call("C1", "Talking")));
        state.apply(&WorkspaceEvent::DnStateChanged { dn: Dn::default() });
        state.clear();
        assert!(state.calls().is_empty());
        assert!(state.dn().is_none());
    }
}
