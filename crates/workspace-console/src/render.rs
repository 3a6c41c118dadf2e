// ABOUTME: Text rendering for calls, push events and structured dumps
// ABOUTME: One-line summaries for the prompt, pretty JSON for full views

use serde::Serialize;
use workspace_client::{Call, Dn, WorkspaceEvent};

/// Clears the terminal (RIS)
pub const CLEAR_SCREEN: &str = "\x1Bc";

pub fn pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// `Id [C1] state [Talking] type [Internal] participants [5551234, 5550000] parent [C0]`
pub fn call_summary(call: &Call) -> String {
    let participants = call
        .participants
        .iter()
        .map(|p| p.number.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut summary = format!(
        "Id [{}] state [{}] type [{}] participants [{}]",
        call.id, call.state, call.call_type, participants
    );
    if let Some(parent) = call.parent_conn_id.as_deref().filter(|p| !p.is_empty()) {
        summary.push_str(&format!(" parent [{}]", parent));
    }
    summary
}

fn dn_line(dn: &Dn) -> String {
    let mut line = format!(
        "DnStateChanged: number [{}] state [{}] workMode [{}]",
        dn.number, dn.agent_state, dn.agent_work_mode
    );
    if let Some(dnd) = dn.dnd {
        line.push_str(if dnd { " dnd [on]" } else { " dnd [off]" });
    }
    if let Some(target) = dn.forward_to.as_deref().filter(|t| !t.is_empty()) {
        line.push_str(&format!(" forwardTo [{}]", target));
    }
    line.push('.');
    line
}

/// The line printed for a pushed event
pub fn event_line(event: &WorkspaceEvent) -> String {
    match event {
        WorkspaceEvent::CallStateChanged {
            call,
            previous_conn_id: Some(previous),
        } => format!("Call [{}] id changed to [{}].", previous, call.id),
        WorkspaceEvent::CallStateChanged { call, .. } => format!(
            "CallStateChanged: id [{}] state [{}].",
            call.id, call.state
        ),
        WorkspaceEvent::DnStateChanged { dn } => dn_line(dn),
    }
}
