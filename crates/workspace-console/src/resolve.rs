// ABOUTME: Infers the target call when the operator leaves the id out
// ABOUTME: Only safe for a small, unambiguous set of active calls; otherwise unresolved

use workspace_client::Call;

/// A consult call and the call it was started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub conn_id: String,
    pub parent_conn_id: String,
}

/// An explicit single argument wins; otherwise the only active call, if there is exactly one.
pub fn resolve_call_id(calls: &[Call], args: &[String]) -> Option<String> {
    if let [id] = args {
        return Some(id.clone());
    }
    match calls {
        [only] => Some(only.id.clone()),
        _ => None,
    }
}

/// Two arguments are taken positionally as (conn id, parent conn id).
///
/// Without them, exactly two active calls where exactly one has a parent
/// resolve to that call and its parent.
pub fn resolve_call_id_and_parent(calls: &[Call], args: &[String]) -> Option<ParentRef> {
    if let [conn_id, parent_conn_id] = args {
        return Some(ParentRef {
            conn_id: conn_id.clone(),
            parent_conn_id: parent_conn_id.clone(),
        });
    }
    if calls.len() != 2 {
        return None;
    }

    let mut children = calls.iter().filter_map(|c| {
        c.parent_conn_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| (c, p))
    });
    let (child, parent) = children.next()?;
    if children.next().is_some() {
        return None;
    }
    Some(ParentRef {
        conn_id: child.id.clone(),
        parent_conn_id: parent.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> Call {
        Call {
            id: id.into(),
            ..Default::default()
        }
    }

    fn child(id: &str, parent: &str) -> Call {
        Call {
            id: id.into(),
            parent_conn_id: Some(parent.into()),
            ..Default::default()
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_call_id_no_calls() {
        assert_eq!(resolve_call_id(&[], &[]), None);
    }

    #[test]
    fn test_call_id_single_call() {
        assert_eq!(resolve_call_id(&[call("C1")], &[]), Some("C1".into()));
    }

    #[test]
    fn test_call_id_multiple_calls() {
        assert_eq!(resolve_call_id(&[call("C1"), call("C2")], &[]), None);
        assert_eq!(
            resolve_call_id(&[call("C1"), call("C2"), call("C3")], &[]),
            None
        );
    }

    #[test]
    fn test_call_id_explicit_argument_wins() {
        let explicit = args(&["C9"]);
        assert_eq!(resolve_call_id(&[], &explicit), Some("C9".into()));
        assert_eq!(resolve_call_id(&[call("C1")], &explicit), Some("C9".into()));
        assert_eq!(
            resolve_call_id(&[call("C1"), call("C2")], &explicit),
            Some("C9".into())
        );
    }

    #[test]
    fn test_call_id_two_arguments_fall_back_to_active_call() {
        assert_eq!(
            resolve_call_id(&[call("C1")], &args(&["a", "b"])),
            Some("C1".into())
        );
        assert_eq!(resolve_call_id(&[], &args(&["a", "b"])), None);
    }

    #[test]
    fn test_parent_from_active_calls() {
        let calls = vec![call("C1"), child("C2", "C1")];
        assert_eq!(
            resolve_call_id_and_parent(&calls, &[]),
            Some(ParentRef {
                conn_id: "C2".into(),
                parent_conn_id: "C1".into()
            })
        );
    }

    #[test]
    fn test_parent_explicit_arguments() {
        let resolved = resolve_call_id_and_parent(&[], &args(&["C5", "C4"])).unwrap();
        assert_eq!(resolved.conn_id, "C5");
        assert_eq!(resolved.parent_conn_id, "C4");
    }

    #[test]
    fn test_parent_unresolved_cases() {
        // one call
        assert_eq!(resolve_call_id_and_parent(&[child("C2", "C1")], &[]), None);
        // two calls, no parent
        assert_eq!(
            resolve_call_id_and_parent(&[call("C1"), call("C2")], &[]),
            None
        );
        // two calls, both with parents
        assert_eq!(
            resolve_call_id_and_parent(&[child("C1", "C0"), child("C2", "C0")], &[]),
            None
        );
        // three calls
        assert_eq!(
            resolve_call_id_and_parent(&[call("C1"), child("C2", "C1"), call("C3")], &[]),
            None
        );
        // one argument is not enough
        assert_eq!(
            resolve_call_id_and_parent(&[call("C1"), call("C2")], &args(&["C2"])),
            None
        );
    }

    #[test]
    fn test_parent_empty_parent_id_ignored() {
        let calls = vec![child("C1", ""), child("C2", "C1")];
        assert_eq!(
            resolve_call_id_and_parent(&calls, &[]).map(|r| r.conn_id),
            Some("C2".into())
        );
    }
}
