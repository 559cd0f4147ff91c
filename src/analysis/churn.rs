//! Node churn between runs: arrivals, departures, and attribute
//! changes relative to a prior snapshot.
//!
//! The snapshot is an explicit value owned by the caller; this module
//! never touches the filesystem. Comparing against an empty snapshot
//! reports every active node as new, which is the correct first-run
//! behavior.

use chrono::NaiveDateTime;

use super::types::{AttributeChange, ChurnNode, ChurnReport, ChurnStats, NodeRecord, NodeSnapshot, Snapshot};

fn snapshot_timestamp(ts: Option<NaiveDateTime>) -> Option<String> {
    ts.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn churn_node(id: &str, user: &str, aka: &str, hardware: &str, role: &str, hops: u32) -> ChurnNode {
    ChurnNode {
        id: id.to_string(),
        user: user.to_string(),
        aka: aka.to_string(),
        hardware: hardware.to_string(),
        role: role.to_string(),
        hops,
    }
}

/// Snapshot of the currently active node set, to be persisted by the
/// caller for the next run.
pub fn build_snapshot(nodes: &[&NodeRecord]) -> Snapshot {
    nodes
        .iter()
        .map(|node| {
            (
                node.id.clone(),
                NodeSnapshot {
                    user: node.user.clone(),
                    aka: node.aka.clone(),
                    hardware: node.hardware.clone(),
                    role: node.role.clone(),
                    hops: node.hops,
                    timestamp: snapshot_timestamp(node.timestamp),
                },
            )
        })
        .collect()
}

/// Compare the active node set against the prior snapshot. Attribute
/// changes are only reported when both sides carry a non-empty value;
/// a field going from empty to populated is a fill-in, not a change.
pub fn analyze_churn(current: &[&NodeRecord], previous: &Snapshot) -> ChurnReport {
    let mut report = ChurnReport::default();

    for node in current {
        let prior = match previous.get(&node.id) {
            Some(p) => p,
            None => {
                report.new_nodes.push(churn_node(
                    &node.id,
                    &node.user,
                    &node.aka,
                    &node.hardware,
                    &node.role,
                    node.hops,
                ));
                continue;
            }
        };

        let changed = |field: &str, previous: &str, current: &str| {
            if !previous.is_empty() && !current.is_empty() && previous != current {
                Some(AttributeChange {
                    id: node.id.clone(),
                    field: field.to_string(),
                    previous: previous.to_string(),
                    current: current.to_string(),
                })
            } else {
                None
            }
        };

        if let Some(change) = changed("user", &prior.user, &node.user) {
            report.name_changes.push(change);
        }
        if let Some(change) = changed("aka", &prior.aka, &node.aka) {
            report.name_changes.push(change);
        }
        if let Some(change) = changed("role", &prior.role, &node.role) {
            report.role_changes.push(change);
        }
        if let Some(change) = changed("hardware", &prior.hardware, &node.hardware) {
            report.hardware_changes.push(change);
        }
    }

    let active: std::collections::HashSet<&str> =
        current.iter().map(|n| n.id.as_str()).collect();
    for (id, prior) in previous {
        if !active.contains(id.as_str()) {
            report.lost_nodes.push(churn_node(
                id,
                &prior.user,
                &prior.aka,
                &prior.hardware,
                &prior.role,
                prior.hops,
            ));
        }
    }

    report.stats = ChurnStats {
        total_active_nodes: current.len(),
        new_count: report.new_nodes.len(),
        lost_count: report.lost_nodes.len(),
        changed_count: report.name_changes.len()
            + report.role_changes.len()
            + report.hardware_changes.len(),
    };

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, user: &str, aka: &str, hardware: &str, role: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            user: user.to_string(),
            aka: aka.to_string(),
            hardware: hardware.to_string(),
            role: role.to_string(),
            ..NodeRecord::default()
        }
    }

    #[test]
    fn test_first_run_everything_is_new() {
        let a = node("!a", "Alpha", "ALFA", "TBEAM", "CLIENT");
        let b = node("!b", "Beta", "", "HELTEC", "ROUTER");
        let current = vec![&a, &b];

        let report = analyze_churn(&current, &Snapshot::new());
        assert_eq!(report.new_nodes.len(), 2);
        assert!(report.lost_nodes.is_empty());
        assert_eq!(report.stats.new_count, 2);
        assert_eq!(report.stats.total_active_nodes, 2);
    }

    #[test]
    fn test_lost_and_changed_nodes() {
        let a_then = node("!a", "Alpha", "ALFA", "TBEAM", "CLIENT");
        let b_then = node("!b", "Beta", "", "HELTEC", "ROUTER");
        let snapshot = build_snapshot(&[&a_then, &b_then]);

        // !b disappears, !a changes role and hardware
        let a_now = node("!a", "Alpha", "ALFA", "RAK4631", "ROUTER");
        let report = analyze_churn(&[&a_now], &snapshot);

        assert!(report.new_nodes.is_empty());
        assert_eq!(report.lost_nodes.len(), 1);
        assert_eq!(report.lost_nodes[0].id, "!b");
        assert_eq!(report.role_changes.len(), 1);
        assert_eq!(report.role_changes[0].previous, "CLIENT");
        assert_eq!(report.role_changes[0].current, "ROUTER");
        assert_eq!(report.hardware_changes.len(), 1);
        assert_eq!(report.stats.changed_count, 2);
    }

    #[test]
    fn test_empty_to_populated_is_not_a_change() {
        let a_then = node("!a", "Alpha", "", "", "CLIENT");
        let snapshot = build_snapshot(&[&a_then]);

        let a_now = node("!a", "Alpha", "ALFA", "TBEAM", "CLIENT");
        let report = analyze_churn(&[&a_now], &snapshot);

        assert!(report.name_changes.is_empty());
        assert!(report.hardware_changes.is_empty());
        assert_eq!(report.stats.changed_count, 0);
    }

    #[test]
    fn test_name_change_is_reported() {
        let a_then = node("!a", "Alpha", "ALFA", "TBEAM", "CLIENT");
        let snapshot = build_snapshot(&[&a_then]);

        let a_now = node("!a", "Alpha Base", "ALFA", "TBEAM", "CLIENT");
        let report = analyze_churn(&[&a_now], &snapshot);

        assert_eq!(report.name_changes.len(), 1);
        assert_eq!(report.name_changes[0].field, "user");
    }
}
