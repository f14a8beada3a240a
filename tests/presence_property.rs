//! Property-based tests for the presence tracker
//!
//! For arbitrary interleavings of register/unregister calls across several
//! usernames and connections, the online snapshot must always equal exactly
//! the set of usernames holding a non-empty connection set.

mod common;

use kindred::backend::presence::PresenceTracker;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Connect { user: usize, conn: usize },
    Disconnect { user: usize, conn: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize, 0..6usize).prop_map(|(user, conn)| Op::Connect { user, conn }),
        (0..4usize, 0..6usize).prop_map(|(user, conn)| Op::Disconnect { user, conn }),
    ]
}

fn username(user: usize) -> String {
    format!("user{user}")
}

fn connection_id(user: usize, conn: usize) -> String {
    format!("conn{user}x{conn}")
}

proptest! {
    #[test]
    fn snapshot_always_matches_model(ops in proptest::collection::vec(op_strategy(), 1..120)) {
        let tracker = PresenceTracker::new();
        // Reference model with the tracker's exact semantics: connect
        // appends, disconnect removes every matching id.
        let mut model: HashMap<String, Vec<String>> = HashMap::new();

        for op in ops {
            match op {
                Op::Connect { user, conn } => {
                    let name = username(user);
                    let id = connection_id(user, conn);
                    let was_first = tracker.user_connected(&name, &id);
                    let entry = model.entry(name).or_default();
                    prop_assert_eq!(was_first, entry.is_empty());
                    entry.push(id);
                }
                Op::Disconnect { user, conn } => {
                    let name = username(user);
                    let id = connection_id(user, conn);
                    let was_last = tracker.user_disconnected(&name, &id);
                    let had_user = model.get(&name).is_some_and(|c| !c.is_empty());
                    if let Some(connections) = model.get_mut(&name) {
                        connections.retain(|c| c != &id);
                    }
                    let now_empty = model.get(&name).map_or(true, |c| c.is_empty());
                    prop_assert_eq!(was_last, had_user && now_empty);
                    if now_empty {
                        model.remove(&name);
                    }
                }
            }

            let mut expected: Vec<String> = model
                .iter()
                .filter(|(_, connections)| !connections.is_empty())
                .map(|(name, _)| name.clone())
                .collect();
            expected.sort();
            prop_assert_eq!(tracker.online_users(), expected);
        }
    }

    #[test]
    fn connections_for_matches_model(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let tracker = PresenceTracker::new();
        let mut model: HashMap<String, Vec<String>> = HashMap::new();

        for op in ops {
            match op {
                Op::Connect { user, conn } => {
                    let name = username(user);
                    let id = connection_id(user, conn);
                    tracker.user_connected(&name, &id);
                    model.entry(name).or_default().push(id);
                }
                Op::Disconnect { user, conn } => {
                    let name = username(user);
                    let id = connection_id(user, conn);
                    tracker.user_disconnected(&name, &id);
                    if let Some(connections) = model.get_mut(&name) {
                        connections.retain(|c| c != &id);
                        if connections.is_empty() {
                            model.remove(&name);
                        }
                    }
                }
            }
        }

        for user in 0..4usize {
            let name = username(user);
            let expected = model.get(&name).cloned().unwrap_or_default();
            prop_assert_eq!(tracker.connections_for(&name), expected);
        }
    }
}
