//! Sequential parent-first upload of a parsed outline.
//!
//! Each remote call is fully awaited before the next begins: a child's
//! creation request needs the remote id the service assigned to its
//! parent, so no fan-out is possible. The id mapping lives for one
//! publish call and is discarded with it.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, error};

use crate::domain::Node;
use crate::remote::{CreateNode, RemoteError};

/// How much node content is shown when reporting a failure.
const CONTENT_PREVIEW_LEN: usize = 50;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("node \"{content}\" references parent {parent_id}, which is missing or unpublished")]
    UnresolvedParent { content: String, parent_id: String },

    #[error("parent chain of node \"{content}\" does not terminate")]
    CyclicParent { content: String },

    #[error("failed to upload node \"{content}\"")]
    Create {
        content: String,
        #[source]
        source: RemoteError,
    },
}

/// Outcome of a completed publish run.
#[derive(Debug)]
pub struct PublishReport {
    pub published: usize,
}

/// Orders nodes so that every parent strictly precedes its descendants.
///
/// Stable sort on tree depth: for two-level inputs this is the familiar
/// roots-first partition, and for deeper trees it stays a valid
/// dependency order, which the partition alone does not. Source order is
/// preserved within a depth.
pub fn publish_order(nodes: &[Node]) -> Result<Vec<&Node>, PublishError> {
    let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut depths: Vec<(usize, &Node)> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let mut depth = 0usize;
        let mut parent = node.parent_id.as_deref();
        while let Some(parent_id) = parent {
            let Some(ancestor) = by_id.get(parent_id) else {
                return Err(PublishError::UnresolvedParent {
                    content: preview(&node.content),
                    parent_id: parent_id.to_string(),
                });
            };
            depth += 1;
            if depth > nodes.len() {
                return Err(PublishError::CyclicParent {
                    content: preview(&node.content),
                });
            }
            parent = ancestor.parent_id.as_deref();
        }
        depths.push((depth, node));
    }

    depths.sort_by_key(|&(depth, _)| depth);
    Ok(depths.into_iter().map(|(_, node)| node).collect())
}

/// Uploads `nodes` in dependency order, threading each parent's remote id
/// into its children's creation requests.
///
/// Aborts on the first failure; nodes already created on the service are
/// left in place.
pub async fn publish<C: CreateNode>(
    nodes: &[Node],
    remote: &C,
) -> Result<PublishReport, PublishError> {
    let ordered = publish_order(nodes)?;
    let mut remote_ids: HashMap<&str, String> = HashMap::new();

    for node in ordered {
        let parent_remote = match node.parent_id.as_deref() {
            Some(parent_id) => match remote_ids.get(parent_id) {
                Some(remote_id) => Some(remote_id.as_str()),
                None => {
                    return Err(PublishError::UnresolvedParent {
                        content: preview(&node.content),
                        parent_id: parent_id.to_string(),
                    });
                }
            },
            None => None,
        };

        let created = remote
            .create_node(&node.content, parent_remote)
            .await
            .map_err(|source| {
                error!("upload of {} failed: {source}", node.id);
                PublishError::Create {
                    content: preview(&node.content),
                    source,
                }
            })?;

        debug!("created node {} -> {}", node.id, created.id);
        remote_ids.insert(node.id.as_str(), created.id);
    }

    Ok(PublishReport {
        published: remote_ids.len(),
    })
}

fn preview(content: &str) -> String {
    if content.chars().count() <= CONTENT_PREVIEW_LEN {
        content.to_string()
    } else {
        let cut: String = content.chars().take(CONTENT_PREVIEW_LEN).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::outline::parse;
    use crate::remote::CreatedNode;

    /// Records every call and can be told to fail at a given call index.
    struct FakeRemote {
        calls: Mutex<Vec<(String, Option<String>)>>,
        fail_at: Option<usize>,
    }

    impl FakeRemote {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at: None,
            }
        }

        fn failing_at(call: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at: Some(call),
            }
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CreateNode for FakeRemote {
        async fn create_node(
            &self,
            content: &str,
            parent: Option<&str>,
        ) -> Result<CreatedNode, RemoteError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push((content.to_string(), parent.map(str::to_string)));
            if self.fail_at == Some(index) {
                return Err(RemoteError::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    reason: "boom".to_string(),
                });
            }
            Ok(CreatedNode {
                id: format!("remote_{}", index + 1),
            })
        }
    }

    fn node(id: &str, content: &str, parent_id: Option<&str>) -> Node {
        Node {
            id: id.to_string(),
            content: content.to_string(),
            parent_id: parent_id.map(str::to_string),
            child_ids: Vec::new(),
        }
    }

    #[test]
    fn roots_precede_parented_nodes() {
        let nodes = vec![
            node("a", "A", None),
            node("b", "B", Some("a")),
            node("c", "C", None),
        ];
        let ordered = publish_order(&nodes).unwrap();
        let ids: Vec<&str> = ordered.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn deep_trees_stay_in_dependency_order() {
        // A list where a grandchild is sequenced before its parent; the
        // roots-first partition alone would upload it too early.
        let nodes = vec![
            node("gc", "grandchild", Some("c")),
            node("c", "child", Some("r")),
            node("r", "root", None),
        ];
        let ordered = publish_order(&nodes).unwrap();
        let ids: Vec<&str> = ordered.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["r", "c", "gc"]);
    }

    #[test]
    fn unknown_parent_is_a_hard_error() {
        let nodes = vec![node("b", "B", Some("ghost"))];
        let err = publish_order(&nodes).unwrap_err();
        assert!(matches!(err, PublishError::UnresolvedParent { .. }));
    }

    #[test]
    fn cyclic_parents_are_rejected() {
        let nodes = vec![node("a", "A", Some("b")), node("b", "B", Some("a"))];
        let err = publish_order(&nodes).unwrap_err();
        assert!(matches!(err, PublishError::CyclicParent { .. }));
    }

    #[tokio::test]
    async fn publishes_roots_before_children_with_remote_parent_ids() {
        let nodes = vec![
            node("a", "A", None),
            node("b", "B", Some("a")),
            node("c", "C", None),
        ];
        let remote = FakeRemote::new();

        let report = publish(&nodes, &remote).await.unwrap();
        assert_eq!(report.published, 3);

        let calls = remote.calls();
        assert_eq!(
            calls,
            vec![
                ("A".to_string(), None),
                ("C".to_string(), None),
                ("B".to_string(), Some("remote_1".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn grandchild_gets_its_parents_remote_id() {
        let nodes = parse("- root\n    - child\n        - grandchild\n");
        let remote = FakeRemote::new();

        publish(&nodes, &remote).await.unwrap();

        let calls = remote.calls();
        assert_eq!(calls[0], ("root".to_string(), None));
        assert_eq!(calls[1], ("child".to_string(), Some("remote_1".to_string())));
        assert_eq!(
            calls[2],
            ("grandchild".to_string(), Some("remote_2".to_string()))
        );
    }

    #[tokio::test]
    async fn failure_aborts_remaining_uploads() {
        let nodes = vec![
            node("a", "first", None),
            node("b", "second", None),
            node("c", "third", None),
        ];
        let remote = FakeRemote::failing_at(1);

        let err = publish(&nodes, &remote).await.unwrap_err();
        match err {
            PublishError::Create { content, .. } => assert_eq!(content, "second"),
            other => panic!("unexpected error: {other:?}"),
        }

        // The third node was never submitted.
        assert_eq!(remote.calls().len(), 2);
    }

    #[test]
    fn long_content_is_truncated_in_previews() {
        let long = "x".repeat(80);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), CONTENT_PREVIEW_LEN + 3);
        assert!(shown.ends_with("..."));
    }
}
