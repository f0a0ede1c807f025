use serde::{Deserialize, Serialize};

/// One parsed bullet line with identity, content, and structural references.
///
/// Nodes live in a flat list and point at each other by id; `parent_id`
/// always refers to a node that appears earlier in the list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub child_ids: Vec<String>,
}
