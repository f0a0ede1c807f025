//! Indentation-to-tree parser for nested bullet lists.
//!
//! Turns editor text into a flat, ordered list of [`Node`]s with explicit
//! parent and child references. Lines that are not bullet items (blank
//! lines, headings, prose) are skipped, not rejected. Indentation is
//! measured in 4-space steps; tab-indented input is out of contract.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Node;

/// Leading-whitespace columns per nesting level.
const INDENT_WIDTH: usize = 4;

static BULLET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[-*]\s*(.*?)\s*$").expect("bullet pattern is valid"));

/// Parses `text` into nodes in source order.
///
/// Total over its input: there is no failure path, only varying output
/// cardinality. A document with no qualifying bullet lines yields an
/// empty list.
pub fn parse(text: &str) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    // Open path from root to the most recent node at each depth.
    let mut stack: Vec<(String, usize)> = Vec::new();
    let mut counter = 1u64;

    for line in text.lines() {
        let Some(caps) = BULLET_LINE.captures(line) else {
            continue;
        };
        let content = &caps[2];
        if content.is_empty() {
            continue;
        }
        // Floor division fixes structural placement: partial indents
        // contribute nothing.
        let depth = caps[1].chars().count() / INDENT_WIDTH;

        // A parent must sit strictly shallower than the current line;
        // equal depth means sibling, not child.
        while stack.last().is_some_and(|&(_, d)| d >= depth) {
            stack.pop();
        }

        let id = format!("node_{counter}");
        counter += 1;
        let parent_id = stack.last().map(|(parent, _)| parent.clone());

        if let Some(parent_id) = &parent_id
            && let Some(parent) = nodes.iter_mut().find(|n| &n.id == parent_id)
        {
            parent.child_ids.push(id.clone());
        }

        nodes.push(Node {
            id: id.clone(),
            content: content.to_string(),
            parent_id,
            child_ids: Vec::new(),
        });
        stack.push((id, depth));
    }

    nodes
}
