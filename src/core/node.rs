use regex::Regex;
use serde::{Deserialize, Serialize};

/// A repository/host unit that can be filtered and targeted by a trigger.
///
/// `owner` + `repo` (or `slug`) make a node addressable for remote CI
/// dispatch; `path` makes it addressable for local git and job actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl Node {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            owner: None,
            repo: None,
            slug: None,
        }
    }

    /// Repo identifier for CI dispatch: explicit repo, falling back to slug.
    pub fn repo_or_slug(&self) -> Option<&str> {
        self.repo
            .as_deref()
            .filter(|r| !r.is_empty())
            .or(self.slug.as_deref().filter(|s| !s.is_empty()))
    }
}

fn has(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Keep nodes addressable by the receiver (owner and repo both present).
///
/// Unrecognized receivers pass the input through unchanged: callers chain
/// filters for criteria that do not apply to a given agent, and an unknown
/// value must not empty the result set.
pub fn filter_by_receiver(nodes: &[Node], receiver: &str) -> Vec<Node> {
    if receiver != "github" && receiver != "hpcc" {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter(|n| has(&n.owner) && has(&n.repo))
        .cloned()
        .collect()
}

/// Keep nodes whose name marks them as living at the execution venue.
///
/// github matches case-sensitively; hpcc matches case-folded. Unrecognized
/// venues pass through.
pub fn filter_by_action_where(nodes: &[Node], where_: &str) -> Vec<Node> {
    if where_ != "github" && where_ != "hpcc" {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter(|n| match where_ {
            "github" => n.name.contains("github"),
            _ => n.name.to_lowercase().contains("hpcc"),
        })
        .cloned()
        .collect()
}

/// Keep nodes relevant to the client identity. Unrecognized clients pass through.
pub fn filter_by_action_client(nodes: &[Node], client: &str) -> Vec<Node> {
    if client != "macbook" && client != "rockydesktop" {
        return nodes.to_vec();
    }
    nodes
        .iter()
        .filter(|n| match client {
            "macbook" => n.name.contains("owner"),
            _ => n.name.contains("quay"),
        })
        .cloned()
        .collect()
}

/// Keep nodes whose name matches the regex pattern.
pub fn filter_by_repo_name(nodes: &[Node], pattern: &Regex) -> Vec<Node> {
    nodes
        .iter()
        .filter(|n| pattern.is_match(&n.name))
        .cloned()
        .collect()
}

/// Keep nodes whose name contains the literal string (escaped, never treated
/// as an accidental regex).
pub fn filter_by_repo_name_literal(nodes: &[Node], literal: &str) -> crate::Result<Vec<Node>> {
    let pattern = Regex::new(&regex::escape(literal)).map_err(|e| {
        crate::Error::validation_invalid_argument(
            "pattern",
            format!("Invalid name pattern: {}", e),
            None,
            None,
        )
    })?;
    Ok(filter_by_repo_name(nodes, &pattern))
}
