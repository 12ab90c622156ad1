use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::context::Route;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::paths;

/// Default catalog compiled into the binary; used when no agents.json has
/// been installed under the config directory.
const EMBEDDED_CATALOG: &str = include_str!("agents.json");

/// One named filtering policy from the catalog.
///
/// `filter_criteria` holds at most one of action_where, language, shell, vcs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterAgent {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub filter_criteria: BTreeMap<String, String>,
}

impl FilterAgent {
    pub fn action_where(&self) -> Option<&str> {
        self.filter_criteria.get("action_where").map(String::as_str)
    }
}

/// The trigger-agent specification object: documents the closed action set
/// and the context-key vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerAgentSpec {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub context_keys: Vec<String>,
}

/// The agent catalog. Constructed once and passed by reference; immutable
/// after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub filter_agents: Vec<FilterAgent>,
    pub trigger_agent: TriggerAgentSpec,
}

impl Catalog {
    /// Load the catalog: agents.json under the config directory when present,
    /// otherwise the embedded default.
    pub fn load() -> Result<Catalog> {
        let path = paths::catalog_json()?;
        if path.exists() {
            return Self::load_from(&path);
        }
        Self::embedded()
    }

    pub fn load_from(path: &Path) -> Result<Catalog> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::internal_io(e.to_string(), Some("read agent catalog".to_string())))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::catalog_invalid_json(path.display().to_string(), e))
    }

    pub fn embedded() -> Result<Catalog> {
        serde_json::from_str(EMBEDDED_CATALOG)
            .map_err(|e| Error::catalog_invalid_json("<embedded>", e))
    }

    pub fn agent(&self, id: &str) -> Option<&FilterAgent> {
        self.filter_agents.iter().find(|a| a.id == id)
    }

    pub fn agent_ids(&self) -> Vec<String> {
        self.filter_agents.iter().map(|a| a.id.clone()).collect()
    }

    /// Apply a named filter agent to a node set.
    ///
    /// Unknown agents pass the set through. An agent whose criteria carry
    /// `action_where`, paired with a context key, keeps everything when the
    /// key routes to that venue and nothing otherwise. Agents with other
    /// criteria (language, shell, vcs) do not constrain nodes.
    pub fn filter_nodes_for_agent(
        &self,
        nodes: &[Node],
        agent_id: &str,
        context_key: Option<&str>,
    ) -> Vec<Node> {
        let Some(agent) = self.agent(agent_id) else {
            return nodes.to_vec();
        };

        if let (Some(where_), Some(key)) = (agent.action_where(), context_key) {
            let key_where = match Route::for_key(Some(key)) {
                Route::Github => Some("github"),
                Route::Hpcc => Some("hpcc"),
                Route::Local => None,
            };
            if key_where == Some(where_) {
                return nodes.to_vec();
            }
            return Vec::new();
        }

        nodes.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_parses() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.filter_agents.len(), 10);
        assert!(catalog.agent("github").is_some());
        assert!(catalog.agent("zsh").is_some());
        assert_eq!(catalog.trigger_agent.context_keys.len(), 20);
        assert!(catalog
            .trigger_agent
            .actions
            .iter()
            .any(|a| a == "workflow_dispatch"));
    }

    #[test]
    fn unknown_agent_passes_nodes_through() {
        let catalog = Catalog::embedded().unwrap();
        let nodes = vec![Node::named("a"), Node::named("b")];
        let out = catalog.filter_nodes_for_agent(&nodes, "nope", Some("owner_github_granite"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn action_where_agent_is_all_or_nothing() {
        let catalog = Catalog::embedded().unwrap();
        let nodes = vec![Node::named("a"), Node::named("b")];

        let kept =
            catalog.filter_nodes_for_agent(&nodes, "github", Some("owner_github_granite"));
        assert_eq!(kept.len(), 2);

        let dropped = catalog.filter_nodes_for_agent(&nodes, "github", Some("owner_hpcc_qwen"));
        assert!(dropped.is_empty());

        let local = catalog.filter_nodes_for_agent(&nodes, "hpcc", Some("plain"));
        assert!(local.is_empty());
    }

    #[test]
    fn language_agent_does_not_constrain_nodes() {
        let catalog = Catalog::embedded().unwrap();
        let nodes = vec![Node::named("a")];
        let out = catalog.filter_nodes_for_agent(&nodes, "python", Some("owner_github_granite"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn load_from_reads_installed_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.json");
        std::fs::write(
            &path,
            r#"{
                "filter_agents": [
                    {"id": "solo", "name": "Solo", "role": "venue",
                     "filter_criteria": {"action_where": "hpcc"}}
                ],
                "trigger_agent": {"id": "t", "name": "T", "role": "dispatch"}
            }"#,
        )
        .unwrap();

        let catalog = Catalog::load_from(&path).unwrap();
        assert_eq!(catalog.agent_ids(), vec!["solo"]);
        assert!(catalog.trigger_agent.actions.is_empty());
    }

    #[test]
    fn malformed_catalog_reports_structured_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Catalog::load_from(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "catalog.invalid_json");
    }
}
