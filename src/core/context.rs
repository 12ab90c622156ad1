use serde::{Deserialize, Serialize};

/// The known model segments of a context key. Anything else maps to granite.
const MODELS: &[&str] = &["granite", "deepseek", "qwen", "codellama"];

/// Derive a context key from an explicit value or a (cluster, project, model)
/// combination.
///
/// An explicit key wins verbatim, with no validation against the closed
/// vocabulary: downstream classification degrades to the local route for
/// anything unrecognized. Without an explicit key, both cluster and model are
/// required; the environment segment follows the fixed naming contract
/// (owner_github, quay_github, hpcc_github, owner_hpcc, quay_hpcc) and the
/// model segment defaults to granite.
pub fn resolve_context_key(
    explicit: Option<&str>,
    cluster: Option<&str>,
    project: Option<&str>,
    model: Option<&str>,
) -> Option<String> {
    if let Some(key) = explicit {
        if !key.trim().is_empty() {
            return Some(key.to_string());
        }
    }

    let cluster = cluster?;
    let model = model?;
    if cluster.is_empty() || model.is_empty() {
        return None;
    }

    let cluster_lower = cluster.to_lowercase();
    let project_lower = project.unwrap_or("").to_lowercase();

    // The github and hpcc defaults differ on purpose: the environment
    // vocabulary is the closed set of five segments, not a grid.
    let env = if cluster_lower.contains("hpcc") {
        if project_lower.starts_with("owner") {
            "owner_hpcc"
        } else {
            "quay_hpcc"
        }
    } else if cluster_lower.contains("github") {
        if project_lower.starts_with("hpcc") {
            "hpcc_github"
        } else if project_lower.starts_with("quay") {
            "quay_github"
        } else {
            "owner_github"
        }
    } else {
        "owner_github"
    };

    let model_lower = model.to_lowercase();
    let model_segment = MODELS
        .iter()
        .find(|m| **m == model_lower)
        .copied()
        .unwrap_or("granite");

    Some(format!("{}_{}", env, model_segment))
}

/// Where a context key sends its trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Github,
    Hpcc,
    Local,
}

impl Route {
    /// Classify a context key by substring inspection.
    ///
    /// github is checked before hpcc: a key like `hpcc_github_granite`
    /// contains both segments, and its trigger is CI dispatch, not batch
    /// submission.
    pub fn for_key(key: Option<&str>) -> Route {
        let Some(key) = key else {
            return Route::Local;
        };
        if key.contains("github") {
            Route::Github
        } else if key.contains("hpcc") {
            Route::Hpcc
        } else {
            Route::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Github => "github",
            Route::Hpcc => "hpcc",
            Route::Local => "local",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
