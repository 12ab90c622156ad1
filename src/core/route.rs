//! Key-based trigger routing: resolve a context key, classify it, and build
//! the exact shell invocation for the routed venue.
//!
//! Building and executing are separate steps: `plan` returns the command in
//! the TriggerResult without side effects, and `execute` runs a planned
//! command through the process seam.

use serde::Deserialize;

use crate::context::{resolve_context_key, Route};
use crate::error::Result;
use crate::paths;
use crate::runner::ProcessRunner;
use crate::shell::{quote_arg, quote_path};
use crate::trigger::TriggerResult;
use crate::log_status;

pub const GITHUB_SYNC_SCRIPT: &str = "github-sync.sh";
pub const HPCC_CONNECT_SCRIPT: &str = "hpcc-connect.sh";

/// Identifying inputs for a key-based trigger. Every field is optional; an
/// explicit context key short-circuits derivation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteRequest {
    pub context_key: Option<String>,
    pub language: Option<String>,
    pub project: Option<String>,
    pub repository: Option<String>,
    pub cluster: Option<String>,
    pub model: Option<String>,
}

impl RouteRequest {
    pub fn for_key(key: impl Into<String>) -> Self {
        Self {
            context_key: Some(key.into()),
            ..Self::default()
        }
    }
}

/// Resolve, classify, and build the routed command without executing it.
pub fn plan(request: &RouteRequest) -> Result<TriggerResult> {
    let key = resolve_context_key(
        request.context_key.as_deref(),
        request.cluster.as_deref(),
        request.project.as_deref(),
        request.model.as_deref(),
    );
    let route = Route::for_key(key.as_deref());

    let command = match route {
        Route::Github => {
            let script = paths::scripts()?.join(GITHUB_SYNC_SCRIPT);
            let projects_dir = paths::projects_dir()?;
            Some(format!(
                "CONTEXT_KEY={} PROJECTS_DIR={} {} sync",
                quote_arg(key.as_deref().unwrap_or("")),
                quote_path(&projects_dir.display().to_string()),
                quote_path(&script.display().to_string()),
            ))
        }
        Route::Hpcc => {
            let script = paths::scripts()?.join(HPCC_CONNECT_SCRIPT);
            Some(format!(
                "CONTEXT_KEY={} {}",
                quote_arg(key.as_deref().unwrap_or("")),
                quote_path(&script.display().to_string()),
            ))
        }
        Route::Local => None,
    };

    Ok(TriggerResult::succeeded()
        .with_action(route.as_str())
        .with_context_key(key)
        .with_command(command))
}

/// Run a planned command through `sh -c`. Plans with no command (the local
/// route) succeed as a no-op.
pub fn execute(planned: &TriggerResult, runner: &dyn ProcessRunner) -> TriggerResult {
    let Some(command) = planned.command.as_deref() else {
        return planned.clone();
    };

    log_status!("route", "Running {}", command);
    let out = runner.run("sh", &["-c".to_string(), command.to_string()], None);

    let mut result = planned.clone();
    result.ok = out.success;
    result
}
