use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::node::Node;

/// Loose parameter bag accepted at the CLI/JSON boundary. Each action
/// extracts what it needs into its own typed struct, applying defaults at
/// construction; absent required fields reject the request before any
/// external call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Payload {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub workflow_id: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub inputs: Option<Value>,
    pub path: Option<String>,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub script: Option<String>,
    pub args: Option<Vec<String>>,
    pub merge_policy: Option<MergePolicy>,
}

/// How push_merge treats a failing local merge.
///
/// Advisory preserves the long-standing contract: the merge is best-effort
/// and only the push outcome counts. Strict aborts on merge failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    #[default]
    Advisory,
    Strict,
}

/// Which git subcommand a plain sync action runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitSubcommand {
    Push,
    Fetch,
    Pull,
}

impl GitSubcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitSubcommand::Push => "push",
            GitSubcommand::Fetch => "fetch",
            GitSubcommand::Pull => "pull",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowDispatchParams {
    pub owner: String,
    pub repo: String,
    pub workflow_id: String,
    pub git_ref: String,
    pub inputs: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct GitSyncParams {
    pub subcommand: GitSubcommand,
    pub path: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FetchMergeParams {
    pub path: PathBuf,
    pub remote: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub struct PushMergeParams {
    pub path: PathBuf,
    pub remote: String,
    pub branch: String,
    pub args: Vec<String>,
    pub policy: MergePolicy,
}

#[derive(Debug, Clone)]
pub struct JobSubmitParams {
    pub path: PathBuf,
    pub script: String,
}

#[derive(Debug, Clone)]
pub struct RunScriptParams {
    pub path: PathBuf,
    pub script: String,
}

/// The closed set of trigger actions. Adding an action is a compile-time
/// change: every dispatch site pattern-matches exhaustively.
#[derive(Debug, Clone)]
pub enum Action {
    WorkflowDispatch(WorkflowDispatchParams),
    GitSync(GitSyncParams),
    FetchMerge(FetchMergeParams),
    PushMerge(PushMergeParams),
    JobSubmit(JobSubmitParams),
    RunScript(RunScriptParams),
    Notify,
}

const DEFAULT_REF: &str = "main";
const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_BRANCH: &str = "main";
const DEFAULT_JOB_SCRIPT: &str = "job.sh";

fn first_present(a: &Option<String>, b: &Option<String>) -> Option<String> {
    a.as_deref()
        .filter(|v| !v.is_empty())
        .or(b.as_deref().filter(|v| !v.is_empty()))
        .map(String::from)
}

/// Node path wins over payload path; the directory must exist when
/// `must_exist` is set.
fn resolve_path(
    node: &Node,
    payload: &Payload,
    must_exist: bool,
) -> std::result::Result<PathBuf, String> {
    let Some(path) = first_present(&node.path, &payload.path) else {
        return Err("missing path".to_string());
    };
    let path = PathBuf::from(path);
    if must_exist && !path.is_dir() {
        return Err("missing path".to_string());
    }
    Ok(path)
}

impl Action {
    /// Parse an action name and bind its parameters from node + payload.
    ///
    /// Unknown names and missing preconditions are rejected here, before
    /// anything external happens; the returned message is the `error` field
    /// of the eventual TriggerResult.
    pub fn from_request(
        name: &str,
        node: &Node,
        payload: &Payload,
    ) -> std::result::Result<Action, String> {
        match name {
            "workflow_dispatch" => {
                let owner = first_present(&node.owner, &payload.owner);
                let repo = first_present(&node.repo, &payload.repo)
                    .or_else(|| node.slug.clone().filter(|s| !s.is_empty()));
                let workflow_id = payload.workflow_id.clone().filter(|w| !w.is_empty());
                match (owner, repo, workflow_id) {
                    (Some(owner), Some(repo), Some(workflow_id)) => {
                        Ok(Action::WorkflowDispatch(WorkflowDispatchParams {
                            owner,
                            repo,
                            workflow_id,
                            git_ref: payload
                                .git_ref
                                .clone()
                                .unwrap_or_else(|| DEFAULT_REF.to_string()),
                            inputs: payload.inputs.clone(),
                        }))
                    }
                    _ => Err("missing owner/repo/workflow_id".to_string()),
                }
            }
            "git_push" | "git_fetch" | "pull_merge" => {
                let subcommand = match name {
                    "git_push" => GitSubcommand::Push,
                    "git_fetch" => GitSubcommand::Fetch,
                    _ => GitSubcommand::Pull,
                };
                Ok(Action::GitSync(GitSyncParams {
                    subcommand,
                    path: resolve_path(node, payload, true)?,
                    args: payload.args.clone().unwrap_or_default(),
                }))
            }
            "fetch_merge" => Ok(Action::FetchMerge(FetchMergeParams {
                path: resolve_path(node, payload, true)?,
                remote: payload
                    .remote
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
                branch: payload
                    .branch
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            })),
            "push_merge" => Ok(Action::PushMerge(PushMergeParams {
                path: resolve_path(node, payload, true)?,
                remote: payload
                    .remote
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
                branch: payload
                    .branch
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                args: payload.args.clone().unwrap_or_default(),
                policy: payload.merge_policy.unwrap_or_default(),
            })),
            "job_submit" => Ok(Action::JobSubmit(JobSubmitParams {
                path: resolve_path(node, payload, false)?,
                script: payload
                    .script
                    .clone()
                    .unwrap_or_else(|| DEFAULT_JOB_SCRIPT.to_string()),
            })),
            "run_script" => {
                let path = resolve_path(node, payload, false)
                    .map_err(|_| "missing path/script".to_string())?;
                let script = payload
                    .script
                    .clone()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| "missing path/script".to_string())?;
                Ok(Action::RunScript(RunScriptParams { path, script }))
            }
            "notify" => Ok(Action::Notify),
            other => Err(format!("unknown action: {}", other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::WorkflowDispatch(_) => "workflow_dispatch",
            Action::GitSync(p) => match p.subcommand {
                GitSubcommand::Push => "git_push",
                GitSubcommand::Fetch => "git_fetch",
                GitSubcommand::Pull => "pull_merge",
            },
            Action::FetchMerge(_) => "fetch_merge",
            Action::PushMerge(_) => "push_merge",
            Action::JobSubmit(_) => "job_submit",
            Action::RunScript(_) => "run_script",
            Action::Notify => "notify",
        }
    }
}
