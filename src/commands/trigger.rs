use clap::Args;

use switchman::action::{MergePolicy, Payload};
use switchman::json;
use switchman::node::Node;
use switchman::runner::LocalRunner;
use switchman::trigger::{Dispatcher, TriggerResult};
use switchman::workflow::GithubWorkflowApi;

use super::CmdResult;

#[derive(Args)]
pub struct TriggerArgs {
    /// Action name: workflow_dispatch, git_push, git_fetch, fetch_merge,
    /// push_merge, pull_merge, job_submit, run_script, notify
    pub action: String,

    /// Node JSON (inline, @file, or - for stdin)
    #[arg(long)]
    pub node: Option<String>,

    /// Payload JSON (inline, @file, or - for stdin)
    #[arg(long, value_name = "JSON")]
    pub json: Option<String>,

    /// Node name when no node JSON is given
    #[arg(long)]
    pub name: Option<String>,

    /// Repository owner (workflow_dispatch)
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (workflow_dispatch)
    #[arg(long)]
    pub repo: Option<String>,

    /// Workflow file or id to dispatch
    #[arg(long)]
    pub workflow_id: Option<String>,

    /// Git ref for workflow dispatch (default: main)
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Working directory for git, job, and script actions
    #[arg(long)]
    pub path: Option<String>,

    /// Git remote (default: origin)
    #[arg(long)]
    pub remote: Option<String>,

    /// Git branch (default: main)
    #[arg(long)]
    pub branch: Option<String>,

    /// Script for job_submit (default: job.sh) or run_script
    #[arg(long)]
    pub script: Option<String>,

    /// Extra argument passed to the git subcommand (repeatable)
    #[arg(long = "arg", value_name = "ARG")]
    pub args: Vec<String>,

    /// Abort push_merge when the local merge fails instead of pushing anyway
    #[arg(long)]
    pub strict_merge: bool,
}

fn build_node(args: &TriggerArgs) -> switchman::Result<Node> {
    if let Some(spec) = &args.node {
        let raw = json::read_json_spec_to_string(spec)?;
        return json::from_str(&raw);
    }
    Ok(Node::named(
        args.name.clone().unwrap_or_else(|| "cli".to_string()),
    ))
}

fn build_payload(args: &TriggerArgs) -> switchman::Result<Payload> {
    let mut payload = match &args.json {
        Some(spec) => {
            let raw = json::read_json_spec_to_string(spec)?;
            json::from_str::<Payload>(&raw)?
        }
        None => Payload::default(),
    };

    // Explicit flags win over JSON fields
    if args.owner.is_some() {
        payload.owner = args.owner.clone();
    }
    if args.repo.is_some() {
        payload.repo = args.repo.clone();
    }
    if args.workflow_id.is_some() {
        payload.workflow_id = args.workflow_id.clone();
    }
    if args.git_ref.is_some() {
        payload.git_ref = args.git_ref.clone();
    }
    if args.path.is_some() {
        payload.path = args.path.clone();
    }
    if args.remote.is_some() {
        payload.remote = args.remote.clone();
    }
    if args.branch.is_some() {
        payload.branch = args.branch.clone();
    }
    if args.script.is_some() {
        payload.script = args.script.clone();
    }
    if !args.args.is_empty() {
        payload.args = Some(args.args.clone());
    }
    if args.strict_merge {
        payload.merge_policy = Some(MergePolicy::Strict);
    }

    Ok(payload)
}

pub fn run(args: TriggerArgs, _global: &super::GlobalArgs) -> CmdResult<TriggerResult> {
    let node = build_node(&args)?;
    let payload = build_payload(&args)?;

    let runner = LocalRunner::new();
    let api = GithubWorkflowApi::new();
    let dispatcher = Dispatcher::new(&runner, &api);

    let result = dispatcher.trigger(&node, &args.action, &payload);
    let exit_code = if result.ok { 0 } else { 1 };
    Ok((result, exit_code))
}
