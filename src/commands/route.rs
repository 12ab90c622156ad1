use clap::Args;

use switchman::route::{self, RouteRequest};
use switchman::runner::LocalRunner;
use switchman::trigger::TriggerResult;

use super::CmdResult;

#[derive(Args)]
pub struct RouteArgs {
    /// Context key (falls back to the CONTEXT_KEY environment variable)
    pub context_key: Option<String>,

    /// Cluster the target lives on (used when no context key is given)
    #[arg(long)]
    pub cluster: Option<String>,

    /// Project name (prefix selects the environment segment)
    #[arg(long)]
    pub project: Option<String>,

    /// Model name (granite, deepseek, qwen, codellama)
    #[arg(long)]
    pub model: Option<String>,

    /// Language hint (informational, does not affect routing)
    #[arg(long)]
    pub language: Option<String>,

    /// Repository hint (informational, does not affect routing)
    #[arg(long)]
    pub repository: Option<String>,

    /// Execute the routed command instead of only printing it
    #[arg(long)]
    pub run: bool,
}

pub fn run(args: RouteArgs, _global: &super::GlobalArgs) -> CmdResult<TriggerResult> {
    let context_key = args
        .context_key
        .or_else(|| std::env::var("CONTEXT_KEY").ok())
        .filter(|k| !k.trim().is_empty());

    let request = RouteRequest {
        context_key,
        language: args.language,
        project: args.project,
        repository: args.repository,
        cluster: args.cluster,
        model: args.model,
    };

    let planned = route::plan(&request)?;
    let result = if args.run {
        route::execute(&planned, &LocalRunner::new())
    } else {
        planned
    };

    let exit_code = if result.ok { 0 } else { 1 };
    Ok((result, exit_code))
}
