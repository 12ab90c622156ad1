use clap::{Args, Subcommand};
use serde::Serialize;

use switchman::catalog::Catalog;
use switchman::json;
use switchman::node::{
    self, filter_by_action_client, filter_by_action_where, filter_by_receiver, Node,
};

use super::CmdResult;

#[derive(Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    command: NodesCommand,
}

#[derive(Subcommand)]
enum NodesCommand {
    /// Filter a node list down to the subset matching the given criteria
    Filter {
        /// Node list JSON (inline, @file, or - for stdin)
        spec: String,

        /// Keep nodes addressable by this receiver (github, hpcc)
        #[arg(long)]
        receiver: Option<String>,

        /// Keep nodes at this execution venue (github, hpcc)
        #[arg(long = "where")]
        action_where: Option<String>,

        /// Keep nodes relevant to this client (macbook, rockydesktop)
        #[arg(long)]
        client: Option<String>,

        /// Keep nodes whose name contains this literal string
        #[arg(long, conflicts_with = "pattern")]
        name: Option<String>,

        /// Keep nodes whose name matches this regular expression
        #[arg(long)]
        pattern: Option<String>,

        /// Apply a named filter agent from the catalog
        #[arg(long)]
        agent: Option<String>,

        /// Context key handed to the filter agent
        #[arg(long)]
        context_key: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutput {
    pub total: usize,
    pub kept: usize,
    pub nodes: Vec<Node>,
}

pub fn run(args: NodesArgs, _global: &super::GlobalArgs) -> CmdResult<FilterOutput> {
    match args.command {
        NodesCommand::Filter {
            spec,
            receiver,
            action_where,
            client,
            name,
            pattern,
            agent,
            context_key,
        } => {
            let raw = json::read_json_spec_to_string(&spec)?;
            let mut nodes: Vec<Node> = json::from_str(&raw)?;
            let total = nodes.len();

            if let Some(receiver) = receiver {
                nodes = filter_by_receiver(&nodes, &receiver);
            }
            if let Some(where_) = action_where {
                nodes = filter_by_action_where(&nodes, &where_);
            }
            if let Some(client) = client {
                nodes = filter_by_action_client(&nodes, &client);
            }
            if let Some(literal) = name {
                nodes = node::filter_by_repo_name_literal(&nodes, &literal)?;
            }
            if let Some(pattern) = pattern {
                let re = regex::Regex::new(&pattern).map_err(|e| {
                    switchman::Error::validation_invalid_argument(
                        "pattern",
                        format!("Invalid name pattern: {}", e),
                        None,
                        None,
                    )
                })?;
                nodes = node::filter_by_repo_name(&nodes, &re);
            }
            if let Some(agent_id) = agent {
                let catalog = Catalog::load()?;
                if catalog.agent(&agent_id).is_none() {
                    return Err(switchman::Error::agent_not_found(agent_id));
                }
                nodes =
                    catalog.filter_nodes_for_agent(&nodes, &agent_id, context_key.as_deref());
            }

            let output = FilterOutput {
                total,
                kept: nodes.len(),
                nodes,
            };
            Ok((output, 0))
        }
    }
}
