use clap::{Args, Subcommand};
use serde::Serialize;

use switchman::catalog::{Catalog, FilterAgent, TriggerAgentSpec};

use super::CmdResult;

#[derive(Args)]
pub struct AgentArgs {
    #[command(subcommand)]
    command: AgentCommand,
}

#[derive(Subcommand)]
enum AgentCommand {
    /// List the filter agents in the catalog
    List,
    /// Show one filter agent
    Show {
        /// Agent ID
        id: String,
    },
    /// Show the trigger-agent specification (actions and context keys)
    Spec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListOutput {
    pub agents: Vec<FilterAgent>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum AgentCommandOutput {
    List(AgentListOutput),
    Show(FilterAgent),
    Spec(TriggerAgentSpec),
}

pub fn run(args: AgentArgs, _global: &super::GlobalArgs) -> CmdResult<AgentCommandOutput> {
    let catalog = Catalog::load()?;

    match args.command {
        AgentCommand::List => Ok((
            AgentCommandOutput::List(AgentListOutput {
                agents: catalog.filter_agents.clone(),
            }),
            0,
        )),
        AgentCommand::Show { id } => {
            let agent = catalog
                .agent(&id)
                .cloned()
                .ok_or_else(|| switchman::Error::agent_not_found(id))?;
            Ok((AgentCommandOutput::Show(agent), 0))
        }
        AgentCommand::Spec => Ok((
            AgentCommandOutput::Spec(catalog.trigger_agent.clone()),
            0,
        )),
    }
}
