use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{agent, nodes, route, trigger};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "switchman")]
#[command(version = VERSION)]
#[command(about = "CLI for routing trigger requests to CI, git sync, and batch-job automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a context key and build (or run) its routed trigger command
    Route(route::RouteArgs),
    /// Dispatch an explicit trigger action against a node
    Trigger(trigger::TriggerArgs),
    /// Filter graph nodes by receiver, venue, client, name, or agent
    Nodes(nodes::NodesArgs),
    /// Inspect the filter-agent catalog
    Agent(agent::AgentArgs),
}

fn run_json(command: Commands, global: &GlobalArgs) -> (switchman::Result<serde_json::Value>, i32) {
    match command {
        Commands::Route(args) => output::map_cmd_result_to_json(route::run(args, global)),
        Commands::Trigger(args) => output::map_cmd_result_to_json(trigger::run(args, global)),
        Commands::Nodes(args) => output::map_cmd_result_to_json(nodes::run(args, global)),
        Commands::Agent(args) => output::map_cmd_result_to_json(agent::run(args, global)),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
