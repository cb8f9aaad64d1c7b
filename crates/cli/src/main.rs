//! `switchyard` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`   — start the local dev HTTP harness.
//! - `trigger` — print the sentinel "new run" message for a workflow name.
//! - `validate` — parse a raw invocation-queue message and report whether
//!   it satisfies the context contract.

mod demo;
mod serve;

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "switchyard", about = "Durable, step-based workflow orchestrator", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the local dev HTTP harness.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Print the sentinel "new run" message body for a workflow.
    Trigger,
    /// Validate a raw invocation-queue message against the context contract.
    Validate {
        /// Path to a JSON file containing the message body.
        path: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            info!("starting dev harness on {bind}");
            serve::serve(&bind).await.expect("dev harness exited");
        }
        Command::Trigger => {
            let sentinel = model::Context::new_sentinel(Some(demo::WORKFLOW_NAME.to_string()));
            println!("{}", sentinel.to_wire());
        }
        Command::Validate { path } => {
            let content = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read file {}: {e}", path.display()));

            match model::Context::from_json(&content) {
                Ok(context) => {
                    println!("valid context: run_id={}, step_id={}", context.run_id(), context.step_id());
                }
                Err(e) => {
                    eprintln!("invalid context: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
