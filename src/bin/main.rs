//! Planviz CLI - normalize EXPLAIN plans into renderable graphs
//!
//! Usage:
//!   planviz graph <file.json> [--compact]
//!   planviz validate <file.json>
//!
//! Pass `-` as the file to read from stdin.

use clap::{Parser, Subcommand};
use planviz::{analyze, explain};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "planviz")]
#[command(about = "Normalize EXPLAIN FORMAT=JSON plans into renderable graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the normalized graph and print it as JSON
    Graph {
        /// Path to the EXPLAIN JSON file, or `-` for stdin
        file: PathBuf,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Check that the input is a well-formed plan without printing it
    Validate {
        /// Path to the EXPLAIN JSON file, or `-` for stdin
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Graph { file, compact } => {
            let input = match read_input(&file) {
                Ok(input) => input,
                Err(e) => {
                    eprintln!("Error: cannot read {}: {}", file.display(), e);
                    return ExitCode::FAILURE;
                }
            };

            match analyze(&input) {
                Ok(view) => {
                    let json = if compact {
                        serde_json::to_string(&view)
                    } else {
                        serde_json::to_string_pretty(&view)
                    };
                    match json {
                        Ok(json) => {
                            println!("{json}");
                            ExitCode::SUCCESS
                        }
                        Err(e) => {
                            eprintln!("Error: cannot serialize graph: {e}");
                            ExitCode::FAILURE
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Validate { file } => {
            let input = match read_input(&file) {
                Ok(input) => input,
                Err(e) => {
                    eprintln!("Error: cannot read {}: {}", file.display(), e);
                    return ExitCode::FAILURE;
                }
            };

            match explain::parse(&input) {
                Ok(block) => {
                    let graph = planviz::PlanParser::parse(&block);
                    println!("OK: {} nodes, {} edges", graph.node_count(), graph.edge_count());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Invalid: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn read_input(file: &PathBuf) -> std::io::Result<String> {
    if file.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(file)
    }
}
