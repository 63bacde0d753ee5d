use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ladder_ir::ast::Program;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "ladder-ir")]
#[command(about = "Lowers a ladder-logic program to its abstract machine instruction listing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Lower {
        #[arg(help = "Input program, as JSON (see ladder_ir::ast::Program)")]
        input: PathBuf,

        #[arg(short, long, help = "Write the listing here instead of stdout")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lower { input, output } => {
            let program = read_program(&input)?;
            tracing::debug!(rungs = program.rungs.len(), "loaded program");

            let instructions = ladder_ir::lower(&program)
                .with_context(|| format!("lowering {} (ladder-ir {VERSION})", input.display()))?;
            let listing = ladder_ir::ir::render_listing(&instructions);

            match output {
                Some(path) => {
                    fs::write(&path, listing)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!(
                        "Lowered {} -> {} ({} instructions)",
                        input.display(),
                        path.display(),
                        instructions.len()
                    );
                }
                None => print!("{listing}"),
            }
        }
    }

    Ok(())
}

fn read_program(path: &PathBuf) -> Result<Program> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid ladder-ir program", path.display()))
}
