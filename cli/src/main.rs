//! CLI entrypoint for plenum
//!
//! Wires the layers together with dependency injection: memory stores,
//! static directory, JSONL audit, figment configuration.

mod script;

use anyhow::Result;
use clap::{Parser, Subcommand};
use plenum_infrastructure::ConfigLoader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plenum", version, about = "Meeting governance workflow & voting engine")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the merged configuration
    Config,
    /// List the configured stage-sequence presets
    Sequences,
    /// Run a scripted meeting end-to-end
    Run {
        /// TOML meeting script
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?;
    info!("configuration loaded");

    match cli.command {
        Command::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
            if let Some(path) = ConfigLoader::project_config_path() {
                println!("# project config: {}", path.display());
            }
            if let Some(path) = ConfigLoader::global_config_path() {
                println!("# global config: {}", path.display());
            }
        }
        Command::Sequences => {
            for (name, spec) in &config.workflow.presets {
                let marker = if *name == config.workflow.default_sequence {
                    " (default)"
                } else {
                    ""
                };
                println!("{name}{marker}");
                println!("  stages: {}", spec.stages.join(" -> "));
                println!("  voting: {}", spec.voting_stages.join(", "));
                if let Some(gate) = &spec.quorum_gate {
                    println!("  quorum gate: {gate}");
                }
            }
        }
        Command::Run { script: path } => {
            let script = script::MeetingScript::from_path(&path)?;
            script::run(script, &config).await?;
        }
    }

    Ok(())
}
