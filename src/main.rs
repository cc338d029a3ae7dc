use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dbsketch::config::EditorConfig;
use dbsketch::model::DiagramModel;
use dbsketch::positions::PositionStore;
use dbsketch::serializer;
use tracing::info;

/// dbsketch - parse, validate and lay out table schema diagrams.
#[derive(Debug, Parser)]
#[command(name = "dbsketch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML file overriding editor defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the validated model as JSON.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Report field errors. Exits non-zero when any field is in error.
    Check {
        #[arg(default_value = "-")]
        input: String,
    },

    /// Export the schema as SQL DDL.
    Sql {
        #[arg(default_value = "-")]
        input: String,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print default table positions as JSON.
    Layout {
        #[arg(default_value = "-")]
        input: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Parse { input, pretty } => {
            let model = DiagramModel::from_source(&load_input(&input)?);
            let json = if pretty {
                serde_json::to_string_pretty(&model)?
            } else {
                serde_json::to_string(&model)?
            };
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { input } => cmd_check(&input),
        Command::Sql { input, output } => {
            let model = DiagramModel::from_source(&load_input(&input)?);
            let sql = serializer::to_sql(&model);
            match output {
                Some(path) => {
                    fs::write(&path, &sql)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote output to: {}", path.display());
                }
                None => print!("{sql}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Layout { input } => {
            let model = DiagramModel::from_source(&load_input(&input)?);
            let mut positions = PositionStore::new();
            positions.place_new_tables(&model, &config.grid);
            println!("{}", serde_json::to_string_pretty(&positions)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_check(input: &str) -> Result<ExitCode> {
    let model = DiagramModel::from_source(&load_input(input)?);
    let mut failed = false;
    for (table, field) in model.errors() {
        failed = true;
        println!("{}.{}: {}", table.name, field.name, field.error_message);
    }
    info!(
        tables = model.tables.len(),
        relationships = model.relationships.len(),
        "checked schema"
    );
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}
