//! CLI command definitions and dispatch.

pub mod check;
pub mod eval;
pub mod fmt;
pub mod resolve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cvu_common::config::CvuConfig;

/// Command-line tooling for CVU view definitions.
#[derive(Parser, Debug)]
#[command(name = cvu_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to a JSON configuration file.
    #[arg(long, global = true, env = "CVU_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate definition files.
    Check(check::CheckArgs),
    /// Rewrite definition files in canonical form.
    Fmt(fmt::FmtArgs),
    /// Evaluate an expression against JSON arguments.
    Eval(eval::EvalArgs),
    /// Resolve the effective view for an item type.
    Resolve(resolve::ResolveArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the command
/// fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Check(args) => check::execute(args),
        Command::Fmt(args) => fmt::execute(args, &config),
        Command::Eval(args) => eval::execute(args),
        Command::Resolve(args) => resolve::execute(args, config),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CvuConfig> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            Ok(CvuConfig::load(path)?)
        }
        None => Ok(CvuConfig::default()),
    }
}

/// Parses a JSON argument given on the command line.
///
/// # Errors
///
/// Returns an error naming `flag` if `text` is not valid JSON.
pub fn parse_json(flag: &str, text: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(text).map_err(|e| anyhow::anyhow!("invalid JSON for {flag}: {e}"))
}
