//! CLI definition

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// How the final recommendation is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON
    Json,
}

/// table-council: negotiate where to eat, one agent per diner.
#[derive(Debug, Parser)]
#[command(name = "table-council", version, about)]
pub struct Cli {
    /// A diner as "Name: dish, dish, ..." (repeat per participant)
    #[arg(short, long = "diner", value_name = "NAME: DISHES")]
    pub diners: Vec<String>,

    /// Invite code for the session (six digits; generated when omitted)
    #[arg(long)]
    pub code: Option<String>,

    /// Rounds after the opening turn
    #[arg(long)]
    pub rounds: Option<u32>,

    /// City for venue lookup
    #[arg(long)]
    pub city: Option<String>,

    /// Use the offline collaborators (no network, deterministic)
    #[arg(long)]
    pub offline: bool,

    /// Mirror the transcript to a JSONL file
    #[arg(long, value_name = "PATH")]
    pub record: Option<PathBuf>,

    /// Explicit config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip config files and use built-in defaults
    #[arg(long)]
    pub no_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the banner and live feed decoration
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format for the recommendation
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Parse a `--diner` argument of the form "Name: dish, dish, ...".
pub fn parse_diner(raw: &str) -> Result<(String, Vec<String>), String> {
    let (name, dishes) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: dish, ...\", got \"{}\"", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("diner name missing in \"{}\"", raw));
    }

    let dishes: Vec<String> = dishes
        .split(',')
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();
    if dishes.is_empty() {
        return Err(format!("no dishes listed for \"{}\"", name));
    }

    Ok((name.to_string(), dishes))
}
