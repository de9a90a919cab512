//! CLI Module
//!
//! Command-line interface for toolmix.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::schedule::RatioSection;
use crate::tool::TOOL_COUNT;

/// Rewrite five-tool G-code so tool changes follow a colour ratio schedule
#[derive(Parser, Debug)]
#[command(name = "toolmix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where a schedule comes from on the command line.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Gradient section as C,M,Y,W,K weights; repeat for more sections
    #[arg(short, long = "section", value_parser = parse_ratio)]
    pub sections: Vec<RatioSection>,

    /// Repeating per-tool layer counts as C,M,Y,W,K
    #[arg(short, long, value_parser = parse_ratio, conflicts_with = "sections")]
    pub pattern: Option<RatioSection>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite a G-code file
    #[command(name = "process")]
    Process {
        /// Input G-code file
        #[arg(short, long, required_unless_present = "job")]
        input: Option<PathBuf>,

        /// Output file (defaults to <input>_modified.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON job file; flags given alongside override its values
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Save the resolved job to this JSON file before processing
        #[arg(long)]
        save_job: Option<PathBuf>,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Show the tool sequence a schedule produces, without touching files
    #[command(name = "preview")]
    Preview {
        /// Number of layers to schedule
        #[arg(short, long)]
        layers: usize,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Mix hex colours and show the result in CMYK
    #[command(name = "mix")]
    Mix {
        /// Colour as #rrggbb or #rrggbb:weight; repeat for each colour
        #[arg(short, long = "color", required = true)]
        colors: Vec<String>,
    },
}

/// Parse `c,m,y,w,k` (commas or colons) into a ratio section.
pub fn parse_ratio(value: &str) -> Result<RatioSection, String> {
    let weights = value
        .split(&[',', ':'][..])
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let weights: [f64; TOOL_COUNT] = weights
        .try_into()
        .map_err(|w: Vec<f64>| format!("expected {} weights, got {}", TOOL_COUNT, w.len()))?;

    let section = RatioSection::new(weights);
    section.validate(0).map_err(|e| e.to_string())?;
    Ok(section)
}
