//! # toolmix
//!
//! Rewrites G-code produced for a single-nozzle, five-tool changer so that the
//! physical tool changes follow a layer-indexed colour ratio schedule instead
//! of the slicer's own tool assignment.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. [`gcode::locate_layers`] - find the `;LAYER_CHANGE` boundaries
//! 2. [`schedule::schedule_tools`] - assign one [`Tool`] per layer from ratio sections
//! 3. [`gcode::rewrite`] - rewrite every tool command to the scheduled tool,
//!    turning redundant park/pickup operations into comments
//!
//! [`process::ToolSwitcher`] composes them over files.
//!
//! ## Example
//!
//! ```rust,ignore
//! use toolmix::process::ToolSwitcher;
//! use toolmix::schedule::RatioSection;
//!
//! let sections = vec![
//!     RatioSection::new([1.0, 0.0, 0.0, 0.0, 0.0]),
//!     RatioSection::new([0.0, 0.0, 0.0, 0.0, 1.0]),
//! ];
//! let summary = ToolSwitcher::new().process_file("in.gcode", "out.gcode", &sections)?;
//! println!("{}", summary.report());
//! ```

pub mod cli;
pub mod color;
pub mod config;
pub mod gcode;
pub mod process;
pub mod report;
pub mod schedule;
pub mod tool;

use std::path::PathBuf;

pub use gcode::{GCode, LayerPositions, RewriteStats, RewriterState};
pub use process::{RunSummary, ToolSwitcher};
pub use report::UsageReport;
pub use schedule::{RatioSection, Schedule, ToolSequence};
pub use tool::Tool;

/// Error type for toolmix operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Output location is not writable: {0}")]
    OutputNotWritable(PathBuf),

    #[error("Invalid schedule: {0}")]
    Schedule(#[from] schedule::ScheduleError),

    #[error("Malformed tool command on line {line}: {source}")]
    MalformedCommand {
        /// 1-based line number in the input file.
        line: usize,
        #[source]
        source: gcode::CommandError,
    },

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Color error: {0}")]
    Color(#[from] color::ColorError),
}

/// Result type for toolmix operations.
pub type Result<T> = std::result::Result<T, Error>;
