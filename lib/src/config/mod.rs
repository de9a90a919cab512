//! Job configuration.
//!
//! A run can be described by a JSON job file instead of command-line flags:
//!
//! ```json
//! {
//!   "input": "part.gcode",
//!   "output": "part_modified.gcode",
//!   "schedule": { "mode": "gradient", "sections": [[1,0,0,0,0], [0,1,0,0,0]] }
//! }
//! ```
//!
//! `output` may be omitted, in which case it is derived from the input name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Suffix appended to the input file stem when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_modified";

/// Everything needed for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// G-code file to read
    pub input: PathBuf,

    /// Where to write the rewritten G-code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Tool distribution over the layers
    pub schedule: Schedule,
}

impl JobConfig {
    pub fn new(input: impl Into<PathBuf>, schedule: Schedule) -> Self {
        Self {
            input: input.into(),
            output: None,
            schedule,
        }
    }

    /// Load a job from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a job from a JSON string and validate it.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = self.to_json()?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("input path cannot be empty".to_string()));
        }
        if self.output.as_deref() == Some(self.input.as_path()) {
            return Err(ConfigError::Invalid(
                "output path must differ from the input path".to_string(),
            ));
        }
        self.schedule
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The configured output path, or the default derived from the input.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

/// `<dir>/<stem>_modified<.ext>` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, OUTPUT_SUFFIX),
    };
    input.with_file_name(name)
}
