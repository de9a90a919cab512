//! Tool scheduling.
//!
//! Assigns one [`Tool`] to every layer of a print from an ordered list of
//! [`RatioSection`]s.
//!
//! ## Gradient distribution
//!
//! The layers are split into `ceil(total / sections)` sized contiguous blocks,
//! one per section, in order. Inside a block the layer's relative position
//! `p / block_size` is compared against the cumulative, normalised weights of
//! the section:
//!
//! ```text
//! t0 = c/Σ   t1 = (c+m)/Σ   t2 = (c+m+y)/Σ   t3 = (c+m+y+w)/Σ
//! ```
//!
//! The first tool whose threshold exceeds the relative position wins, Black
//! otherwise. A block therefore sweeps from its lowest weighted tool to its
//! highest, and neighbouring sections with overlapping weights blend into each
//! other across the print height. A final block shorter than `block_size`
//! is still measured against `block_size`, so it stops part way through its
//! sweep.
//!
//! ## Pattern distribution
//!
//! [`pattern_sequence`] repeats a fixed per-tool layer count (`2:1` prints two
//! layers of the first tool, then one of the second, and so on) until every
//! layer is assigned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tool::{Tool, TOOL_COUNT};

/// One tool per layer, aligned index-for-index with the layer positions.
pub type ToolSequence = Vec<Tool>;

/// Scheduling errors.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    /// A gradient schedule needs at least one section.
    #[error("at least one ratio section is required")]
    NoSections,

    #[error("section {section} has a negative weight for tool {tool}")]
    NegativeWeight { section: usize, tool: usize },

    #[error("section {section} has a non-finite weight for tool {tool}")]
    NonFiniteWeight { section: usize, tool: usize },

    /// Every layer count of a repeating pattern is zero.
    #[error("at least one tool must have a layer count greater than zero")]
    EmptyPattern,
}

/// Relative weights of the five tools over one block of layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioSection {
    weights: [f64; TOOL_COUNT],
}

impl RatioSection {
    /// Create a section from `(c, m, y, w, k)` weights.
    pub fn new(weights: [f64; TOOL_COUNT]) -> Self {
        Self { weights }
    }

    /// A section that uses only `tool`.
    pub fn solid(tool: Tool) -> Self {
        let mut weights = [0.0; TOOL_COUNT];
        weights[tool.index()] = 1.0;
        Self { weights }
    }

    pub fn weights(&self) -> &[f64; TOOL_COUNT] {
        &self.weights
    }

    pub fn weight(&self, tool: Tool) -> f64 {
        self.weights[tool.index()]
    }

    /// Sum of all five weights.
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Check every weight is finite and non-negative.
    ///
    /// `section` is only used to label the error.
    pub fn validate(&self, section: usize) -> Result<(), ScheduleError> {
        for (tool, &w) in self.weights.iter().enumerate() {
            if !w.is_finite() {
                return Err(ScheduleError::NonFiniteWeight { section, tool });
            }
            if w < 0.0 {
                return Err(ScheduleError::NegativeWeight { section, tool });
            }
        }
        Ok(())
    }

    /// The four cumulative thresholds `t0..t3`, or `None` when all weights are zero.
    pub fn thresholds(&self) -> Option<[f64; TOOL_COUNT - 1]> {
        let total = self.total();
        if total == 0.0 {
            return None;
        }

        let mut thresholds = [0.0; TOOL_COUNT - 1];
        let mut cumulative = 0.0;
        for (i, threshold) in thresholds.iter_mut().enumerate() {
            cumulative += self.weights[i];
            *threshold = cumulative / total;
        }
        Some(thresholds)
    }

    /// Tool for a layer at `relative` position (0 ≤ relative < 1) inside this section's block.
    pub fn select(&self, relative: f64) -> Tool {
        let Some(thresholds) = self.thresholds() else {
            return Tool::Black;
        };

        thresholds
            .iter()
            .position(|&t| relative < t)
            .and_then(Tool::from_index)
            .unwrap_or(Tool::Black)
    }
}

impl From<[f64; TOOL_COUNT]> for RatioSection {
    fn from(weights: [f64; TOOL_COUNT]) -> Self {
        Self::new(weights)
    }
}

/// Check a gradient schedule before use.
pub fn validate_sections(sections: &[RatioSection]) -> Result<(), ScheduleError> {
    if sections.is_empty() {
        return Err(ScheduleError::NoSections);
    }
    for (i, section) in sections.iter().enumerate() {
        section.validate(i)?;
    }
    Ok(())
}

/// Assign a tool to each of `total_layers` layers from gradient sections.
///
/// Returns exactly `total_layers` entries. An empty section list is an error
/// even when there are no layers.
pub fn schedule_tools(
    total_layers: usize,
    sections: &[RatioSection],
) -> Result<ToolSequence, ScheduleError> {
    validate_sections(sections)?;

    if total_layers == 0 {
        return Ok(Vec::new());
    }

    let num_sections = sections.len();
    let block_size = total_layers.div_ceil(num_sections);

    let sequence = (0..total_layers)
        .map(|layer| {
            let section_idx = (layer / block_size).min(num_sections - 1);
            let position = layer - section_idx * block_size;
            let relative = position as f64 / block_size as f64;
            sections[section_idx].select(relative)
        })
        .collect();

    Ok(sequence)
}

/// Assign tools by repeating per-tool layer counts.
///
/// Each pass over the tools emits `floor(count)` layers of that tool, plus one
/// more if the count has a fractional part, until `total_layers` is reached.
pub fn pattern_sequence(
    total_layers: usize,
    counts: &RatioSection,
) -> Result<ToolSequence, ScheduleError> {
    counts.validate(0)?;
    if counts.total() <= 0.0 {
        return Err(ScheduleError::EmptyPattern);
    }

    let mut sequence = Vec::with_capacity(total_layers);
    while sequence.len() < total_layers {
        for tool in Tool::ALL {
            let count = counts.weight(tool);
            let whole = count.trunc() as usize;
            let extra = usize::from(count.fract() > 0.0);
            let remaining = total_layers - sequence.len();
            let take = (whole + extra).min(remaining);
            sequence.extend(std::iter::repeat(tool).take(take));
            if sequence.len() >= total_layers {
                break;
            }
        }
    }

    Ok(sequence)
}

/// How layers are distributed across tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Schedule {
    /// Interpolate within consecutive sections.
    Gradient { sections: Vec<RatioSection> },
    /// Repeat per-tool layer counts.
    Pattern { counts: RatioSection },
}

impl Schedule {
    pub fn gradient(sections: Vec<RatioSection>) -> Self {
        Schedule::Gradient { sections }
    }

    pub fn pattern(counts: RatioSection) -> Self {
        Schedule::Pattern { counts }
    }

    /// Validate without producing a sequence.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        match self {
            Schedule::Gradient { sections } => validate_sections(sections),
            Schedule::Pattern { counts } => {
                counts.validate(0)?;
                if counts.total() <= 0.0 {
                    return Err(ScheduleError::EmptyPattern);
                }
                Ok(())
            }
        }
    }

    /// Tool sequence for `total_layers` layers.
    pub fn tool_sequence(&self, total_layers: usize) -> Result<ToolSequence, ScheduleError> {
        match self {
            Schedule::Gradient { sections } => schedule_tools(total_layers, sections),
            Schedule::Pattern { counts } => pattern_sequence(total_layers, counts),
        }
    }
}
