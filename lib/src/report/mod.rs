//! Tool usage statistics for a finished run.

use std::fmt;

use crate::color::{mix_hex, ColorError, Rgb};
use crate::tool::{Tool, TOOL_COUNT};

/// Number of layers listed in the sequence preview.
pub const PREVIEW_LAYERS: usize = 20;

/// Per-tool layer counts over a tool sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    total_layers: usize,
    counts: [usize; TOOL_COUNT],
    preview: Vec<Tool>,
}

impl UsageReport {
    /// Build a report from a tool sequence.
    pub fn from_sequence(sequence: &[Tool]) -> Self {
        let mut counts = [0; TOOL_COUNT];
        for tool in sequence {
            counts[tool.index()] += 1;
        }
        Self {
            total_layers: sequence.len(),
            counts,
            preview: sequence.iter().take(PREVIEW_LAYERS).copied().collect(),
        }
    }

    pub fn total_layers(&self) -> usize {
        self.total_layers
    }

    /// Layers assigned to `tool`.
    pub fn count(&self, tool: Tool) -> usize {
        self.counts[tool.index()]
    }

    /// Share of layers assigned to `tool`, in percent.
    ///
    /// `None` when there are no layers at all.
    pub fn percentage(&self, tool: Tool) -> Option<f64> {
        if self.total_layers == 0 {
            return None;
        }
        Some(self.count(tool) as f64 / self.total_layers as f64 * 100.0)
    }

    /// Tools that were used at least once, with their counts.
    pub fn used_tools(&self) -> impl Iterator<Item = (Tool, usize)> + '_ {
        Tool::ALL
            .into_iter()
            .map(|tool| (tool, self.count(tool)))
            .filter(|&(_, count)| count > 0)
    }

    /// Colour the print approaches, mixing tool colours by layer count.
    ///
    /// `None` when there are no layers.
    pub fn blended_color(&self) -> Result<Option<Rgb>, ColorError> {
        let weighted: Vec<(&str, f64)> = self
            .used_tools()
            .map(|(tool, count)| (tool.hex(), count as f64))
            .collect();

        match weighted.as_slice() {
            [] => Ok(None),
            [(hex, _)] => Rgb::from_hex(hex).map(Some),
            _ => mix_hex(&weighted).map(Some),
        }
    }

    /// The first [`PREVIEW_LAYERS`] layers of the sequence.
    pub fn preview(&self) -> &[Tool] {
        &self.preview
    }
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total layers: {}", self.total_layers)?;
        if self.total_layers == 0 {
            return Ok(());
        }

        writeln!(f)?;
        for (tool, count) in self.used_tools() {
            let percent = self.percentage(tool).unwrap_or(0.0);
            writeln!(
                f,
                "Tool {} ({}) used for {} layers ({:.1}%)",
                tool.index(),
                tool.name(),
                count,
                percent
            )?;
        }

        writeln!(f)?;
        writeln!(f, "First {} layers tool sequence:", self.preview.len())?;
        for (i, tool) in self.preview.iter().enumerate() {
            writeln!(f, "Layer {}: Tool {} ({})", i + 1, tool.index(), tool.name())?;
        }
        Ok(())
    }
}
