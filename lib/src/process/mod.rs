//! Process module - runs a whole file through the pipeline.
//!
//! [`ToolSwitcher`] reads the input, locates layers, schedules tools, rewrites
//! the tool commands and writes the result. Nothing is written unless every
//! earlier step succeeded.

use std::path::Path;

use log::{debug, info};

use crate::config::JobConfig;
use crate::gcode::{check_writable, locate_layers, rewrite, GCode, RewriteStats};
use crate::report::UsageReport;
use crate::schedule::{RatioSection, Schedule, ToolSequence};
use crate::Result;

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of `;LAYER_CHANGE` boundaries found.
    pub total_layers: usize,
    /// Scheduled tool per layer.
    pub tool_sequence: ToolSequence,
    /// Rewrite counters.
    pub stats: RewriteStats,
}

impl RunSummary {
    /// Per-tool usage of this run.
    pub fn report(&self) -> UsageReport {
        UsageReport::from_sequence(&self.tool_sequence)
    }
}

/// Rewritten text plus its summary, for callers that handle storage themselves.
#[derive(Debug, Clone)]
pub struct Processed {
    pub gcode: GCode,
    pub summary: RunSummary,
}

/// Runs the layer locator, scheduler and rewriter over G-code.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolSwitcher;

impl ToolSwitcher {
    pub fn new() -> Self {
        Self
    }

    /// Rewrite G-code text in memory.
    pub fn process_text(&self, text: &str, schedule: &Schedule) -> Result<Processed> {
        schedule.validate()?;

        let (positions, lines) = locate_layers(text);
        let total_layers = positions.len();
        let tool_sequence = schedule.tool_sequence(total_layers)?;
        let rewritten = rewrite(lines, &positions, &tool_sequence)?;

        Ok(Processed {
            gcode: GCode::from_lines(rewritten.lines),
            summary: RunSummary {
                total_layers,
                tool_sequence,
                stats: rewritten.stats,
            },
        })
    }

    /// Rewrite `input` into `output` following gradient `sections`.
    pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        sections: &[RatioSection],
    ) -> Result<RunSummary> {
        self.process_with_schedule(input, output, &Schedule::gradient(sections.to_vec()))
    }

    /// Rewrite `input` into `output` following any schedule.
    pub fn process_with_schedule<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        schedule: &Schedule,
    ) -> Result<RunSummary> {
        let input = input.as_ref();
        let output = output.as_ref();

        schedule.validate()?;
        check_writable(output)?;

        info!("Processing file: {}", input.display());
        let source = GCode::read_from_file(input)?;
        debug!("Read {} lines", source.line_count());
        let processed = self.process_text(&source.content(), schedule)?;

        processed.gcode.write_to_file(output)?;
        info!(
            "Wrote {}: {} layers, {} lines rewritten, {} redundant tool operations skipped",
            output.display(),
            processed.summary.total_layers,
            processed.summary.stats.lines_rewritten,
            processed.summary.stats.skipped()
        );

        Ok(processed.summary)
    }

    /// Run a job description.
    pub fn run_job(&self, job: &JobConfig) -> Result<RunSummary> {
        job.validate()?;
        self.process_with_schedule(&job.input, job.output_path(), &job.schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleError;
    use crate::tool::Tool;
    use crate::Error;

    #[test]
    fn test_process_text_scenario() {
        let text = ";LAYER_CHANGE\nT2 ;\n;LAYER_CHANGE\nT2 ;\n";
        let schedule = Schedule::gradient(vec![
            RatioSection::solid(Tool::Cyan),
            RatioSection::solid(Tool::Black),
        ]);
        let processed = ToolSwitcher::new().process_text(text, &schedule).unwrap();

        assert_eq!(processed.summary.total_layers, 2);
        assert_eq!(processed.summary.tool_sequence, vec![Tool::Cyan, Tool::Black]);
        assert_eq!(
            processed.gcode.content(),
            ";LAYER_CHANGE\nT0 ;\n;LAYER_CHANGE\nT4 ;\n"
        );
    }

    #[test]
    fn test_process_text_without_layers() {
        let text = "G28\nT2 ;\nG1 X10\n";
        let schedule = Schedule::gradient(vec![RatioSection::solid(Tool::Cyan)]);
        let processed = ToolSwitcher::new().process_text(text, &schedule).unwrap();

        assert_eq!(processed.summary.total_layers, 0);
        assert!(processed.summary.tool_sequence.is_empty());
        assert_eq!(processed.gcode.content(), text);
    }

    #[test]
    fn test_empty_schedule_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.gcode");
        let err = ToolSwitcher::new()
            .process_file(dir.path().join("missing.gcode"), &output, &[])
            .unwrap_err();
        assert!(matches!(err, Error::Schedule(ScheduleError::NoSections)));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_job() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("part.gcode");
        std::fs::write(&input, ";LAYER_CHANGE\nT1 ;\n;LAYER_CHANGE\nT1 ;").unwrap();

        let job = JobConfig::new(
            &input,
            Schedule::pattern(RatioSection::new([1.0, 0.0, 0.0, 0.0, 1.0])),
        );
        let summary = ToolSwitcher::new().run_job(&job).unwrap();
        assert_eq!(summary.tool_sequence, vec![Tool::Cyan, Tool::Black]);

        let written = std::fs::read_to_string(dir.path().join("part_modified.gcode")).unwrap();
        assert_eq!(written, ";LAYER_CHANGE\nT0 ;\n;LAYER_CHANGE\nT4 ;");
    }
}
