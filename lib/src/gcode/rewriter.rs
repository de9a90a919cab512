//! Tool command rewriting.
//!
//! A single forward pass over the lines of a file. At every layer boundary the
//! scheduled tool for that layer is picked up from the tool sequence; every
//! recognized tool command after the first boundary is then rewritten to the
//! scheduled tool.
//!
//! The pass also tracks which tool is believed to be mounted. A park or pickup
//! that would leave the printer where it already is becomes a skip comment, so
//! the changer never unloads the tool it is about to load again.
//!
//! The state is small and `Copy`; [`RewriterState::step`] is a pure function
//! from `(state, line)` to `(state', line')`, which keeps every transition
//! testable without building a whole file.

use std::borrow::Cow;

use log::{debug, warn};

use super::command::{rebuild_preheat, skip_comment, CommandError, CommandKind, ToolCommand};
use crate::tool::Tool;
use crate::{Error, Result};

/// Rewriter state threaded through the pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriterState {
    /// Index of the layer being walked, `None` before the first boundary.
    current_layer: Option<usize>,
    /// Tool the schedule wants for the current layer.
    scheduled_tool: Option<Tool>,
    /// Tool believed to be mounted on the printer.
    active_tool: Option<Tool>,
}

/// What a step did to its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Unchanged,
    /// At least one tool number or parameter was rewritten.
    Rewritten,
    /// The line was turned into a skip comment by this dialect.
    Skipped(CommandKind),
}

/// Result of one [`RewriterState::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    pub state: RewriterState,
    pub line: Cow<'a, str>,
    pub outcome: LineOutcome,
}

impl RewriterState {
    /// State at the start of a file.
    pub fn new() -> Self {
        Self::default()
    }

    /// State with explicit tools, for driving single transitions.
    pub fn with_tools(scheduled_tool: Option<Tool>, active_tool: Option<Tool>) -> Self {
        Self {
            current_layer: scheduled_tool.map(|_| 0),
            scheduled_tool,
            active_tool,
        }
    }

    pub fn current_layer(&self) -> Option<usize> {
        self.current_layer
    }

    pub fn scheduled_tool(&self) -> Option<Tool> {
        self.scheduled_tool
    }

    pub fn active_tool(&self) -> Option<Tool> {
        self.active_tool
    }

    /// Cross a layer boundary.
    ///
    /// If the new layer is beyond the end of `sequence`, the previous
    /// scheduled tool stays in effect.
    pub fn enter_layer(self, sequence: &[Tool]) -> Self {
        let layer = self.current_layer.map_or(0, |l| l + 1);
        let scheduled_tool = sequence.get(layer).copied().or(self.scheduled_tool);
        Self {
            current_layer: Some(layer),
            scheduled_tool,
            ..self
        }
    }

    /// Process one line.
    ///
    /// Lines before the first boundary, and lines without tool commands, pass
    /// through untouched. Dialects are tried in [`CommandKind::ORDER`]; each
    /// sees the line as left by the previous one, and a skip ends the line.
    pub fn step(self, line: &str) -> std::result::Result<Step<'_>, CommandError> {
        let Some(scheduled) = self.scheduled_tool else {
            return Ok(Step {
                state: self,
                line: Cow::Borrowed(line),
                outcome: LineOutcome::Unchanged,
            });
        };

        let mut state = self;
        let mut current: Cow<'_, str> = Cow::Borrowed(line);

        for kind in CommandKind::ORDER {
            let Some(command) = kind.recognize(&current)? else {
                continue;
            };

            match &command {
                ToolCommand::Park => {
                    if state.active_tool == Some(scheduled) {
                        return Ok(state.skip(&current, kind, scheduled));
                    }
                }
                ToolCommand::Pickup { tool, .. } => {
                    if *tool != scheduled.index() {
                        current = Cow::Owned(command.retarget(&current, scheduled));
                        state.active_tool = Some(scheduled);
                    } else if state.active_tool == Some(scheduled) {
                        return Ok(state.skip(&current, kind, scheduled));
                    } else {
                        state.active_tool = Some(scheduled);
                    }
                }
                ToolCommand::TemperatureSwitch { tool, .. } => {
                    if *tool != scheduled.index() {
                        if state.active_tool != Some(scheduled) {
                            current = Cow::Owned(rebuild_preheat(&current, *tool, scheduled)?);
                            state.active_tool = Some(scheduled);
                        } else {
                            return Ok(state.skip(&current, kind, scheduled));
                        }
                    }
                }
                ToolCommand::ParametrizedSelect { tool, .. } | ToolCommand::BareSelect { tool, .. } => {
                    if *tool != scheduled.index() {
                        current = Cow::Owned(command.retarget(&current, scheduled));
                        state.active_tool = Some(scheduled);
                    }
                }
            }
        }

        let outcome = match current {
            Cow::Owned(_) => LineOutcome::Rewritten,
            Cow::Borrowed(_) => LineOutcome::Unchanged,
        };
        Ok(Step {
            state,
            line: current,
            outcome,
        })
    }

    fn skip<'a>(self, line: &str, kind: CommandKind, active: Tool) -> Step<'a> {
        Step {
            state: self,
            line: Cow::Owned(skip_comment(line, kind, active)),
            outcome: LineOutcome::Skipped(kind),
        }
    }
}

/// Counters collected during a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Layer boundaries crossed.
    pub layers: usize,
    /// Lines whose tool command was rewritten.
    pub lines_rewritten: usize,
    /// Redundant parks turned into comments.
    pub parks_skipped: usize,
    /// Redundant pickups turned into comments.
    pub pickups_skipped: usize,
    /// Redundant pre-heat switches turned into comments.
    pub preheats_skipped: usize,
}

impl RewriteStats {
    /// Total lines turned into skip comments.
    pub fn skipped(&self) -> usize {
        self.parks_skipped + self.pickups_skipped + self.preheats_skipped
    }

    fn record(&mut self, outcome: LineOutcome) {
        match outcome {
            LineOutcome::Unchanged => {}
            LineOutcome::Rewritten => self.lines_rewritten += 1,
            LineOutcome::Skipped(CommandKind::Park) => self.parks_skipped += 1,
            LineOutcome::Skipped(CommandKind::Pickup) => self.pickups_skipped += 1,
            LineOutcome::Skipped(_) => self.preheats_skipped += 1,
        }
    }
}

/// Rewritten lines plus counters.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub lines: Vec<String>,
    pub stats: RewriteStats,
}

/// Rewrite every tool command in `lines` to follow `sequence`.
///
/// `positions` are the layer boundary line indices, `sequence` the tool per
/// layer. Lines are rewritten in place; the line count never changes.
pub fn rewrite(mut lines: Vec<String>, positions: &[usize], sequence: &[Tool]) -> Result<Rewrite> {
    if positions.len() > sequence.len() {
        warn!(
            "{} layer boundaries but only {} scheduled tools; the last tool carries over",
            positions.len(),
            sequence.len()
        );
    }

    let mut state = RewriterState::new();
    let mut stats = RewriteStats::default();

    for (idx, line) in lines.iter_mut().enumerate() {
        if positions.binary_search(&idx).is_ok() {
            state = state.enter_layer(sequence);
            stats.layers += 1;
            debug!(
                "Layer {} at line {}: scheduled {:?}, active {:?}",
                state.current_layer.unwrap_or_default(),
                idx + 1,
                state.scheduled_tool,
                state.active_tool
            );
        }

        let Step {
            state: next,
            line: new_line,
            outcome,
        } = state
            .step(line.as_str())
            .map_err(|source| Error::MalformedCommand {
                line: idx + 1,
                source,
            })?;

        stats.record(outcome);
        if let Cow::Owned(rewritten) = new_line {
            debug!("Line {}: '{}' -> '{}'", idx + 1, line, rewritten);
            *line = rewritten;
        }
        state = next;
    }

    Ok(Rewrite { lines, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(state: RewriterState, line: &str) -> (RewriterState, String, LineOutcome) {
        let step = state.step(line).unwrap();
        (step.state, step.line.into_owned(), step.outcome)
    }

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_owned).collect()
    }

    #[test]
    fn test_enter_layer() {
        let seq = [Tool::Cyan, Tool::Black];
        let state = RewriterState::new().enter_layer(&seq);
        assert_eq!(state.current_layer(), Some(0));
        assert_eq!(state.scheduled_tool(), Some(Tool::Cyan));

        let state = state.enter_layer(&seq);
        assert_eq!(state.scheduled_tool(), Some(Tool::Black));

        // Past the end, the last scheduled tool persists.
        let state = state.enter_layer(&seq);
        assert_eq!(state.current_layer(), Some(2));
        assert_eq!(state.scheduled_tool(), Some(Tool::Black));
    }

    #[test]
    fn test_lines_before_first_layer_untouched() {
        let state = RewriterState::new();
        let (next, line, outcome) = step(state, "T3 S1 L0 D0");
        assert_eq!(next, state);
        assert_eq!(line, "T3 S1 L0 D0");
        assert_eq!(outcome, LineOutcome::Unchanged);
    }

    #[test]
    fn test_park_skipped_when_scheduled_tool_active() {
        let state = RewriterState::with_tools(Some(Tool::Yellow), Some(Tool::Yellow));
        let (next, line, outcome) = step(state, "P0 S1 L2 D0");
        assert_eq!(next.active_tool(), Some(Tool::Yellow));
        assert!(line.contains("P0 S1 L2 D0"));
        assert!(line.contains("skipped"));
        assert!(line.starts_with(';'));
        assert_eq!(outcome, LineOutcome::Skipped(CommandKind::Park));
    }

    #[test]
    fn test_park_kept_when_other_tool_active() {
        let state = RewriterState::with_tools(Some(Tool::Yellow), Some(Tool::Cyan));
        let (next, line, outcome) = step(state, "P0 S1 L2 D0");
        assert_eq!(next, state);
        assert_eq!(line, "P0 S1 L2 D0");
        assert_eq!(outcome, LineOutcome::Unchanged);
    }

    #[test]
    fn test_pickup_retargeted() {
        let state = RewriterState::with_tools(Some(Tool::Black), Some(Tool::Cyan));
        let (next, line, outcome) = step(state, "T1 S1 L0 D0");
        assert_eq!(line, "T4 S1 L0 D0");
        assert_eq!(next.active_tool(), Some(Tool::Black));
        assert_eq!(outcome, LineOutcome::Rewritten);
    }

    #[test]
    fn test_pickup_skipped_when_already_active() {
        let state = RewriterState::with_tools(Some(Tool::Magenta), Some(Tool::Magenta));
        let (_, line, outcome) = step(state, "T1 S1 L0 D0");
        assert!(line.starts_with("; T1 S1 L0 D0 - skipped pickup"));
        assert_eq!(outcome, LineOutcome::Skipped(CommandKind::Pickup));
    }

    #[test]
    fn test_pickup_of_scheduled_tool_marks_active() {
        let state = RewriterState::with_tools(Some(Tool::Magenta), None);
        let (next, line, outcome) = step(state, "T1 S1 L0 D0");
        assert_eq!(line, "T1 S1 L0 D0");
        assert_eq!(next.active_tool(), Some(Tool::Magenta));
        assert_eq!(outcome, LineOutcome::Unchanged);
    }

    #[test]
    fn test_preheat_rebuilt_with_stale_comment() {
        let state = RewriterState::with_tools(Some(Tool::Black), Some(Tool::Yellow));
        let (next, line, outcome) = step(state, "M104.1 T2 P120 Q123 S210 ; switch to tool 2");
        // The source comment still names tool 2 after the rewrite.
        assert_eq!(line, "M104.1 T4 P120 Q125 S210 ; switch to tool 2");
        assert_eq!(next.active_tool(), Some(Tool::Black));
        assert_eq!(outcome, LineOutcome::Rewritten);
    }

    #[test]
    fn test_preheat_skipped_when_scheduled_tool_active() {
        let state = RewriterState::with_tools(Some(Tool::Black), Some(Tool::Black));
        let (next, line, outcome) = step(state, "M104.1 T2 P120 Q123 S210");
        assert!(line.starts_with("; M104.1 T2 P120 Q123 S210 - skipped"));
        assert_eq!(next, state);
        assert_eq!(outcome, LineOutcome::Skipped(CommandKind::TemperatureSwitch));
    }

    #[test]
    fn test_preheat_for_scheduled_tool_untouched() {
        let state = RewriterState::with_tools(Some(Tool::Black), None);
        let (next, line, _) = step(state, "M104.1 T4 P120 Q125 S210");
        assert_eq!(line, "M104.1 T4 P120 Q125 S210");
        assert_eq!(next.active_tool(), None);
    }

    #[test]
    fn test_parametrized_select_retargeted() {
        let state = RewriterState::with_tools(Some(Tool::White), None);
        let (next, line, _) = step(state, "T0 S2 L1 D5 ; select");
        assert_eq!(line, "T3 S2 L1 D5 ; select");
        assert_eq!(next.active_tool(), Some(Tool::White));
    }

    #[test]
    fn test_bare_select_retargeted() {
        let state = RewriterState::with_tools(Some(Tool::Yellow), None);
        let (next, line, _) = step(state, "T0 ; tool 0");
        assert_eq!(line, "T2 ; tool 0");
        assert_eq!(next.active_tool(), Some(Tool::Yellow));
    }

    #[test]
    fn test_malformed_tool_number() {
        let state = RewriterState::with_tools(Some(Tool::Yellow), None);
        assert!(state.step("T123456789012345678901234567890 ;").is_err());
    }

    #[test]
    fn test_rewrite_full_pass() {
        let input = lines(
            "T0 S1 L0 D0\n\
             ;LAYER_CHANGE\n\
             M104.1 T0 P120 Q122 S210\n\
             P0 S1 L2 D0\n\
             T0 S1 L0 D0\n\
             G1 X10 E1\n\
             ;LAYER_CHANGE\n\
             P0 S1 L2 D0\n\
             T4 S1 L0 D0\n\
             G1 X20 E1",
        );
        let positions = vec![1, 6];
        let sequence = vec![Tool::Black, Tool::Black];

        let result = rewrite(input.clone(), &positions, &sequence).unwrap();
        let out = &result.lines;

        assert_eq!(out.len(), input.len());
        assert_eq!(out[0], "T0 S1 L0 D0");
        assert_eq!(
            out[2],
            "M104.1 T4 P120 Q126 S210 ; switched from T0 to T4 (Cyan -> Black)"
        );
        assert_eq!(
            out[3],
            "; P0 S1 L2 D0 - skipped parking as T4 (Black) is already active"
        );
        // A pickup naming another tool is retargeted, never skipped.
        assert_eq!(out[4], "T4 S1 L0 D0");
        assert_eq!(out[5], "G1 X10 E1");
        assert!(out[7].contains("skipped parking"));
        assert_eq!(
            out[8],
            "; T4 S1 L0 D0 - skipped pickup as T4 (Black) is already active"
        );

        assert_eq!(result.stats.layers, 2);
        assert_eq!(result.stats.lines_rewritten, 2);
        assert_eq!(result.stats.parks_skipped, 2);
        assert_eq!(result.stats.pickups_skipped, 1);
        assert_eq!(result.stats.skipped(), 3);
    }

    #[test]
    fn test_rewrite_reports_line_of_malformed_command() {
        let input = lines(";LAYER_CHANGE\nG1 X0\nT99999999999999999999999 ;");
        let err = rewrite(input, &[0], &[Tool::Cyan]).unwrap_err();
        assert!(matches!(err, Error::MalformedCommand { line: 3, .. }));
    }
}
