//! Tool command dialects.
//!
//! Five command shapes carry tool numbers in the G-code this crate rewrites:
//!
//! | Kind | Shape | Meaning |
//! |---|---|---|
//! | [`CommandKind::Park`] | `P0 S1 L2 D0` | park (unload) the mounted tool |
//! | [`CommandKind::Pickup`] | `T<n> S1 L0 D0` | mount tool `n` |
//! | [`CommandKind::TemperatureSwitch`] | `M104.1 T<n> P.. Q.. S..` | pre-heat tool `n` |
//! | [`CommandKind::ParametrizedSelect`] | `T<n> S<x> L<y> D<z>` | select tool `n` with parameters |
//! | [`CommandKind::BareSelect`] | `T<n> ;...` at line start | plain tool select |
//!
//! The shapes are not mutually exclusive (a pickup is also a parametrized
//! select), so recognition always runs in [`CommandKind::ORDER`].

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::tool::{tool_name, Tool, DEFAULT_PREHEAT_P, DEFAULT_PREHEAT_S};

static PARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"P0\s+S1\s+L2\s+D0").unwrap());
static PICKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"T(\d+)\s+S1\s+L0\s+D0").unwrap());
static TEMPERATURE_SWITCH: Lazy<Regex> = Lazy::new(|| Regex::new(r"M104\.1\s+T(\d+)").unwrap());
static PARAMETRIZED_SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bT(\d+)\s+S\d+\s+L\d+\s+D\d+").unwrap());
static BARE_SELECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^T(\d+)\s*;").unwrap());

static PARAM_P: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bP(\d+)").unwrap());
static PARAM_Q: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bQ(\d+)").unwrap());
static PARAM_S: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bS(\d+)").unwrap());

/// A recognized command whose numeric field cannot be used.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("{field} value '{value}' is not a valid number")]
    InvalidNumber { field: &'static str, value: String },
}

/// The closed set of tool command dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Park,
    Pickup,
    TemperatureSwitch,
    ParametrizedSelect,
    BareSelect,
}

impl CommandKind {
    /// Recognition order. Later kinds see the line as rewritten by earlier ones.
    pub const ORDER: [CommandKind; 5] = [
        CommandKind::Park,
        CommandKind::Pickup,
        CommandKind::TemperatureSwitch,
        CommandKind::ParametrizedSelect,
        CommandKind::BareSelect,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            CommandKind::Park => &*PARK,
            CommandKind::Pickup => &*PICKUP,
            CommandKind::TemperatureSwitch => &*TEMPERATURE_SWITCH,
            CommandKind::ParametrizedSelect => &*PARAMETRIZED_SELECT,
            CommandKind::BareSelect => &*BARE_SELECT,
        }
    }

    /// Match this dialect against `line`.
    pub fn recognize(self, line: &str) -> Result<Option<ToolCommand>, CommandError> {
        let Some(caps) = self.pattern().captures(line) else {
            return Ok(None);
        };

        if self == CommandKind::Park {
            return Ok(Some(ToolCommand::Park));
        }

        // Every other dialect captures the tool number as group 1.
        let Some(group) = caps.get(1) else {
            return Ok(None);
        };
        let tool = parse_number::<usize>("tool", group.as_str())?;
        let tool_span = group.range();

        let command = match self {
            CommandKind::Park => ToolCommand::Park,
            CommandKind::Pickup => ToolCommand::Pickup { tool, tool_span },
            CommandKind::TemperatureSwitch => ToolCommand::TemperatureSwitch { tool, tool_span },
            CommandKind::ParametrizedSelect => ToolCommand::ParametrizedSelect { tool, tool_span },
            CommandKind::BareSelect => ToolCommand::BareSelect { tool, tool_span },
        };
        Ok(Some(command))
    }

    /// Verb used in skip comments.
    pub fn operation(self) -> &'static str {
        match self {
            CommandKind::Park => "parking",
            CommandKind::Pickup => "pickup",
            CommandKind::TemperatureSwitch => "pre-heat",
            CommandKind::ParametrizedSelect | CommandKind::BareSelect => "select",
        }
    }
}

/// A recognized tool command.
///
/// `tool_span` is the byte range of the tool number digits inside the line it
/// was recognized in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCommand {
    Park,
    Pickup { tool: usize, tool_span: Range<usize> },
    TemperatureSwitch { tool: usize, tool_span: Range<usize> },
    ParametrizedSelect { tool: usize, tool_span: Range<usize> },
    BareSelect { tool: usize, tool_span: Range<usize> },
}

impl ToolCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            ToolCommand::Park => CommandKind::Park,
            ToolCommand::Pickup { .. } => CommandKind::Pickup,
            ToolCommand::TemperatureSwitch { .. } => CommandKind::TemperatureSwitch,
            ToolCommand::ParametrizedSelect { .. } => CommandKind::ParametrizedSelect,
            ToolCommand::BareSelect { .. } => CommandKind::BareSelect,
        }
    }

    /// Tool number requested by the command, `None` for a park.
    pub fn tool(&self) -> Option<usize> {
        match self {
            ToolCommand::Park => None,
            ToolCommand::Pickup { tool, .. }
            | ToolCommand::TemperatureSwitch { tool, .. }
            | ToolCommand::ParametrizedSelect { tool, .. }
            | ToolCommand::BareSelect { tool, .. } => Some(*tool),
        }
    }

    fn tool_span(&self) -> Option<Range<usize>> {
        match self {
            ToolCommand::Park => None,
            ToolCommand::Pickup { tool_span, .. }
            | ToolCommand::TemperatureSwitch { tool_span, .. }
            | ToolCommand::ParametrizedSelect { tool_span, .. }
            | ToolCommand::BareSelect { tool_span, .. } => Some(tool_span.clone()),
        }
    }

    /// Replace the tool number of this command in `line`, leaving everything else intact.
    pub fn retarget(&self, line: &str, tool: Tool) -> String {
        match self.tool_span() {
            Some(span) => {
                let mut out = String::with_capacity(line.len() + 1);
                out.push_str(&line[..span.start]);
                out.push_str(&tool.index().to_string());
                out.push_str(&line[span.end..]);
                out
            }
            None => line.to_string(),
        }
    }
}

/// Parameters of an `M104.1` pre-heat command, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreheatParams {
    pub p: Option<String>,
    pub q: Option<String>,
    pub s: Option<String>,
    /// Everything from the first `;` to the end of the line.
    pub comment: Option<String>,
}

impl PreheatParams {
    /// Extract parameters from the code part of `line`; the comment is kept verbatim.
    pub fn parse(line: &str) -> Self {
        let (code, comment) = match line.find(';') {
            Some(idx) => (&line[..idx], Some(line[idx..].to_string())),
            None => (line, None),
        };
        let capture = |re: &Regex| re.captures(code).map(|c| c[1].to_string());

        Self {
            p: capture(&*PARAM_P),
            q: capture(&*PARAM_Q),
            s: capture(&*PARAM_S),
            comment,
        }
    }
}

/// Rebuild an `M104.1` line so it pre-heats `to` instead of tool number `from`.
///
/// `P` and `S` are kept (defaulting to 120 and 210). A source `Q` is shifted
/// by the tool delta so it keeps pairing with the right heater slot; a missing
/// `Q` becomes `P+1` for tool 0 and `P+2` otherwise. The source comment is
/// kept verbatim even though it may still name the old tool.
pub fn rebuild_preheat(line: &str, from: usize, to: Tool) -> Result<String, CommandError> {
    let params = PreheatParams::parse(line);

    let p = match &params.p {
        Some(p) => p.clone(),
        None => DEFAULT_PREHEAT_P.to_string(),
    };
    let s = match &params.s {
        Some(s) => s.clone(),
        None => DEFAULT_PREHEAT_S.to_string(),
    };
    let q = match &params.q {
        Some(q) => {
            let q = parse_number::<i64>("Q", q)?;
            (q + to.index() as i64 - from as i64).max(0)
        }
        None => {
            let p = parse_number::<i64>("P", &p)?;
            if to == Tool::Cyan {
                p + 1
            } else {
                p + 2
            }
        }
    };

    let mut rebuilt = format!("M104.1 T{} P{} Q{} S{}", to.index(), p, q, s);
    match params.comment {
        Some(comment) => {
            rebuilt.push(' ');
            rebuilt.push_str(&comment);
        }
        None => {
            rebuilt.push_str(&format!(
                " ; switched from T{} to T{} ({} -> {})",
                from,
                to.index(),
                tool_name(from),
                to.name()
            ));
        }
    }
    Ok(rebuilt)
}

/// Turn a redundant command into a comment that keeps the original text.
pub fn skip_comment(line: &str, kind: CommandKind, active: Tool) -> String {
    format!(
        "; {} - skipped {} as {} is already active",
        line,
        kind.operation(),
        active
    )
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
