//! The five-tool table.
//!
//! The printer carries five material feeds, always in the same order:
//! Cyan, Magenta, Yellow, White, Black. Tool indices in G-code (`T0`..`T4`)
//! map onto [`Tool`] variants by position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of tools on the changer.
pub const TOOL_COUNT: usize = 5;

/// Default `P` parameter (pre-heat lead time) for `M104.1`.
pub const DEFAULT_PREHEAT_P: u32 = 120;

/// Default `S` parameter (target temperature) for `M104.1`.
pub const DEFAULT_PREHEAT_S: u32 = 210;

/// A material feed on the tool changer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tool {
    Cyan,
    Magenta,
    Yellow,
    White,
    Black,
}

/// Static per-tool data.
#[derive(Debug, Clone, Copy)]
pub struct ToolProfile {
    /// Full colour name
    pub name: &'static str,
    /// Short label used in compact listings (C, M, Y, W, BL)
    pub label: &'static str,
    /// Display colour as `#rrggbb`
    pub hex: &'static str,
}

const PROFILES: [ToolProfile; TOOL_COUNT] = [
    ToolProfile {
        name: "Cyan",
        label: "C",
        hex: "#00FFFF",
    },
    ToolProfile {
        name: "Magenta",
        label: "M",
        hex: "#FF00FF",
    },
    ToolProfile {
        name: "Yellow",
        label: "Y",
        hex: "#FFFF00",
    },
    ToolProfile {
        name: "White",
        label: "W",
        hex: "#FFFFFF",
    },
    ToolProfile {
        name: "Black",
        label: "BL",
        hex: "#000000",
    },
];

impl Tool {
    /// All tools in index order.
    pub const ALL: [Tool; TOOL_COUNT] = [
        Tool::Cyan,
        Tool::Magenta,
        Tool::Yellow,
        Tool::White,
        Tool::Black,
    ];

    /// Look up a tool by its G-code index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// G-code index of this tool (the `n` in `Tn`).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static table row for this tool.
    pub fn profile(self) -> &'static ToolProfile {
        &PROFILES[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    pub fn label(self) -> &'static str {
        self.profile().label
    }

    /// Display colour as `#rrggbb`.
    pub fn hex(self) -> &'static str {
        self.profile().hex
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} ({})", self.index(), self.name())
    }
}

/// Name for a raw tool number taken from G-code, which may be out of range.
pub fn tool_name(index: usize) -> &'static str {
    Tool::from_index(index).map_or("unknown", Tool::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_indices_round_trip() {
        for (i, tool) in Tool::ALL.iter().enumerate() {
            assert_eq!(tool.index(), i);
            assert_eq!(Tool::from_index(i), Some(*tool));
        }
        assert_eq!(Tool::from_index(5), None);
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(Tool::Cyan.name(), "Cyan");
        assert_eq!(Tool::White.name(), "White");
        assert_eq!(Tool::Black.label(), "BL");
        assert_eq!(tool_name(7), "unknown");
    }

    #[test]
    fn test_display_colours() {
        assert_eq!(Tool::Cyan.hex(), "#00FFFF");
        assert_eq!(Tool::Black.hex(), "#000000");
        for tool in Tool::ALL {
            assert_eq!(tool.hex().len(), 7);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Tool::Yellow.to_string(), "T2 (Yellow)");
    }
}
