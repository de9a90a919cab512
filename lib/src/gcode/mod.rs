//! G-code handling: layer detection, tool command dialects and rewriting.
//!
//! - [`locate_layers`] - split text and find `;LAYER_CHANGE` lines
//! - [`CommandKind`] / [`ToolCommand`] - the five tool command shapes
//! - [`RewriterState`] / [`rewrite`] - the single-pass tool rewriter
//! - [`GCode`] - file-backed line container

pub mod command;
mod document;
pub mod layers;
pub mod rewriter;

pub use command::{CommandError, CommandKind, PreheatParams, ToolCommand};
pub use document::{check_writable, GCode};
pub use layers::{
    find_layer_positions, is_layer_marker, locate_layers, split_lines, LayerPositions,
    LAYER_CHANGE_MARKER,
};
pub use rewriter::{rewrite, LineOutcome, Rewrite, RewriteStats, RewriterState, Step};
