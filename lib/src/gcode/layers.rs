//! Layer boundary detection.
//!
//! The slicer writes `;LAYER_CHANGE` at the start of every layer. The marker
//! may share its line with other text, so any line containing it counts.

/// Sentinel written by the slicer at each layer change.
pub const LAYER_CHANGE_MARKER: &str = ";LAYER_CHANGE";

/// Line indices (0-based, strictly increasing) at which a new layer begins.
pub type LayerPositions = Vec<usize>;

/// Check if a line starts a new layer.
pub fn is_layer_marker(line: &str) -> bool {
    line.contains(LAYER_CHANGE_MARKER)
}

/// Split text into lines on `\n` only.
///
/// Carriage returns stay part of their line, and a trailing newline yields a
/// final empty line, so joining the result with `\n` restores the input.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_owned).collect()
}

/// Indices of every layer marker line.
pub fn find_layer_positions<S: AsRef<str>>(lines: &[S]) -> LayerPositions {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_layer_marker(line.as_ref()))
        .map(|(i, _)| i)
        .collect()
}

/// Split `text` into lines and locate its layer boundaries.
///
/// The number of positions is the layer count of the file.
pub fn locate_layers(text: &str) -> (LayerPositions, Vec<String>) {
    let lines = split_lines(text);
    let positions = find_layer_positions(&lines);
    (positions, lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_layers() {
        let text = "G28\n;LAYER_CHANGE\nG1 Z0.2\n;LAYER_CHANGE\nG1 Z0.4\n";
        let (positions, lines) = locate_layers(text);
        assert_eq!(positions, vec![1, 3]);
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "");
    }

    #[test]
    fn test_marker_as_substring() {
        let lines = ["G1 X0", "M117 ;LAYER_CHANGE here", "; LAYER_CHANGE", ";layer_change"];
        assert_eq!(find_layer_positions(&lines), vec![1]);
    }

    #[test]
    fn test_no_markers() {
        let (positions, lines) = locate_layers("G28\nG1 X10\n");
        assert!(positions.is_empty());
        assert_eq!(lines.join("\n"), "G28\nG1 X10\n");
    }

    #[test]
    fn test_carriage_returns_kept() {
        let (positions, lines) = locate_layers(";LAYER_CHANGE\r\nT1 ;\r\n\r");
        assert_eq!(positions, vec![0]);
        assert_eq!(lines, vec![";LAYER_CHANGE\r", "T1 ;\r", "\r"]);
    }

    #[test]
    fn test_empty_text() {
        let (positions, lines) = locate_layers("");
        assert!(positions.is_empty());
        assert_eq!(lines, vec![""]);
    }
}
