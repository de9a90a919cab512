//! G-code text held as lines.
//!
//! Files are split on `\n` only and written back joined with `\n`, so a file
//! that is not rewritten round-trips byte for byte (including `\r` and a
//! trailing newline).

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::layers::split_lines;
use crate::{Error, Result};

/// A G-code file as an ordered list of lines.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GCode {
    lines: Vec<String>,
}

impl GCode {
    /// Create a GCode from text.
    pub fn from_string(content: &str) -> Self {
        Self {
            lines: split_lines(content),
        }
    }

    /// Create a GCode from already split lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Read G-code from a file.
    ///
    /// A missing file is reported as [`Error::InputNotFound`].
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(Self::from_string(&content))
    }

    /// Write the G-code to a file.
    ///
    /// The content goes to a temporary file next to `path` which is then
    /// renamed over it, so a failed write never leaves partial output behind.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        check_writable(path)?;

        let tmp = temporary_path(path);
        let written = self.write_lines(&tmp).and_then(|()| {
            fs::rename(&tmp, path)?;
            Ok(())
        });
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    fn write_lines(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writer.write_all(b"\n")?;
            }
            writer.write_all(line.as_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Get the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The lines joined with `\n`.
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }
}

/// Check that `path` can be created: its directory must exist and `path`
/// itself must not be a directory.
pub fn check_writable(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() || path.is_dir() {
        return Err(Error::OutputNotWritable(path.to_path_buf()));
    }
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

impl fmt::Debug for GCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GCode({} lines)", self.line_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcode_from_string() {
        let gcode = GCode::from_string("G28\nG1 X10\n");
        assert_eq!(gcode.line_count(), 3);
        assert_eq!(gcode.lines()[1], "G1 X10");
        assert_eq!(gcode.content(), "G28\nG1 X10\n");
    }

    #[test]
    fn test_gcode_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.gcode");
        let text = "G28\r\n;LAYER_CHANGE\r\nT1 ;\n";

        GCode::from_string(text).write_to_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);

        let loaded = GCode::read_from_file(&path).unwrap();
        assert_eq!(loaded.content(), text);
        assert!(!dir.path().join(".part.gcode.tmp").exists());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GCode::read_from_file(dir.path().join("missing.gcode")).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.gcode");
        let err = GCode::from_string("G28").write_to_file(&path).unwrap_err();
        assert!(matches!(err, Error::OutputNotWritable(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_debug_format() {
        let gcode = GCode::from_string("G28\nG1 X10");
        assert_eq!(format!("{:?}", gcode), "GCode(2 lines)");
    }
}
