//! Source loading configuration.
//!
//! Configuration is plain serde data so it can come from a JSON file, from
//! CLI flags, or from code. Every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const DEFAULT_FILENAME: &str = "<string>";
pub const DEFAULT_BEGIN_MARKER: &str = "// BEGIN BYTECODES //";
pub const DEFAULT_END_MARKER: &str = "// END BYTECODES //";

/// How a [`crate::source::Source`] is built from raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Label used in diagnostics and span display.
    pub filename: String,
    /// Line number assigned to the first line of the text.
    pub first_line: usize,
    /// Markers delimiting the region of a file to parse.
    pub section: SectionMarkers,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            first_line: 1,
            section: SectionMarkers::default(),
        }
    }
}

/// Pair of full-line markers; the lines strictly between them are selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionMarkers {
    pub begin: String,
    pub end: String,
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self {
            begin: DEFAULT_BEGIN_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

impl SourceConfig {
    /// Config for text labelled `filename`, all other fields defaulted.
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Format {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Select the lines between the section markers of `text`.
    ///
    /// The returned config's `first_line` points at the first selected line
    /// and the section records its byte offset in `text`, so token positions
    /// and diagnostics still match the original file.
    pub fn select(&self, text: &str) -> Result<Section, ConfigError> {
        let mut lines = Vec::new();
        let mut start = 0;
        for line in text.split_inclusive('\n') {
            lines.push((start, line.trim_end_matches(&['\n', '\r'][..])));
            start += line.len();
        }
        let begin = find_marker(&lines, &self.section.begin, 0)?;
        let end = find_marker(&lines, &self.section.end, begin + 1)?;

        let offset = lines[begin + 1].0;
        let body = &text[offset..lines[end].0];
        let body = body.strip_suffix('\n').unwrap_or(body);
        let body = body.strip_suffix('\r').unwrap_or(body);
        Ok(Section {
            text: body.to_string(),
            offset,
            config: SourceConfig {
                first_line: self.first_line + begin + 1,
                ..self.clone()
            },
        })
    }
}

/// A marker-delimited region of a file, as returned by
/// [`SourceConfig::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub text: String,
    /// Byte offset of `text` within the file it was selected from.
    pub offset: usize,
    pub config: SourceConfig,
}

fn find_marker(lines: &[(usize, &str)], marker: &str, from: usize) -> Result<usize, ConfigError> {
    lines
        .iter()
        .skip(from)
        .position(|(_, line)| *line == marker)
        .map(|index| index + from)
        .ok_or_else(|| ConfigError::MissingMarker {
            marker: marker.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: SourceConfig = serde_json::from_str(r#"{"filename": "bytecodes.c"}"#).unwrap();
        assert_eq!(config.filename, "bytecodes.c");
        assert_eq!(config.first_line, 1);
        assert_eq!(config.section, SectionMarkers::default());
    }

    #[test]
    fn test_select_between_markers() {
        let text = "head\n// BEGIN BYTECODES //\na;\nb;\n// END BYTECODES //\ntail";
        let section = SourceConfig::named("f.c").select(text).unwrap();
        assert_eq!(section.text, "a;\nb;");
        assert_eq!(section.offset, 27);
        assert_eq!(&text[section.offset..section.offset + 2], "a;");
        assert_eq!(section.config.first_line, 3);
        assert_eq!(section.config.filename, "f.c");
    }

    #[test]
    fn test_select_missing_marker() {
        let err = SourceConfig::default().select("no markers here").unwrap_err();
        assert!(matches!(err, ConfigError::MissingMarker { .. }));
    }

    #[test]
    fn test_select_keeps_file_offsets_with_crlf() {
        let text = "x\r\n// BEGIN BYTECODES //\r\na;\r\n// END BYTECODES //\r\n";
        let section = SourceConfig::named("f.c").select(text).unwrap();
        assert_eq!(section.text, "a;");
        assert_eq!(&text[section.offset..section.offset + 2], "a;");
    }

    #[test]
    fn test_select_empty_section() {
        let text = "// BEGIN BYTECODES //\n// END BYTECODES //";
        let section = SourceConfig::default().select(text).unwrap();
        assert_eq!(section.text, "");
        assert_eq!(section.config.first_line, 2);
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("rewind-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_from_json_file() {
        let path = temp_file(
            "config.json",
            r#"{"filename": "ceval.c", "first_line": 7, "section": {"begin": "/* start */"}}"#,
        );
        let config = SourceConfig::from_json_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.filename, "ceval.c");
        assert_eq!(config.first_line, 7);
        assert_eq!(config.section.begin, "/* start */");
        assert_eq!(config.section.end, DEFAULT_END_MARKER);
    }

    #[test]
    fn test_from_json_file_missing() {
        let path = std::env::temp_dir().join("rewind-no-such-config.json");
        let err = SourceConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().starts_with("failed to read config file"));
    }

    #[test]
    fn test_from_json_file_malformed() {
        let path = temp_file("bad.json", r#"{"first_line": "seven"}"#);
        let err = SourceConfig::from_json_file(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, ConfigError::Format { .. }));
        assert!(err.to_string().starts_with("invalid config file"));
    }
}
