//! Batch manifest: which color each game file is analysed for.
//!
//! The manifest is a CSV file with a header row followed by
//! `color,filename` rows.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::color::ColorLabel;

/// Errors raised while reading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A row does not have exactly two fields.
    #[error("Malformed manifest row {line}: {content:?}")]
    MalformedRow { line: usize, content: String },
}

/// One manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based line number in the manifest file.
    pub line: usize,
    pub color: ColorLabel,
    /// Game file name, relative to the batch folder.
    pub file_name: String,
}

/// Parses manifest text. The first line is a header and is skipped, as
/// are blank lines.
pub fn parse_manifest(content: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
    let mut entries = Vec::new();

    for (idx, raw) in content.lines().enumerate().skip(1) {
        let line = idx + 1;
        let row = raw.trim();
        if row.is_empty() {
            continue;
        }

        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        match fields.as_slice() {
            [color, file_name] if !file_name.is_empty() => entries.push(ManifestEntry {
                line,
                color: ColorLabel::parse(color),
                file_name: (*file_name).to_string(),
            }),
            _ => {
                return Err(ManifestError::MalformedRow {
                    line,
                    content: row.to_string(),
                })
            }
        }
    }

    Ok(entries)
}

/// Reads and parses a manifest file.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<ManifestEntry>, ManifestError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_after_header() {
        let content = "color,filename\nblack,game1.pgn\nWhite , game2.pgn\n";
        let entries = parse_manifest(content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].color, ColorLabel::Black);
        assert_eq!(entries[0].file_name, "game1.pgn");
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[1].color, ColorLabel::White);
        assert_eq!(entries[1].file_name, "game2.pgn");
    }

    #[test]
    fn test_blank_lines_and_crlf_are_ignored() {
        let content = "color,filename\r\n\r\nblack,a.pgn\r\n  \n";
        let entries = parse_manifest(content).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "a.pgn");
        assert_eq!(entries[0].line, 3);
    }

    #[test]
    fn test_unrecognized_color_is_kept() {
        let entries = parse_manifest("color,filename\ngreen,c.pgn\n").unwrap();
        assert_eq!(entries[0].color, ColorLabel::Other("green".to_string()));
    }

    #[test]
    fn test_malformed_row_is_rejected() {
        let result = parse_manifest("color,filename\nblack,a.pgn\njust-a-name.pgn\n");
        match result {
            Err(ManifestError::MalformedRow { line, content }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "just-a-name.pgn");
            }
            other => panic!("Expected MalformedRow, got {:?}", other),
        }

        assert!(parse_manifest("h\nblack,a.pgn,extra\n").is_err());
        assert!(parse_manifest("h\nblack,\n").is_err());
    }

    #[test]
    fn test_header_only_manifest_is_empty() {
        assert!(parse_manifest("color,filename\n").unwrap().is_empty());
        assert!(parse_manifest("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_manifest_file() {
        let result = read_manifest("/nonexistent/games-collection.csv");
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }
}
