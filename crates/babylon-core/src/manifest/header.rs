//! Header classification: read the leading lines of a manifest and extract
//! its `kind`.
//!
//! The window is explicit and bounded. A `kind` key that appears below the
//! window is not seen, and the file is reported as unclassified.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::types::ResourceKind;

/// Why a manifest could not be assigned to a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    Unreadable(String),
    InvalidYaml(String),
    NotAMapping,
    MissingKind,
    UnknownKind(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(e) => write!(f, "header could not be read: {e}"),
            SkipReason::InvalidYaml(e) => write!(f, "header is not valid YAML: {e}"),
            SkipReason::NotAMapping => f.write_str("header is not a YAML mapping"),
            SkipReason::MissingKind => f.write_str("no 'kind' key in header"),
            SkipReason::UnknownKind(k) => write!(f, "unknown kind '{k}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Classified(ResourceKind),
    Unclassified(SkipReason),
}

/// Read at most `lines` lines from the top of `path`, line endings kept.
///
/// Shorter files yield whatever they contain.
pub fn read_header(path: &Path, lines: usize) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = String::new();
    for _ in 0..lines {
        if reader.read_line(&mut header)? == 0 {
            break;
        }
    }
    Ok(header)
}

/// Classify a header fragment by its top-level `kind` value.
pub fn parse_kind(header: &str) -> Classification {
    if header.trim().is_empty() {
        return Classification::Unclassified(SkipReason::NotAMapping);
    }
    let value: serde_yaml::Value = match serde_yaml::from_str(header) {
        Ok(v) => v,
        Err(e) => return Classification::Unclassified(SkipReason::InvalidYaml(e.to_string())),
    };

    let serde_yaml::Value::Mapping(map) = value else {
        return Classification::Unclassified(SkipReason::NotAMapping);
    };

    match map.get("kind") {
        None | Some(serde_yaml::Value::Null) => {
            Classification::Unclassified(SkipReason::MissingKind)
        }
        Some(serde_yaml::Value::String(s)) => match s.parse::<ResourceKind>() {
            Ok(kind) => Classification::Classified(kind),
            Err(_) => Classification::Unclassified(SkipReason::UnknownKind(s.clone())),
        },
        Some(other) => Classification::Unclassified(SkipReason::UnknownKind(
            serde_yaml::to_string(other)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        )),
    }
}

/// Read and classify in one step.
pub fn classify_file(path: &Path, lines: usize) -> (String, Classification) {
    match read_header(path, lines) {
        Ok(header) => {
            let classification = parse_kind(&header);
            (header, classification)
        }
        Err(e) => (
            String::new(),
            Classification::Unclassified(SkipReason::Unreadable(e.to_string())),
        ),
    }
}
