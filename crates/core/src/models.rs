//! Wire-level data model shared by the HTTP facade and the MCP adapter

use serde::{Deserialize, Serialize};

/// One line of text in one file that satisfied a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Path of the file containing the match
    pub path: String,
    /// 1-based line number
    pub line: u64,
    /// Matched line text, trimmed
    pub text: String,
}

/// A contiguous line-range extract of a single file
///
/// `end` is the effective end line: it is clamped down to `total_lines`
/// when the requested range over-shoots the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnippet {
    pub path: String,
    /// 1-based first line of the extract
    pub start: u64,
    /// 1-based last line of the extract, clamped to the file length
    pub end: u64,
    /// Requested lines joined by a single newline
    pub snippet: String,
    #[serde(rename = "totalLines")]
    pub total_lines: u64,
}

/// File metadata reported without returning content
///
/// `lines` is omitted for binary files, where counting lines would mean
/// reading content for nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub exists: bool,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<u64>,
    #[serde(rename = "isBinary", skip_serializing_if = "Option::is_none")]
    pub is_binary: Option<bool>,
}

impl FileInfo {
    /// The probe result for anything that does not exist or cannot be
    /// inspected
    pub fn missing() -> Self {
        Self {
            exists: false,
            size: 0,
            lines: None,
            is_binary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snippet_serializes_total_lines_in_camel_case() {
        let snippet = FileSnippet {
            path: "/repo/a.ts".to_string(),
            start: 1,
            end: 2,
            snippet: "a\nb".to_string(),
            total_lines: 10,
        };

        let value = serde_json::to_value(&snippet).unwrap();
        assert_eq!(value["totalLines"], 10);
        assert!(value.get("total_lines").is_none());
    }

    #[test]
    fn missing_file_info_omits_optional_fields() {
        let value = serde_json::to_value(FileInfo::missing()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "exists": false, "size": 0 })
        );
    }

    #[test]
    fn binary_file_info_reports_is_binary_without_lines() {
        let info = FileInfo {
            exists: true,
            size: 2048,
            lines: None,
            is_binary: Some(true),
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["isBinary"], true);
        assert!(value.get("lines").is_none());
    }

    #[test]
    fn file_info_round_trips_from_wire_json() {
        let info: FileInfo =
            serde_json::from_str(r#"{"exists":true,"size":120,"lines":5,"isBinary":false}"#)
                .unwrap();
        assert_eq!(info.lines, Some(5));
        assert_eq!(info.is_binary, Some(false));
    }
}
