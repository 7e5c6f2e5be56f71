//! Search execution against ripgrep's JSON event stream

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use localsearch_core::error::{Error, Result, ResultExt};
use localsearch_core::models::SearchMatch;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Longest query forwarded to ripgrep, in characters.
const MAX_QUERY_CHARS: usize = 500;

/// Ripgrep output consumed per root before the invocation is cut off.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Files larger than this are skipped by ripgrep itself.
const MAX_FILESIZE: &str = "10M";

const DEFAULT_MAX_RESULTS: usize = 30;
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Knobs for a single search request.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Pattern handed to ripgrep after sanitization.
    pub query: String,
    /// Cap on the total number of matches returned across all roots.
    pub max_results: usize,
    /// Wall-clock budget for each per-root invocation.
    pub timeout: Duration,
}

impl SearchOptions {
    /// Creates options for `query` with the default result cap and timeout.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Searches every allowed root for the query and aggregates matches.
///
/// Roots are searched in order. Each invocation caps matches per file
/// at `ceil(max_results / roots.len())` so one file cannot crowd out
/// the rest, and the scan stops as soon as `max_results` matches are
/// collected. A failure in one root is logged and the remaining roots
/// are still searched; only an unusable query fails the whole call.
pub async fn search_code(roots: &[PathBuf], options: &SearchOptions) -> Result<Vec<SearchMatch>> {
    if options.query.trim().is_empty() {
        return Err(Error::invalid_query("Query cannot be empty"));
    }
    let query = sanitize_query(&options.query);
    if query.trim().is_empty() {
        return Err(Error::invalid_query("Query cannot be empty"));
    }
    if query != options.query {
        warn!("Query sanitized before search: {query:?}");
    }
    if roots.is_empty() {
        return Ok(Vec::new());
    }

    let per_file_cap = options.max_results.div_ceil(roots.len());
    let mut matches: Vec<SearchMatch> = Vec::new();

    for root in roots {
        let budget = options.max_results - matches.len();
        if budget == 0 {
            break;
        }
        match search_root(root, &query, per_file_cap, budget, options.timeout).await {
            Ok(found) => {
                debug!("{} match(es) in {}", found.len(), root.display());
                matches.extend(found);
            }
            Err(e) => warn!("Search failed in {}: {e}", root.display()),
        }
    }

    matches.truncate(options.max_results);
    Ok(matches)
}

/// Strips the shell metacharacters `;`, `&`, `|`, `` ` ``, `$`, `(`, `)`
/// from a query and truncates it to 500 characters. Regex syntax other
/// than those characters survives.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| !matches!(c, ';' | '&' | '|' | '`' | '$' | '(' | ')'))
        .take(MAX_QUERY_CHARS)
        .collect()
}

/// Runs one ripgrep invocation over `root` and streams its JSON output,
/// collecting up to `budget` matches.
///
/// A timeout or oversized output cuts the invocation short and keeps
/// the matches parsed so far. Exit code 1 (no matches) is not a failure.
async fn search_root(
    root: &Path,
    query: &str,
    per_file_cap: usize,
    budget: usize,
    timeout: Duration,
) -> Result<Vec<SearchMatch>> {
    debug!(
        "rg -i -n --json --max-count {per_file_cap} --max-filesize {MAX_FILESIZE} -- {query:?} {}",
        root.display()
    );
    let mut cmd = Command::new("rg");
    cmd.arg("-i")
        .arg("-n")
        .arg("--json")
        .arg("--max-count")
        .arg(per_file_cap.to_string())
        .arg("--max-filesize")
        .arg(MAX_FILESIZE)
        .arg("--")
        .arg(query)
        .arg(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::tool_unavailable("ripgrep (rg) not found on PATH"),
        _ => Error::Io(e),
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to capture ripgrep stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to capture ripgrep stderr"))?;

    let mut stderr_reader = BufReader::new(stderr);
    let stderr_task = tokio::spawn(async move {
        let mut buf = String::new();
        let _ = stderr_reader.read_to_string(&mut buf).await;
        buf
    });

    let deadline = Instant::now() + timeout;
    let mut lines = BufReader::new(stdout).lines();
    let mut matches = Vec::new();
    let mut bytes_read = 0usize;
    let mut cut_short = false;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!("Search timed out in {}", root.display());
            cut_short = true;
            break;
        }
        let line = match tokio::time::timeout(remaining, lines.next_line()).await {
            Ok(read) => read.context("Failed to read ripgrep output")?,
            Err(_) => {
                warn!("Search timed out in {}", root.display());
                cut_short = true;
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        bytes_read += line.len() + 1;
        if bytes_read > MAX_OUTPUT_BYTES {
            warn!("Search output exceeded {MAX_OUTPUT_BYTES} bytes in {}", root.display());
            cut_short = true;
            break;
        }
        if let Some(found) = parse_match_line(&line) {
            matches.push(found);
            if matches.len() >= budget {
                cut_short = true;
                break;
            }
        }
    }

    if cut_short {
        let _ = child.kill().await;
        return Ok(matches);
    }

    let status = child.wait().await.context("Failed to wait for ripgrep")?;
    // Exit code 1 is ripgrep's signal for zero matches.
    if !status.success() && status.code() != Some(1) {
        let stderr = stderr_task.await.unwrap_or_default();
        let detail = stderr.trim();
        if detail.is_empty() {
            return Err(anyhow::anyhow!("ripgrep exited with {status}").into());
        }
        return Err(anyhow::anyhow!("ripgrep exited with {status}: {detail}").into());
    }

    Ok(matches)
}

/// Parses one line of `rg --json` output into a [`SearchMatch`].
///
/// Only `match` events carry results. `begin`, `end`, `summary` and
/// malformed lines yield `None`.
fn parse_match_line(line: &str) -> Option<SearchMatch> {
    if line.trim().is_empty() {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    if value.get("type").and_then(|t| t.as_str()) != Some("match") {
        return None;
    }
    let data = value.get("data")?;
    let path = data.get("path")?.get("text")?.as_str()?;
    let line_number = data.get("line_number")?.as_u64()?;
    let text = data.get("lines")?.get("text")?.as_str()?;
    Some(SearchMatch {
        path: path.to_string(),
        line: line_number,
        text: text.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_strips_shell_metacharacters() {
        assert_eq!(sanitize_query("foo; rm -rf /"), "foo rm -rf /");
        assert_eq!(sanitize_query("a&&b||c"), "abc");
        assert_eq!(sanitize_query("$(whoami)"), "whoami");
        assert_eq!(sanitize_query("`id`"), "id");
    }

    #[test]
    fn sanitize_preserves_plain_queries() {
        assert_eq!(sanitize_query("getUserInfo"), "getUserInfo");
        assert_eq!(sanitize_query(r"fn \w+_test"), r"fn \w+_test");
        assert_eq!(sanitize_query("TODO: fix me"), "TODO: fix me");
    }

    #[test]
    fn sanitize_truncates_long_queries() {
        let long = "a".repeat(600);
        assert_eq!(sanitize_query(&long).chars().count(), 500);
    }

    #[test]
    fn parse_keeps_match_events() {
        let line = r#"{"type":"match","data":{"path":{"text":"src/main.rs"},"lines":{"text":"fn main() {\n"},"line_number":3,"absolute_offset":20,"submatches":[{"match":{"text":"main"},"start":3,"end":7}]}}"#;
        let parsed = parse_match_line(line).unwrap();
        assert_eq!(parsed.path, "src/main.rs");
        assert_eq!(parsed.line, 3);
        assert_eq!(parsed.text, "fn main() {");
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let line = r#"{"type":"match","data":{"path":{"text":"a.ts"},"lines":{"text":"    const x = 1;\r\n"},"line_number":7,"absolute_offset":0,"submatches":[]}}"#;
        let parsed = parse_match_line(line).unwrap();
        assert_eq!(parsed.text, "const x = 1;");
    }

    #[test]
    fn parse_skips_non_match_events() {
        let begin = r#"{"type":"begin","data":{"path":{"text":"src/main.rs"}}}"#;
        let end = r#"{"type":"end","data":{"path":{"text":"src/main.rs"},"stats":{}}}"#;
        let summary = r#"{"type":"summary","data":{"elapsed_total":{"secs":0}}}"#;
        assert_eq!(parse_match_line(begin), None);
        assert_eq!(parse_match_line(end), None);
        assert_eq!(parse_match_line(summary), None);
    }

    #[test]
    fn parse_skips_malformed_lines() {
        assert_eq!(parse_match_line(""), None);
        assert_eq!(parse_match_line("   "), None);
        assert_eq!(parse_match_line("{not json"), None);
        assert_eq!(parse_match_line(r#"{"type":"match","data":{"path":{"text":"a"}}}"#), None);
    }

    #[test]
    fn default_options() {
        let opts = SearchOptions::new("query");
        assert_eq!(opts.max_results, 30);
        assert_eq!(opts.timeout, Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let opts = SearchOptions::new("   ");
        let err = search_code(&[PathBuf::from("/tmp")], &opts).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
        assert_eq!(err.to_string(), "Invalid query: Query cannot be empty");
    }

    #[tokio::test]
    async fn query_stripped_to_nothing_is_rejected() {
        let opts = SearchOptions::new("$()");
        let err = search_code(&[PathBuf::from("/tmp")], &opts).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn no_roots_returns_empty() {
        let opts = SearchOptions::new("anything");
        let matches = search_code(&[], &opts).await.unwrap();
        assert!(matches.is_empty());
    }
}
