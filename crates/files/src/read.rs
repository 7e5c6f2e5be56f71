//! Line-range snippet extraction

use localsearch_core::error::{Error, Result, ResultExt};
use localsearch_core::models::FileSnippet;
use localsearch_core::{is_path_allowed, normalize_path};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Maximum number of lines servable per call
pub const MAX_SNIPPET_LINES: u64 = 200;

/// Files larger than this are refused outright
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Binary detection samples at most this many leading bytes
const BINARY_SNIFF_BYTES: usize = 8000;

/// Read a 1-based, inclusive line range from a file under the allowed
/// roots.
///
/// `end` is clamped down to the file's total line count when the request
/// over-shoots; a `start` beyond the end of the file is an error, not a
/// clamp. The returned snippet joins lines with a single `\n` and carries
/// the total line count so callers can detect truncation.
pub async fn read_snippet(
    allowed_roots: &[PathBuf],
    path: &str,
    start: u64,
    end: u64,
) -> Result<FileSnippet> {
    if path.trim().is_empty() {
        return Err(Error::invalid_request("File path is required"));
    }

    if start < 1 {
        return Err(Error::invalid_request("Start line must be >= 1"));
    }

    if end < start {
        return Err(Error::invalid_request("End line must be >= start line"));
    }

    if end - start + 1 > MAX_SNIPPET_LINES {
        return Err(Error::invalid_request(format!(
            "Maximum {MAX_SNIPPET_LINES} lines per request"
        )));
    }

    if !is_path_allowed(Path::new(path), allowed_roots) {
        return Err(Error::access_denied(
            "path is outside allowed repositories",
        ));
    }

    let resolved = normalize_path(Path::new(path))?;

    let mut file = File::open(&resolved)
        .await
        .map_err(|_| Error::not_found("File not found or not readable"))?;

    if sniff_binary(&mut file).await {
        return Err(Error::unsupported_content("Cannot read binary file"));
    }

    let size = file
        .metadata()
        .await
        .context(format!("Failed to stat {}", resolved.display()))?
        .len();
    if size > MAX_FILE_SIZE_BYTES {
        return Err(Error::TooLarge {
            size,
            limit: MAX_FILE_SIZE_BYTES,
        });
    }
    drop(file);

    // The whole file fits comfortably under the size cap, and the total
    // line count is needed regardless of the requested range.
    let bytes = tokio::fs::read(&resolved)
        .await
        .context(format!("Failed to read {}", resolved.display()))?;
    let content = String::from_utf8_lossy(&bytes);

    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let total_lines = lines.len() as u64;

    if start > total_lines {
        return Err(Error::OutOfRange { start, total_lines });
    }

    let actual_end = end.min(total_lines);
    let snippet = lines[(start - 1) as usize..actual_end as usize].join("\n");

    Ok(FileSnippet {
        path: path.to_string(),
        start,
        end: actual_end,
        snippet,
        total_lines,
    })
}

/// Check the leading bytes of an open file for null bytes.
///
/// Read failures count as binary: a file we cannot sample is not served.
pub(crate) async fn sniff_binary(file: &mut File) -> bool {
    let mut sample = [0u8; BINARY_SNIFF_BYTES];
    let mut filled = 0;

    while filled < sample.len() {
        match file.read(&mut sample[filled..]).await {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(_) => return true,
        }
    }

    sample[..filled].iter().any(|byte| *byte == 0)
}

/// Path-level binary check; files that cannot be opened count as binary.
pub(crate) async fn is_binary_file(path: &Path) -> bool {
    match File::open(path).await {
        Ok(mut file) => sniff_binary(&mut file).await,
        Err(_) => true,
    }
}
