//! Integration tests for the search engine
//!
//! These tests create temporary repository trees and run the real
//! ripgrep binary against them. Each test bails out early when `rg`
//! is not on PATH so the suite still passes on minimal machines.

use std::path::PathBuf;
use std::time::Duration;

use localsearch_search::{search_code, SearchOptions};
use tempfile::TempDir;

/// Reports whether the real ripgrep binary is available for this run.
fn rg_available() -> bool {
    if which::which("rg").is_ok() {
        return true;
    }
    eprintln!("skipping: rg not found on PATH");
    false
}

/// Helper to create a file with the given lines inside a temp root.
fn write_lines(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[tokio::test]
async fn test_search_finds_match_with_line_and_text() {
    if !rg_available() {
        return;
    }
    let repo = TempDir::new().unwrap();
    let mut lines: Vec<String> = (1..10).map(|n| format!("// filler {n}")).collect();
    lines.push("function getUserInfo() {".to_string());
    lines.push("}".to_string());
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_lines(&repo, "a.ts", &line_refs);

    let roots = vec![repo.path().to_path_buf()];
    let matches = search_code(&roots, &SearchOptions::new("getUserInfo"))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("a.ts"));
    assert_eq!(matches[0].line, 10);
    assert_eq!(matches[0].text, "function getUserInfo() {");
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    if !rg_available() {
        return;
    }
    let repo = TempDir::new().unwrap();
    write_lines(&repo, "greeting.txt", &["Hello World"]);

    let roots = vec![repo.path().to_path_buf()];
    let matches = search_code(&roots, &SearchOptions::new("hello world"))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].text, "Hello World");
}

#[tokio::test]
async fn test_match_text_is_trimmed() {
    if !rg_available() {
        return;
    }
    let repo = TempDir::new().unwrap();
    write_lines(&repo, "indent.ts", &["    const answer = 42;"]);

    let roots = vec![repo.path().to_path_buf()];
    let matches = search_code(&roots, &SearchOptions::new("answer"))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].text, "const answer = 42;");
}

#[tokio::test]
async fn test_no_matches_returns_empty_list() {
    if !rg_available() {
        return;
    }
    let repo = TempDir::new().unwrap();
    write_lines(&repo, "a.txt", &["nothing interesting here"]);

    let roots = vec![repo.path().to_path_buf()];
    let matches = search_code(&roots, &SearchOptions::new("zz_definitely_absent_zz"))
        .await
        .unwrap();

    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_result_count_never_exceeds_max_results() {
    if !rg_available() {
        return;
    }
    let repo = TempDir::new().unwrap();
    let lines: Vec<String> = (1..=50).map(|n| format!("needle number {n}")).collect();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    write_lines(&repo, "haystack.txt", &line_refs);

    let roots = vec![repo.path().to_path_buf()];
    let options = SearchOptions {
        query: "needle".to_string(),
        max_results: 5,
        timeout: Duration::from_millis(5000),
    };
    let matches = search_code(&roots, &options).await.unwrap();

    assert_eq!(matches.len(), 5);
}

#[tokio::test]
async fn test_matches_aggregate_across_roots() {
    if !rg_available() {
        return;
    }
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_lines(&first, "one.rs", &["shared_symbol in the first root"]);
    write_lines(&second, "two.rs", &["shared_symbol in the second root"]);

    let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let matches = search_code(&roots, &SearchOptions::new("shared_symbol"))
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    let first_prefix = first.path().to_string_lossy().to_string();
    let second_prefix = second.path().to_string_lossy().to_string();
    assert!(matches.iter().any(|m| m.path.starts_with(&first_prefix)));
    assert!(matches.iter().any(|m| m.path.starts_with(&second_prefix)));
}

#[tokio::test]
async fn test_failing_root_does_not_abort_search() {
    if !rg_available() {
        return;
    }
    let repo = TempDir::new().unwrap();
    write_lines(&repo, "present.rs", &["fn reachable_symbol() {}"]);

    let roots = vec![
        PathBuf::from("/nonexistent/path/for/this/test"),
        repo.path().to_path_buf(),
    ];
    let matches = search_code(&roots, &SearchOptions::new("reachable_symbol"))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert!(matches[0].path.ends_with("present.rs"));
}
