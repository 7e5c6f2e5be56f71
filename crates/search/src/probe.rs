//! Liveness probe for the external ripgrep binary

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// How long the version probe may run before it is abandoned.
const PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Reports whether a working `rg` binary is reachable on PATH.
///
/// Resolves the binary first, then runs `rg --version` under a short
/// timeout. Any failure along the way reads as not installed.
pub async fn is_ripgrep_installed() -> bool {
    if which::which("rg").is_err() {
        return false;
    }

    let mut cmd = Command::new("rg");
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(PROBE_TIMEOUT, cmd.status()).await {
        Ok(Ok(status)) => status.success(),
        _ => false,
    }
}
