//! Subprocess probing and bounded-timeout execution shared by every
//! collector that shells out to an external tool.

use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Deterministic environment for external tools: fixed locale, interpreter
/// path variables cleared so the tool can't pick up the caller's virtualenv
/// or module search path.
fn sanitized_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
        cmd.env("PATH", path);
    }
    cmd.env("LANG", "C");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd
}

/// Result of a bounded subprocess run.
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

/// A short `--version`-style probe used to detect tool presence before
/// committing to a full invocation.
pub async fn probe(program: &str, args: &[&str], probe_timeout: Duration) -> Option<String> {
    let mut cmd = sanitized_command(program);
    cmd.args(args);
    let child = cmd.spawn().ok()?;
    let output = timeout(probe_timeout, child.wait_with_output())
        .await
        .ok()?
        .ok()?;
    if !output.status.success() && output.stdout.is_empty() && output.stderr.is_empty() {
        return None;
    }
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    Some(combined.trim().to_string())
}

/// Invoke `program` with `args` in `cwd`, capturing stdout/stderr with a
/// hard timeout. The child is killed on timeout.
pub async fn invoke(
    program: &str,
    args: &[&str],
    cwd: &std::path::Path,
    run_timeout: Duration,
) -> std::io::Result<ProcessOutput> {
    let mut cmd = sanitized_command(program);
    cmd.args(args).current_dir(cwd);

    let mut child = cmd.spawn()?;
    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();

    let wait = async {
        use tokio::io::AsyncReadExt;
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        if let Some(mut pipe) = stdout_pipe.take() {
            let _ = pipe.read_to_end(&mut stdout).await;
        }
        if let Some(mut pipe) = stderr_pipe.take() {
            let _ = pipe.read_to_end(&mut stderr).await;
        }
        let status = child.wait().await?;
        std::io::Result::Ok((status, stdout, stderr))
    };

    match timeout(run_timeout, wait).await {
        Ok(Ok((status, stdout, stderr))) => Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            timed_out: false,
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => Ok(ProcessOutput {
            exit_code: None,
            stdout: String::new(),
            stderr: "process timed out".to_string(),
            timed_out: true,
        }),
    }
}

/// Write raw tool output to an artifact file, redacting obvious secret
/// patterns first.
pub async fn write_artifact(path: &std::path::Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let redacted = qaagent_common::redact::redact(contents);
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(redacted.as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_missing_binary_returns_none() {
        let v = probe("definitely-not-a-real-binary-xyz", &["--version"], Duration::from_secs(2)).await;
        assert!(v.is_none());
    }

    #[tokio::test]
    async fn invoke_true_succeeds_with_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let out = invoke("true", &[], dir.path(), Duration::from_secs(5)).await.unwrap();
        assert_eq!(out.exit_code, Some(0));
        assert!(!out.timed_out);
    }

    #[tokio::test]
    async fn invoke_enforces_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let out = invoke("sleep", &["5"], dir.path(), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(out.timed_out);
    }

    #[tokio::test]
    async fn write_artifact_redacts_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.log");
        write_artifact(&path, "TOKEN=supersecret").await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!contents.contains("supersecret"));
    }
}
