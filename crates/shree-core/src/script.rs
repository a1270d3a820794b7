//! Helper-script execution.
//!
//! Unlike application launches, helper scripts (package installer, git
//! utilities, kafka control) run to completion: the user is waiting on
//! their result. Runs are bounded by a hard timeout so a hung script
//! cannot wedge a dispatch forever.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;

pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(600);

/// Why a helper-script run failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptFailure {
    /// No path configured under the script's config key.
    NotConfigured { config_key: String },
    /// A path was configured but nothing exists there.
    NotFound { path: String },
    /// The interpreter could not be started.
    SpawnError { message: String },
    /// The script ran but exited non-zero.
    ExitedWithError { status: Option<i32>, stderr: String },
    /// The script exceeded the hard timeout.
    TimedOut { after_secs: u64 },
}

/// Terminal result of a helper-script run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScriptOutcome {
    Completed,
    Failed { failure: ScriptFailure },
}

/// Runs configured helper scripts through `bash`.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    timeout: Duration,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_SCRIPT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `script` with `args` and wait for it to finish.
    ///
    /// Stdout and stdin are inherited so interactive scripts keep working;
    /// stderr is captured for the failure diagnostic.
    pub async fn run(&self, script: &Path, args: &[String]) -> ScriptOutcome {
        if !script.is_file() {
            tracing::warn!(script = %script.display(), "helper script not found");
            return ScriptOutcome::Failed {
                failure: ScriptFailure::NotFound {
                    path: script.display().to_string(),
                },
            };
        }

        let mut child = match tokio::process::Command::new("bash")
            .arg(script)
            .args(args)
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(error) => {
                return ScriptOutcome::Failed {
                    failure: ScriptFailure::SpawnError {
                        message: error.to_string(),
                    },
                }
            }
        };

        let stderr_pipe = child.stderr.take();
        let capture = tokio::spawn(async move {
            use tokio::io::AsyncReadExt;
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf).await;
            }
            buf
        });

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => {
                tracing::info!(script = %script.display(), ?args, "helper script completed");
                ScriptOutcome::Completed
            }
            Ok(Ok(status)) => {
                let stderr = capture
                    .await
                    .map(|bytes| String::from_utf8_lossy(&bytes).trim_end().to_string())
                    .unwrap_or_default();
                tracing::warn!(
                    script = %script.display(),
                    code = status.code(),
                    "helper script failed"
                );
                ScriptOutcome::Failed {
                    failure: ScriptFailure::ExitedWithError {
                        status: status.code(),
                        stderr,
                    },
                }
            }
            Ok(Err(error)) => ScriptOutcome::Failed {
                failure: ScriptFailure::SpawnError {
                    message: error.to_string(),
                },
            },
            Err(_elapsed) => {
                capture.abort();
                let _ = child.start_kill();
                tracing::warn!(script = %script.display(), timeout = ?self.timeout, "helper script timed out");
                ScriptOutcome::Failed {
                    failure: ScriptFailure::TimedOut {
                        // Round up so sub-second timeouts never report "0s".
                        after_secs: self.timeout.as_millis().div_ceil(1000) as u64,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn script_file(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/bash\n{body}\n")).unwrap();
        path
    }

    #[tokio::test]
    async fn missing_script_is_not_found() {
        let runner = ScriptRunner::new();
        let outcome = runner.run(Path::new("/nonexistent/pkgInstaller.sh"), &[]).await;
        assert!(matches!(
            outcome,
            ScriptOutcome::Failed {
                failure: ScriptFailure::NotFound { .. }
            }
        ));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn successful_script_completes() {
        let dir = TempDir::new().unwrap();
        let path = script_file(&dir, "ok.sh", "exit 0");

        let runner = ScriptRunner::new();
        let outcome = runner.run(&path, &["install".into(), "git".into()]).await;
        assert_eq!(outcome, ScriptOutcome::Completed);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn failing_script_reports_status_and_stderr() {
        let dir = TempDir::new().unwrap();
        let path = script_file(&dir, "bad.sh", "echo 'apt: package not found' >&2\nexit 100");

        let runner = ScriptRunner::new();
        match runner.run(&path, &[]).await {
            ScriptOutcome::Failed {
                failure: ScriptFailure::ExitedWithError { status, stderr },
            } => {
                assert_eq!(status, Some(100));
                assert_eq!(stderr, "apt: package not found");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn hung_script_times_out() {
        let dir = TempDir::new().unwrap();
        let path = script_file(&dir, "hang.sh", "sleep 30");

        let runner = ScriptRunner::with_timeout(Duration::from_millis(100));
        let outcome = runner.run(&path, &[]).await;
        // Sub-second timeouts round up instead of reporting "0s".
        assert_eq!(
            outcome,
            ScriptOutcome::Failed {
                failure: ScriptFailure::TimedOut { after_secs: 1 }
            }
        );
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn whole_second_timeout_reports_exact_seconds() {
        let dir = TempDir::new().unwrap();
        let path = script_file(&dir, "hang.sh", "sleep 30");

        let runner = ScriptRunner::with_timeout(Duration::from_secs(2));
        let outcome = runner.run(&path, &[]).await;
        assert_eq!(
            outcome,
            ScriptOutcome::Failed {
                failure: ScriptFailure::TimedOut { after_secs: 2 }
            }
        );
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn script_receives_arguments() {
        let dir = TempDir::new().unwrap();
        // Exits zero only when called with the expected arguments.
        let path = script_file(&dir, "args.sh", "[ \"$1\" = install ] && [ \"$2\" = git ]");

        let runner = ScriptRunner::new();
        let outcome = runner.run(&path, &["install".into(), "git".into()]).await;
        assert_eq!(outcome, ScriptOutcome::Completed);
    }
}
