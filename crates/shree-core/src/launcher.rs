//! Detached process launching with early-failure capture.
//!
//! The assistant does not supervise launched applications: a child still
//! running once the grace window elapses is a success and is left alone.
//! Only failures observable inside the window (spawn errors, abnormal
//! early exits) are attributed to the launch attempt.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncReadExt;

pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_millis(400);

/// Why a launch attempt failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchFailure {
    /// The OS could not start the process at all.
    SpawnError { message: String },
    /// The process exited abnormally before the grace window elapsed.
    EarlyExit { status: Option<i32>, stderr: String },
}

/// Terminal result of a launch attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LaunchOutcome {
    Launched,
    LaunchFailed { failure: LaunchFailure },
}

/// Starts resolved executables as detached children.
#[derive(Debug, Clone)]
pub struct Launcher {
    grace_window: Duration,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub fn new() -> Self {
        Self {
            grace_window: DEFAULT_GRACE_WINDOW,
        }
    }

    pub fn with_grace_window(grace_window: Duration) -> Self {
        Self { grace_window }
    }

    /// Launch `executable` in the background and watch it for the grace
    /// window. The child is never killed by this core.
    pub async fn launch(&self, executable: &Path) -> LaunchOutcome {
        let mut child = match tokio::process::Command::new(executable)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(error) => {
                tracing::warn!(executable = %executable.display(), %error, "failed to spawn");
                return LaunchOutcome::LaunchFailed {
                    failure: LaunchFailure::SpawnError {
                        message: error.to_string(),
                    },
                };
            }
        };

        // Drain stderr concurrently so a chatty child cannot block on a
        // full pipe while we wait on its status.
        let stderr_pipe = child.stderr.take();
        let capture = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf).await;
            }
            buf
        });

        match tokio::time::timeout(self.grace_window, child.wait()).await {
            Ok(Ok(status)) if status.success() => {
                // A clean early exit is common for wrappers that fork the
                // real application and return immediately.
                tracing::debug!(executable = %executable.display(), "exited cleanly within grace window");
                LaunchOutcome::Launched
            }
            Ok(Ok(status)) => {
                let stderr = capture
                    .await
                    .map(|bytes| String::from_utf8_lossy(&bytes).trim_end().to_string())
                    .unwrap_or_default();
                tracing::warn!(
                    executable = %executable.display(),
                    code = status.code(),
                    %stderr,
                    "exited during startup"
                );
                LaunchOutcome::LaunchFailed {
                    failure: LaunchFailure::EarlyExit {
                        status: status.code(),
                        stderr,
                    },
                }
            }
            Ok(Err(error)) => LaunchOutcome::LaunchFailed {
                failure: LaunchFailure::SpawnError {
                    message: error.to_string(),
                },
            },
            Err(_elapsed) => {
                // Still running after the grace window: the launch is
                // good, whatever the process does later. The drain task
                // is left running for the child's lifetime; aborting it
                // would close the pipe and SIGPIPE the child on its next
                // stderr write.
                drop(capture);
                tracing::info!(executable = %executable.display(), "launched");
                LaunchOutcome::Launched
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn script(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn missing_executable_is_spawn_error() {
        let launcher = Launcher::new();
        let outcome = launcher.launch(Path::new("/nonexistent/definitely-not-here")).await;
        assert!(matches!(
            outcome,
            LaunchOutcome::LaunchFailed {
                failure: LaunchFailure::SpawnError { .. }
            }
        ));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn early_abnormal_exit_captures_stderr() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "broken-app", "echo 'error: display not found' >&2\nexit 3");

        let launcher = Launcher::new();
        match launcher.launch(&path).await {
            LaunchOutcome::LaunchFailed {
                failure: LaunchFailure::EarlyExit { status, stderr },
            } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "error: display not found");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn slow_starter_outliving_grace_window_is_launched() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "slow-app", "sleep 5");

        let launcher = Launcher::with_grace_window(Duration::from_millis(100));
        let outcome = launcher.launch(&path).await;
        assert_eq!(outcome, LaunchOutcome::Launched);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn launched_child_survives_later_stderr_writes() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("still-alive");
        let path = script(
            &dir,
            "chatty-app",
            &format!(
                "sleep 1\necho 'late warning' >&2\ntouch '{}'",
                marker.display()
            ),
        );

        let launcher = Launcher::with_grace_window(Duration::from_millis(100));
        let outcome = launcher.launch(&path).await;
        assert_eq!(outcome, LaunchOutcome::Launched);

        // The child writes to stderr well after the grace window; if the
        // pipe were closed underneath it, the write would kill it and the
        // marker would never appear.
        for _ in 0..50 {
            if marker.is_file() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("child died after the grace window instead of running to completion");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn clean_early_exit_is_launched() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "forking-wrapper", "exit 0");

        let launcher = Launcher::new();
        let outcome = launcher.launch(&path).await;
        assert_eq!(outcome, LaunchOutcome::Launched);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn early_exit_with_empty_stderr_still_reported() {
        let dir = TempDir::new().unwrap();
        let path = script(&dir, "silent-failure", "exit 1");

        let launcher = Launcher::new();
        match launcher.launch(&path).await {
            LaunchOutcome::LaunchFailed {
                failure: LaunchFailure::EarlyExit { status, stderr },
            } => {
                assert_eq!(status, Some(1));
                assert!(stderr.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
