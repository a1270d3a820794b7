//! Native browser opening, one collaborator implementation per platform.

use async_trait::async_trait;

use crate::dispatcher::UrlOpener;
use crate::error::{CoreError, CoreResult};

/// Opens URLs with the platform's default handler
/// (`xdg-open` / `open` / `cmd /C start`).
#[derive(Debug, Default)]
pub struct SystemUrlOpener;

impl SystemUrlOpener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UrlOpener for SystemUrlOpener {
    async fn open(&self, url: &str) -> CoreResult<()> {
        open_url_native(url).await
    }
}

async fn run_opener(program: &str, args: &[&str], url: &str) -> CoreResult<()> {
    let status = tokio::process::Command::new(program)
        .args(args)
        .arg(url)
        .status()
        .await
        .map_err(|error| CoreError::Internal(format!("failed to run {program}: {error}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(CoreError::Internal(format!(
            "{program} failed with status {status}"
        )))
    }
}

#[cfg(target_os = "linux")]
async fn open_url_native(url: &str) -> CoreResult<()> {
    run_opener("xdg-open", &[], url).await
}

#[cfg(target_os = "macos")]
async fn open_url_native(url: &str) -> CoreResult<()> {
    run_opener("open", &[], url).await
}

#[cfg(target_os = "windows")]
async fn open_url_native(url: &str) -> CoreResult<()> {
    run_opener("cmd", &["/C", "start", ""], url).await
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
async fn open_url_native(_url: &str) -> CoreResult<()> {
    Err(CoreError::Internal(
        "opening URLs is not supported on this platform".to_string(),
    ))
}
