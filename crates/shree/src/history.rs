//! The UI/log collaborator: renders every dispatch record as a
//! conversation line and appends it as JSON to the history file.

use std::path::PathBuf;

use async_trait::async_trait;
use shree_core::{DispatchRecord, Outcome, Reporter};
use tokio::io::AsyncWriteExt;

pub struct HistoryReporter {
    path: PathBuf,
}

impl HistoryReporter {
    pub fn new(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                tracing::warn!(%error, dir = %parent.display(), "could not create history directory");
            }
        }
        Self { path }
    }

    async fn append(&self, record: &DispatchRecord) -> std::io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await
    }
}

#[async_trait]
impl Reporter for HistoryReporter {
    async fn report(&self, record: &DispatchRecord) {
        println!("Shree: {}", render(record));
        if let Err(error) = self.append(record).await {
            tracing::error!(%error, path = %self.path.display(), "failed to append history record");
        }
    }
}

/// Render an outcome as a conversation line. Failures are labeled
/// "System Error" so raw diagnostics are visible to the user.
pub fn render(record: &DispatchRecord) -> String {
    match &record.outcome {
        Outcome::Launched { executable } => format!("Opening {} ({executable}).", record.intent),
        Outcome::OpenedUrl { url } => match &record.diagnostic {
            None => format!("Opening {url} in your browser."),
            Some(diagnostic) => format!("System Error: {diagnostic}"),
        },
        Outcome::ScriptCompleted { script } => format!("Finished '{script}'."),
        Outcome::UnknownCommand => {
            "I didn't understand that command. Please try again.".to_string()
        }
        Outcome::NoExecutableFound { .. }
        | Outcome::LaunchFailed { .. }
        | Outcome::ScriptFailed { .. } => {
            let detail = record
                .diagnostic
                .as_deref()
                .unwrap_or("no diagnostic available");
            format!("System Error: {detail}")
        }
    }
}
