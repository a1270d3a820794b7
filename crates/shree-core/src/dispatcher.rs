//! Command dispatch: registry lookup, executable resolution, launching,
//! URL building, script running, and outcome reporting.
//!
//! Each dispatch is independent and stateless apart from reading the
//! static registry. Every path ends in a reported outcome; nothing here
//! is fatal to the host and nothing is retried.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreResult;
use crate::launcher::{LaunchFailure, LaunchOutcome, Launcher};
use crate::registry::{Action, ApplicationAlias, Registry, ScriptEntry, WebsiteEntry};
use crate::resolver::{self, ResolutionResult};
use crate::script::{ScriptFailure, ScriptOutcome, ScriptRunner};

pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Terminal result of a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Launched { executable: String },
    OpenedUrl { url: String },
    ScriptCompleted { script: String },
    UnknownCommand,
    NoExecutableFound { alias: String, tried: Vec<String> },
    LaunchFailed { failure: LaunchFailure },
    ScriptFailed { script: String, failure: ScriptFailure },
}

impl Outcome {
    /// Short label for UI and log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Launched { .. } => "launched",
            Outcome::OpenedUrl { .. } => "opened_url",
            Outcome::ScriptCompleted { .. } => "script_completed",
            Outcome::UnknownCommand => "unknown_command",
            Outcome::NoExecutableFound { .. } => "no_executable_found",
            Outcome::LaunchFailed { .. } => "launch_failed",
            Outcome::ScriptFailed { .. } => "script_failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::UnknownCommand
                | Outcome::NoExecutableFound { .. }
                | Outcome::LaunchFailed { .. }
                | Outcome::ScriptFailed { .. }
        )
    }
}

/// What the dispatcher hands to the UI/log collaborators, once per command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRecord {
    /// RFC 3339 timestamp taken when the outcome was decided.
    pub timestamp: String,
    pub intent: String,
    pub argument: Option<String>,
    pub outcome: Outcome,
    pub diagnostic: Option<String>,
}

/// UI/log collaborator. Receives every record, success or failure.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report(&self, record: &DispatchRecord);
}

/// Browser-opening collaborator. Receives fully-formed URLs.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &str) -> CoreResult<()>;
}

/// Per-command pipeline over the read-only [`Registry`].
pub struct Dispatcher {
    registry: Arc<Registry>,
    launcher: Launcher,
    runner: ScriptRunner,
    script_paths: HashMap<String, PathBuf>,
    opener: Arc<dyn UrlOpener>,
    reporter: Arc<dyn Reporter>,
    search_path: Option<OsString>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        opener: Arc<dyn UrlOpener>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            registry,
            launcher: Launcher::new(),
            runner: ScriptRunner::new(),
            script_paths: HashMap::new(),
            opener,
            reporter,
            search_path: None,
        }
    }

    pub fn with_launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_script_runner(mut self, runner: ScriptRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Helper-script locations, keyed by the registry's config keys.
    pub fn with_script_paths(mut self, paths: HashMap<String, PathBuf>) -> Self {
        self.script_paths = paths;
        self
    }

    /// Override the executable search path (tests). Defaults to `PATH`,
    /// read fresh on every dispatch.
    pub fn with_search_path(mut self, search_path: OsString) -> Self {
        self.search_path = Some(search_path);
        self
    }

    /// Run one command end to end and report the outcome.
    pub async fn dispatch(&self, intent: &str, argument: Option<&str>) -> DispatchRecord {
        tracing::debug!(intent, ?argument, "dispatching");

        let (outcome, diagnostic) = match self.registry.lookup(intent) {
            None => (
                Outcome::UnknownCommand,
                Some(format!("no action registered for '{intent}'")),
            ),
            Some(Action::App(alias)) => self.launch_app(alias).await,
            Some(Action::Website(entry)) => self.open_site(entry, argument).await,
            Some(Action::Script(entry)) => self.run_script(entry, argument).await,
        };

        if outcome.is_failure() {
            tracing::warn!(intent, kind = outcome.kind(), ?diagnostic, "dispatch failed");
        } else {
            tracing::info!(intent, kind = outcome.kind(), "dispatch succeeded");
        }

        let record = DispatchRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            intent: intent.to_string(),
            argument: argument.map(str::to_string),
            outcome,
            diagnostic,
        };
        self.reporter.report(&record).await;
        record
    }

    async fn launch_app(&self, alias: &ApplicationAlias) -> (Outcome, Option<String>) {
        // Resolution is re-done on every dispatch; installed software can
        // change between commands.
        let resolved = match &self.search_path {
            Some(path) => resolver::resolve_in(path, &alias.candidates),
            None => resolver::resolve(&alias.candidates),
        };

        let path = match resolved {
            ResolutionResult::Resolved(path) => path,
            ResolutionResult::Unresolved => {
                let tried = alias.candidates.clone();
                let diagnostic = format!(
                    "no executable found for '{}'; tried: {}",
                    alias.name,
                    tried.join(", ")
                );
                return (
                    Outcome::NoExecutableFound {
                        alias: alias.name.clone(),
                        tried,
                    },
                    Some(diagnostic),
                );
            }
        };

        let executable = path.display().to_string();
        match self.launcher.launch(&path).await {
            LaunchOutcome::Launched => (Outcome::Launched { executable }, None),
            LaunchOutcome::LaunchFailed { failure } => {
                let diagnostic = match &failure {
                    LaunchFailure::SpawnError { message } => {
                        format!("failed to start '{executable}': {message}")
                    }
                    LaunchFailure::EarlyExit { status, stderr } => {
                        let summary = match status {
                            Some(code) => {
                                format!("'{executable}' exited with status {code} during startup")
                            }
                            None => format!("'{executable}' was killed during startup"),
                        };
                        if stderr.is_empty() {
                            summary
                        } else {
                            format!("{summary}: {stderr}")
                        }
                    }
                };
                (Outcome::LaunchFailed { failure }, Some(diagnostic))
            }
        }
    }

    async fn open_site(
        &self,
        entry: &WebsiteEntry,
        argument: Option<&str>,
    ) -> (Outcome, Option<String>) {
        let url = match argument {
            Some(query) => build_query_url(entry, query),
            None => entry.base_url.clone(),
        };

        let diagnostic = match self.opener.open(&url).await {
            Ok(()) => None,
            Err(error) => {
                tracing::warn!(url, %error, "browser opener failed");
                Some(format!("browser opener failed: {error}"))
            }
        };
        (Outcome::OpenedUrl { url }, diagnostic)
    }

    async fn run_script(
        &self,
        entry: &ScriptEntry,
        argument: Option<&str>,
    ) -> (Outcome, Option<String>) {
        let path = match self.script_paths.get(&entry.config_key) {
            Some(path) => path.clone(),
            None => {
                let diagnostic = format!(
                    "no path configured for helper script '{}' (set {})",
                    entry.name, entry.config_key
                );
                return (
                    Outcome::ScriptFailed {
                        script: entry.name.clone(),
                        failure: ScriptFailure::NotConfigured {
                            config_key: entry.config_key.clone(),
                        },
                    },
                    Some(diagnostic),
                );
            }
        };

        let mut args = entry.args.clone();
        if let Some(extra) = argument {
            args.push(extra.to_string());
        }

        match self.runner.run(&path, &args).await {
            ScriptOutcome::Completed => (
                Outcome::ScriptCompleted {
                    script: entry.name.clone(),
                },
                None,
            ),
            ScriptOutcome::Failed { failure } => {
                let diagnostic = match &failure {
                    ScriptFailure::NotConfigured { config_key } => {
                        format!("no path configured under {config_key}")
                    }
                    ScriptFailure::NotFound { path } => {
                        format!("helper script '{}' not found at {path}", entry.name)
                    }
                    ScriptFailure::SpawnError { message } => {
                        format!("failed to start helper script '{}': {message}", entry.name)
                    }
                    ScriptFailure::ExitedWithError { status, stderr } => {
                        let summary = match status {
                            Some(code) => {
                                format!("helper script '{}' exited with status {code}", entry.name)
                            }
                            None => format!("helper script '{}' was killed", entry.name),
                        };
                        if stderr.is_empty() {
                            summary
                        } else {
                            format!("{summary}: {stderr}")
                        }
                    }
                    ScriptFailure::TimedOut { after_secs } => {
                        format!("helper script '{}' timed out after {after_secs}s", entry.name)
                    }
                };
                (
                    Outcome::ScriptFailed {
                        script: entry.name.clone(),
                        failure,
                    },
                    Some(diagnostic),
                )
            }
        }
    }
}

/// Substitute the percent-encoded query into the entry's template.
///
/// A template without the placeholder cannot carry a query; the base URL
/// is the fallback rather than producing a malformed address.
pub fn build_query_url(entry: &WebsiteEntry, query: &str) -> String {
    let encoded = urlencoding::encode(query);
    if entry.query_template.contains(QUERY_PLACEHOLDER) {
        entry.query_template.replace(QUERY_PLACEHOLDER, &encoded)
    } else {
        tracing::warn!(
            site = entry.name,
            "query template is missing its placeholder; falling back to base URL"
        );
        entry.base_url.clone()
    }
}
