mod config;
mod history;

use std::sync::Arc;

use shree_core::intent;
use shree_core::opener::SystemUrlOpener;
use shree_core::{Dispatcher, Launcher, Registry, ScriptRunner};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

const FAREWELLS: &[&str] = &["exit", "quit", "goodbye"];

/// Whether the whole normalized line is a farewell. A farewell word
/// embedded in a longer command ("open goodbye tour tickets") must not
/// quit the shell.
fn is_farewell(normalized: &str) -> bool {
    FAREWELLS.contains(&normalized)
}

#[tokio::main]
async fn main() {
    // Conversation goes to stdout; tracing stays on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::load();
    tracing::info!(history = %config.history_path.display(), "starting shree");

    let registry = Arc::new(Registry::builtin());
    let reporter = Arc::new(history::HistoryReporter::new(config.history_path.clone()));
    let opener = Arc::new(SystemUrlOpener::new());
    let dispatcher = Arc::new(
        Dispatcher::new(registry.clone(), opener, reporter)
            .with_launcher(Launcher::with_grace_window(config.grace_window))
            .with_script_runner(ScriptRunner::with_timeout(config.script_timeout))
            .with_script_paths(config.script_paths.clone()),
    );

    println!("Shree: Hello! I am Shree, your assistant. How can I help you today?");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::error!(%error, "failed to read input");
                break;
            }
        };

        let normalized = intent::normalize(&line);
        if normalized.is_empty() {
            continue;
        }
        if is_farewell(&normalized) {
            break;
        }

        let (key, argument) = match intent::parse(&normalized, &registry) {
            Some(intent) => (intent.key, intent.argument),
            // Unrecognized text still goes through dispatch so the
            // UnknownCommand outcome is reported and logged.
            None => (normalized, None),
        };

        // Dispatch off the interaction loop; the reporter prints the
        // outcome whenever it lands.
        let dispatcher = dispatcher.clone();
        in_flight.spawn(async move {
            dispatcher.dispatch(&key, argument.as_deref()).await;
        });
    }

    // Let pending launches and scripts finish reporting before we leave.
    while in_flight.join_next().await.is_some() {}
    println!("Shree: Goodbye! Have a nice day!");
}
