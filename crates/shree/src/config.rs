//! Environment-backed configuration: helper-script locations, history
//! file placement, and dispatch timing knobs. A `.env` file in the
//! working directory is honored.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use shree_core::launcher::DEFAULT_GRACE_WINDOW;
use shree_core::script::DEFAULT_SCRIPT_TIMEOUT;

/// Config keys under which helper-script paths are looked up. These match
/// the registry's script entries.
pub const SCRIPT_KEYS: &[&str] = &[
    "PKG_INSTALLER_SCRIPT",
    "GIT_UTILS_SCRIPT",
    "KAFKA_UTILS_SCRIPT",
];

const HISTORY_KEY: &str = "SHREE_HISTORY_FILE";
const GRACE_WINDOW_KEY: &str = "SHREE_GRACE_WINDOW_MS";
const SCRIPT_TIMEOUT_KEY: &str = "SHREE_SCRIPT_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Config {
    pub script_paths: HashMap<String, PathBuf>,
    pub history_path: PathBuf,
    pub grace_window: Duration,
    pub script_timeout: Duration,
}

impl Config {
    /// Load from the process environment, with `.env` merged in first.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(&std::env::vars().collect())
    }

    fn from_vars(vars: &HashMap<String, String>) -> Self {
        let script_paths = SCRIPT_KEYS
            .iter()
            .filter_map(|&key| {
                vars.get(key)
                    .filter(|value| !value.is_empty())
                    .map(|value| (key.to_string(), PathBuf::from(value)))
            })
            .collect();

        let history_path = vars
            .get(HISTORY_KEY)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_history_path);

        let grace_window = vars
            .get(GRACE_WINDOW_KEY)
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_GRACE_WINDOW);

        let script_timeout = vars
            .get(SCRIPT_TIMEOUT_KEY)
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SCRIPT_TIMEOUT);

        Self {
            script_paths,
            history_path,
            grace_window,
            script_timeout,
        }
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("shree").join("history.jsonl"))
        .unwrap_or_else(|| PathBuf::from("shree_history.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_paths_come_from_matching_keys() {
        let vars = HashMap::from([
            ("PKG_INSTALLER_SCRIPT".to_string(), "/opt/shree/pkgInstaller.sh".to_string()),
            ("UNRELATED".to_string(), "/tmp/other".to_string()),
        ]);
        let config = Config::from_vars(&vars);
        assert_eq!(
            config.script_paths.get("PKG_INSTALLER_SCRIPT"),
            Some(&PathBuf::from("/opt/shree/pkgInstaller.sh"))
        );
        assert_eq!(config.script_paths.len(), 1);
    }

    #[test]
    fn empty_values_are_ignored() {
        let vars = HashMap::from([
            ("GIT_UTILS_SCRIPT".to_string(), String::new()),
            ("SHREE_HISTORY_FILE".to_string(), String::new()),
        ]);
        let config = Config::from_vars(&vars);
        assert!(config.script_paths.is_empty());
        assert_eq!(config.history_path, default_history_path());
    }

    #[test]
    fn timing_knobs_parse_from_env() {
        let vars = HashMap::from([
            ("SHREE_GRACE_WINDOW_MS".to_string(), "250".to_string()),
            ("SHREE_SCRIPT_TIMEOUT_SECS".to_string(), "30".to_string()),
        ]);
        let config = Config::from_vars(&vars);
        assert_eq!(config.grace_window, Duration::from_millis(250));
        assert_eq!(config.script_timeout, Duration::from_secs(30));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_vars(&HashMap::new());
        assert_eq!(config.grace_window, DEFAULT_GRACE_WINDOW);
        assert_eq!(config.script_timeout, DEFAULT_SCRIPT_TIMEOUT);
        assert!(config.script_paths.is_empty());
    }

    #[test]
    fn unparsable_timing_falls_back_to_default() {
        let vars = HashMap::from([("SHREE_GRACE_WINDOW_MS".to_string(), "soon".to_string())]);
        let config = Config::from_vars(&vars);
        assert_eq!(config.grace_window, DEFAULT_GRACE_WINDOW);
    }
}
