//! Static action registry: logical command names mapped to launchable
//! applications, website entries, or configured helper scripts.

use std::collections::HashMap;

/// A logical application name with its ordered executable candidates.
///
/// Order is significant: the first candidate present on the system wins,
/// even when a later one is also installed.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationAlias {
    pub name: String,
    pub candidates: Vec<String>,
}

/// A website with a base URL and a search template containing the
/// `{query}` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct WebsiteEntry {
    pub name: String,
    pub base_url: String,
    pub query_template: String,
}

/// A helper script action. The on-disk path is looked up at dispatch time
/// under `config_key`; `args` are the fixed leading arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEntry {
    pub name: String,
    pub config_key: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
enum Slot {
    App(ApplicationAlias),
    Site(WebsiteEntry),
    Script(ScriptEntry),
}

/// Result of a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action<'a> {
    App(&'a ApplicationAlias),
    Website(&'a WebsiteEntry),
    Script(&'a ScriptEntry),
}

/// Read-only table of every command the assistant knows. Built once at
/// startup; lookups are case-insensitive.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application alias. `candidates` must be non-empty.
    pub fn register_app(&mut self, name: &str, candidates: &[&str]) {
        debug_assert!(!candidates.is_empty(), "alias '{name}' has no candidates");
        self.insert(
            name,
            Slot::App(ApplicationAlias {
                name: name.to_lowercase(),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            }),
        );
    }

    /// Register a website entry. `query_template` should contain the
    /// `{query}` placeholder.
    pub fn register_site(&mut self, name: &str, base_url: &str, query_template: &str) {
        self.insert(
            name,
            Slot::Site(WebsiteEntry {
                name: name.to_lowercase(),
                base_url: base_url.to_string(),
                query_template: query_template.to_string(),
            }),
        );
    }

    /// Register a helper-script action.
    pub fn register_script(&mut self, name: &str, config_key: &str, args: &[&str]) {
        self.insert(
            name,
            Slot::Script(ScriptEntry {
                name: name.to_lowercase(),
                config_key: config_key.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            }),
        );
    }

    /// Map an additional lookup name onto an already-registered entry.
    pub fn alias(&mut self, alias: &str, existing: &str) {
        if let Some(&slot) = self.index.get(&existing.trim().to_lowercase()) {
            self.index.insert(alias.trim().to_lowercase(), slot);
        } else {
            debug_assert!(false, "alias target '{existing}' is not registered");
        }
    }

    fn insert(&mut self, name: &str, slot: Slot) {
        self.slots.push(slot);
        self.index
            .insert(name.trim().to_lowercase(), self.slots.len() - 1);
    }

    /// Case-insensitive lookup of a normalized command key.
    pub fn lookup(&self, name: &str) -> Option<Action<'_>> {
        let key = name.trim().to_lowercase();
        let slot = &self.slots[*self.index.get(&key)?];
        Some(match slot {
            Slot::App(alias) => Action::App(alias),
            Slot::Site(entry) => Action::Website(entry),
            Slot::Script(entry) => Action::Script(entry),
        })
    }

    /// Every lookup name in the table, including aliases. Used by the
    /// intent parser as its phrase vocabulary.
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|k| k.as_str())
    }

    /// The full built-in command table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        // Local applications, most-preferred candidate first.
        registry.register_app(
            "terminal",
            &["gnome-terminal", "konsole", "xfce4-terminal", "x-terminal-emulator"],
        );
        registry.register_app(
            "settings",
            &[
                "gnome-control-center",
                "unity-control-center",
                "systemsettings5",
                "xfce4-settings-manager",
            ],
        );
        registry.alias("system settings", "settings");
        registry.register_app("file manager", &["nautilus", "dolphin", "thunar", "pcmanfm"]);
        registry.alias("files", "file manager");
        registry.register_app("text editor", &["gedit", "kate", "mousepad"]);
        registry.alias("editor", "text editor");
        registry.register_app("browser", &["firefox", "chromium", "google-chrome"]);
        registry.register_app("calculator", &["gnome-calculator", "kcalc", "galculator"]);

        // Websites with query injection.
        registry.register_site(
            "google",
            "https://www.google.com",
            "https://www.google.com/search?q={query}",
        );
        registry.register_site(
            "youtube",
            "https://www.youtube.com",
            "https://www.youtube.com/results?search_query={query}",
        );
        registry.register_site(
            "github",
            "https://github.com",
            "https://github.com/search?q={query}",
        );
        registry.register_site(
            "gitlab",
            "https://gitlab.com",
            "https://gitlab.com/search?search={query}",
        );
        registry.register_site(
            "wikipedia",
            "https://en.wikipedia.org",
            "https://en.wikipedia.org/wiki/Special:Search?search={query}",
        );

        // Helper scripts. Paths are resolved from configuration at
        // dispatch time; the keys match the .env variables.
        const PKG: &str = "PKG_INSTALLER_SCRIPT";
        const GIT: &str = "GIT_UTILS_SCRIPT";
        const KAFKA: &str = "KAFKA_UTILS_SCRIPT";

        for package in [
            "git",
            "jdk",
            "vs code",
            "android studio",
            "neovim",
            "neofetch",
            "snap",
            "wireshark",
            "kafka",
        ] {
            // Package tokens as the installer script expects them:
            // "vs code" is "vscode", multi-word names use underscores.
            let arg = match package {
                "vs code" => "vscode".to_string(),
                _ => package.replace(' ', "_"),
            };
            registry.register_script(&format!("install {package}"), PKG, &["install", arg.as_str()]);
            registry.register_script(
                &format!("uninstall {package}"),
                PKG,
                &["uninstall", arg.as_str()],
            );
        }
        registry.alias("install java", "install jdk");
        registry.alias("uninstall java", "uninstall jdk");
        registry.alias("install visual studio code", "install vs code");
        registry.alias("uninstall visual studio code", "uninstall vs code");
        registry.alias("install snapd", "install snap");
        registry.alias("uninstall snapd", "uninstall snap");
        registry.alias("install apache kafka", "install kafka");
        registry.alias("uninstall apache kafka", "uninstall kafka");

        registry.register_script("check git config", GIT, &["check_config"]);
        registry.alias("check git configuration", "check git config");
        registry.register_script("generate ssh key", GIT, &["gen_ssh"]);
        registry.alias("create ssh key", "generate ssh key");
        registry.register_script("show ssh key", GIT, &["display_ssh"]);
        registry.alias("display ssh key", "show ssh key");
        registry.register_script("guide github connection", GIT, &["guide_github"]);
        registry.alias("github ssh guide", "guide github connection");
        registry.register_script("check github connection", GIT, &["check_conn"]);
        registry.alias("check ssh connection", "check github connection");
        registry.register_script("do github connection", GIT, &["do_github_connection_flow"]);
        registry.alias("set up git", "do github connection");
        registry.alias("setup git configuration", "do github connection");

        registry.register_script("start kafka", KAFKA, &["start"]);
        registry.alias("run kafka", "start kafka");

        registry
    }
}
