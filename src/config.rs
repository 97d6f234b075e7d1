use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub modules: Modules,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_sentinel")]
    pub deletion_sentinel: String,
    #[serde(default = "default_max_layer_depth")]
    pub max_layer_depth: usize,
    #[serde(default = "default_true")]
    pub banner: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Overrides the platform's default shell keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_shell: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deletion_sentinel: default_sentinel(),
            max_layer_depth: default_max_layer_depth(),
            banner: true,
            log_level: default_log_level(),
            default_shell: None,
        }
    }
}

impl Settings {
    /// The module keyword whose arguments run directly as a program:
    /// `dos` on Windows, `bash` elsewhere, unless configured.
    pub fn shell_keyword(&self) -> &str {
        self.default_shell
            .as_deref()
            .unwrap_or(if cfg!(windows) { "dos" } else { "bash" })
    }

    /// The configured log level; unrecognised names fall back to `info`.
    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

fn default_sentinel() -> String {
    "XXX".into()
}

fn default_max_layer_depth() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".into()
}

/// External programs reachable through module keywords.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Modules {
    #[serde(default)]
    pub programs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvaluatorConfig {
    #[serde(default)]
    pub deny_chars: String,
    #[serde(default)]
    pub falsy: Vec<String>,
    #[serde(default = "default_null_result")]
    pub null_result: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            deny_chars: String::new(),
            falsy: Vec::new(),
            null_result: default_null_result(),
        }
    }
}

fn default_null_result() -> String {
    "NULL".into()
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    modules: ModulesOverlay,
    #[serde(default)]
    evaluator: EvaluatorOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    deletion_sentinel: Option<String>,
    max_layer_depth: Option<usize>,
    banner: Option<bool>,
    log_level: Option<String>,
    default_shell: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ModulesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    programs: BTreeMap<String, String>,
    #[serde(default)]
    remove: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct EvaluatorOverlay {
    #[serde(default)]
    replace: bool,
    deny_chars: Option<String>,
    #[serde(default)]
    falsy: Vec<String>,
    #[serde(default)]
    remove_falsy: Vec<String>,
    null_result: Option<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

/// Merge a user table into a default table.
/// In replace mode: user table replaces default entirely.
/// In merge mode: remove keys first, then insert or override entries.
fn merge_map(
    base: &mut BTreeMap<String, String>,
    add: BTreeMap<String, String>,
    remove: &[String],
    replace: bool,
) {
    if replace {
        *base = add;
    } else {
        base.retain(|key, _| !remove.contains(key));
        base.extend(add);
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/sift/config.toml (if exists)
    ///
    /// Set `replace = true` in a section to replace its defaults entirely.
    /// Use `remove_<field>` lists (or `remove` for modules) to subtract
    /// specific entries from defaults.
    pub fn load() -> Self {
        match std::env::var_os("HOME") {
            Some(home) => Self::load_from(&Path::new(&home).join(".config/sift/config.toml")),
            None => Self::default_config(),
        }
    }

    /// Defaults merged with the overlay at `path`, if it exists and parses.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay(path) {
            config.apply_overlay(overlay);
        }
        config
    }

    fn load_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("sift: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        if let Some(v) = s.deletion_sentinel {
            self.settings.deletion_sentinel = v;
        }
        if let Some(v) = s.max_layer_depth {
            self.settings.max_layer_depth = v;
        }
        if let Some(v) = s.banner {
            self.settings.banner = v;
        }
        if let Some(v) = s.log_level {
            self.settings.log_level = v;
        }
        if let Some(v) = s.default_shell {
            self.settings.default_shell = Some(v);
        }

        // Modules
        let m = overlay.modules;
        merge_map(&mut self.modules.programs, m.programs, &m.remove, m.replace);

        // Evaluator
        let e = overlay.evaluator;
        merge_list(&mut self.evaluator.falsy, e.falsy, &e.remove_falsy, e.replace);
        if let Some(v) = e.deny_chars {
            self.evaluator.deny_chars = v;
        }
        if let Some(v) = e.null_result {
            self.evaluator.null_result = v;
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
