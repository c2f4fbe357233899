use codescope_extractor::BudgetConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Exclusions applied when the user does not override them.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git/**",
    ".venv/**",
    "__pycache__/**",
    "node_modules/**",
    "dist/**",
    "build/**",
];

/// Effective configuration: defaults, overridden by `.codescope.toml`,
/// overridden by `CODESCOPE_*` environment variables, overridden by CLI
/// flags. Invalid values fall back instead of aborting.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_chars: usize,
    pub include_private: bool,
    pub max_functions_per_module: usize,
    pub excludes: Vec<String>,
    /// The config file that was actually read, if any.
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let defaults = BudgetConfig::default();
        Self {
            max_chars: defaults.max_chars,
            include_private: defaults.include_private,
            max_functions_per_module: defaults.max_funcs_per_module,
            excludes: DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
            source_path: None,
        }
    }
}

impl Config {
    pub fn budget(&self) -> BudgetConfig {
        BudgetConfig {
            max_chars: self.max_chars,
            max_funcs_per_module: self.max_functions_per_module,
            include_private: self.include_private,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    max_chars: Option<usize>,
    include_private: Option<bool>,
    max_functions_per_module: Option<usize>,
    excludes: Option<Vec<String>>,
}

/// Load configuration with precedence: built-in defaults, then the file at
/// `explicit` (or `<cwd>/.codescope.toml` if present), then environment
/// variables.
pub fn load_config(cwd: &Path, explicit: Option<&Path>) -> Config {
    let mut config = Config::default();

    let candidate = explicit.map(Path::to_path_buf).or_else(|| {
        let project = cwd.join(".codescope.toml");
        project.exists().then_some(project)
    });
    if let Some(path) = candidate {
        match read_file_config(&path) {
            Some(file) => {
                apply_file(&mut config, file);
                config.source_path = Some(path);
            }
            None => log::warn!("ignoring unreadable or malformed config {}", path.display()),
        }
    }

    apply_env(&mut config);
    config
}

fn read_file_config(path: &Path) -> Option<FileConfig> {
    let raw = std::fs::read_to_string(path).ok()?;
    toml::from_str(&raw).ok()
}

fn apply_file(config: &mut Config, file: FileConfig) {
    if let Some(v) = file.max_chars {
        config.max_chars = v;
    }
    if let Some(v) = file.include_private {
        config.include_private = v;
    }
    if let Some(v) = file.max_functions_per_module {
        config.max_functions_per_module = v;
    }
    if let Some(v) = file.excludes {
        config.excludes = v;
    }
}

fn apply_env(config: &mut Config) {
    if let Some(v) = parse_usize(std::env::var("CODESCOPE_MAX_CHARS").ok().as_deref()) {
        config.max_chars = v;
    }
    if let Some(v) = parse_bool(std::env::var("CODESCOPE_INCLUDE_PRIVATE").ok().as_deref()) {
        config.include_private = v;
    }
    if let Some(v) = parse_usize(
        std::env::var("CODESCOPE_MAX_FUNCS_PER_MODULE")
            .ok()
            .as_deref(),
    ) {
        config.max_functions_per_module = v;
    }
}

fn parse_usize(raw: Option<&str>) -> Option<usize> {
    raw.map(str::trim).filter(|v| !v.is_empty())?.parse().ok()
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim)?.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
