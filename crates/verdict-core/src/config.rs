use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

pub const PROJECT_CONFIG_PATH: &str = ".verdict/config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub review: ReviewConfig,
}

/// Gates applied before accepted changes are handed off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Refuse to emit changes while any suggestion is unresolved.
    #[serde(default)]
    pub require_all_resolved: bool,
    /// Emit accepted CREATEs even when a required field was not accepted.
    #[serde(default = "default_true")]
    pub allow_missing_required: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            require_all_resolved: false,
            allow_missing_required: default_true(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
}

/// Read `<project_root>/.verdict/config.toml`; defaults when missing.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_CONFIG_PATH);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }
    read_toml(&path)
}

/// Read `<config_dir>/verdict/config.toml`; defaults when missing.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }
    read_toml(&path)
}

#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("verdict/config.toml"))
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str::<T>(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge project and user config and pick the output mode.
///
/// # Errors
///
/// Propagates config read/parse failures.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.as_deref(), env_format.as_deref());

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
    })
}

/// Canonical output mode for a user-supplied name, accepting legacy aliases.
#[must_use]
pub fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "table" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

/// Flag, then `FORMAT`, then user config, then TTY detection.
fn resolve_output(cli_json: bool, user_output: Option<&str>, env_format: Option<&str>) -> String {
    if cli_json {
        return "json".to_string();
    }

    let configured = env_format
        .and_then(normalize_output_mode)
        .or_else(|| user_output.and_then(normalize_output_mode));
    if let Some(mode) = configured {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

const fn default_true() -> bool {
    true
}
