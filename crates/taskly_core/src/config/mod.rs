use crate::error::AppError;
use crate::model::TaskStatus;
use crate::schedule::ViewMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKLY_CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct Palette {
    pub completed: &'static str,
    pub in_progress: &'static str,
    pub not_started: &'static str,
    pub accent: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn status(&self, status: TaskStatus, text: &str) -> String {
        let color = match status {
            TaskStatus::Completed => self.completed,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::NotStarted => self.not_started,
        };
        self.paint(color, text)
    }

    pub fn accentize(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        // Dashboard colours: emerald, violet, orange.
        Some("noir") => Palette {
            completed: "\x1b[38;5;42m",
            in_progress: "\x1b[38;5;135m",
            not_started: "\x1b[38;5;208m",
            accent: "\x1b[1m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            completed: "\x1b[38;5;64m",
            in_progress: "\x1b[38;5;61m",
            not_started: "\x1b[38;5;166m",
            accent: "\x1b[38;5;33m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            completed: "",
            in_progress: "",
            not_started: "",
            accent: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonical_key(raw).unwrap_or_default();
    match cleaned.as_str() {
        "" | "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases and collapses separators into single underscores.
pub fn canonical_key(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    /// `day` or `week`; week when absent.
    #[serde(default)]
    pub default_view: Option<String>,
    /// Three-letter day names in the schedule.
    #[serde(default)]
    pub compact: bool,
}

impl Config {
    pub fn view_mode(&self) -> ViewMode {
        match self.default_view.as_deref() {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring default_view from config");
                ViewMode::default()
            }),
            None => ViewMode::default(),
        }
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub default_view: Option<String>,
    pub compact: Option<bool>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("taskly").join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskly")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = canonical_theme_name(theme);
    }
    if let Some(view) = overrides.default_view.as_ref() {
        merged.default_view = Some(view.clone());
    }
    if let Some(compact) = overrides.compact {
        merged.compact = compact;
    }
    merged
}
