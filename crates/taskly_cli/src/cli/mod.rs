use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskly_core::config::{ConfigOverrides, canonical_key};
use taskly_core::schedule::{self, ViewMode};
use time::OffsetDateTime;

#[derive(Parser, Debug)]
#[command(name = "taskly", author, version, about, long_about = None)]
pub struct Cli {
    /// Command to run; starts an interactive session when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Task snapshot exported from the store (defaults to TASKLY_TASKS_PATH)
    #[arg(long, value_name = "PATH", global = true)]
    pub tasks: Option<PathBuf>,

    /// Reference instant in RFC 3339; its offset is used as local time
    #[arg(long, value_name = "RFC3339", global = true)]
    pub now: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show task activity for the last seven days
    ///
    /// Example: taskly activity
    /// Example: taskly activity --today
    Activity {
        /// Only today's counts, with the pie chart slices
        #[arg(long)]
        today: bool,
    },
    /// Show tasks placed on the day or week calendar
    ///
    /// Example: taskly schedule --view week --date 2024-01-03
    /// Example: taskly schedule --view day --next 2
    Schedule {
        /// day or week (defaults to the configured view)
        #[arg(long)]
        view: Option<String>,
        /// Selected date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Step back this many days or weeks
        #[arg(long, value_name = "STEPS", conflicts_with = "next")]
        prev: Option<u32>,
        /// Step forward this many days or weeks
        #[arg(long, value_name = "STEPS")]
        next: Option<u32>,
    },
    /// List tasks with the board filters and completion progress
    ///
    /// Example: taskly board --search groceries --status in_progress
    Board {
        #[arg(long)]
        search: Option<String>,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// not_started, in_progress or completed
        #[arg(long)]
        status: Option<String>,
    },
    /// Suggest tasks for a goal
    ///
    /// Example: taskly suggest "learn Spanish" --response reply.txt
    Suggest {
        goal: String,
        /// File holding the text generator's reply
        #[arg(long, value_name = "FILE")]
        response: Option<PathBuf>,
    },
}

/// One line typed into the interactive session.
#[derive(Parser, Debug)]
#[command(name = "taskly", no_binary_name = true, disable_version_flag = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Move back one day or week
    Prev,
    /// Move forward one day or week
    Next,
    /// Jump back to today
    Today,
    /// Switch to the single-day view
    Day,
    /// Switch to the week view
    Week,
    /// Redraw the calendar
    Show,
    /// Show task activity
    Activity {
        #[arg(long)]
        today: bool,
    },
    /// Reload the task snapshot
    Reload,
}

/// Calendar state owned by the session: the selected instant and the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub selected: OffsetDateTime,
    pub mode: ViewMode,
}

impl ViewState {
    pub fn new(now: OffsetDateTime, mode: ViewMode) -> Self {
        Self {
            selected: now,
            mode,
        }
    }

    /// Applies a navigation command. Returns false for commands that leave
    /// the calendar untouched.
    pub fn apply(&mut self, command: &SessionCommand, now: OffsetDateTime) -> bool {
        match command {
            SessionCommand::Prev => self.selected = schedule::previous(self.selected, self.mode),
            SessionCommand::Next => self.selected = schedule::next(self.selected, self.mode),
            SessionCommand::Today => self.selected = schedule::today(now),
            SessionCommand::Day => self.mode = ViewMode::Day,
            SessionCommand::Week => self.mode = ViewMode::Week,
            SessionCommand::Show => {}
            SessionCommand::Activity { .. } | SessionCommand::Reload => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DefaultView,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let key = canonical_key(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match key.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "default_view" | "view" => ConfigOverrideTarget::DefaultView,
        "compact" => ConfigOverrideTarget::Compact,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` value into one set of overrides.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DefaultView => {
                parsed
                    .value
                    .parse::<ViewMode>()
                    .map_err(|err| err.message().to_string())?;
                overrides.default_view = Some(parsed.value);
            }
            ConfigOverrideTarget::Compact => {
                overrides.compact = Some(parse_flag(&parsed.value)?);
            }
        }
    }
    Ok(overrides)
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigOverrideTarget, SessionCommand, SessionLine, ViewState, collect_overrides,
        parse_config_override,
    };
    use clap::Parser;
    use taskly_core::schedule::ViewMode;
    use time::macros::datetime;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" THEME = Midnight ").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::Theme);
        assert_eq!(parsed.value, "Midnight");

        let parsed = parse_config_override("Default-View=day").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::DefaultView);
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown.field=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("themenoir").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn collect_overrides_validates_values() {
        let overrides = collect_overrides(&[
            "theme=dark".to_string(),
            "compact=yes".to_string(),
            "view=Day".to_string(),
        ])
        .unwrap();
        assert_eq!(overrides.theme.as_deref(), Some("dark"));
        assert_eq!(overrides.compact, Some(true));
        assert_eq!(overrides.default_view.as_deref(), Some("Day"));

        let err = collect_overrides(&["compact=maybe".to_string()]).unwrap_err();
        assert!(err.contains("boolean"));
        let err = collect_overrides(&["view=month".to_string()]).unwrap_err();
        assert!(err.contains("unknown view"));
    }

    #[test]
    fn view_state_navigates_by_mode() {
        let now = datetime!(2024-01-03 10:00 UTC);
        let mut state = ViewState::new(now, ViewMode::Week);

        assert!(state.apply(&SessionCommand::Next, now));
        assert_eq!(state.selected, datetime!(2024-01-10 10:00 UTC));

        assert!(state.apply(&SessionCommand::Day, now));
        assert!(state.apply(&SessionCommand::Prev, now));
        assert_eq!(state.selected, datetime!(2024-01-09 10:00 UTC));

        assert!(state.apply(&SessionCommand::Today, now));
        assert_eq!(state.selected, now);
        assert_eq!(state.mode, ViewMode::Day);

        assert!(!state.apply(&SessionCommand::Reload, now));
    }

    #[test]
    fn session_line_parses_without_binary_name() {
        let line = SessionLine::try_parse_from(["activity", "--today"]).unwrap();
        assert_eq!(line.command, SessionCommand::Activity { today: true });

        assert!(SessionLine::try_parse_from(["month"]).is_err());
    }
}
