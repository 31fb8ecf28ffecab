use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use std::path::PathBuf;
use taskly_cli::cli::{Cli, Command, SessionCommand, SessionLine, ViewState, collect_overrides};
use taskly_cli::render;
use taskly_core::activity::{today_activity, weekly_activity};
use taskly_core::board::{TaskFilter, completion_progress, filter_tasks};
use taskly_core::config::{Config, load_config_with_fallback, merge_overrides};
use taskly_core::error::AppError;
use taskly_core::model::{Task, TaskStatus};
use taskly_core::schedule::{self, ViewMode, build_schedule};
use taskly_core::storage::json_store;
use taskly_core::suggest::{OfflineProvider, SuggestionProvider, suggest_tasks};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Everything a command needs besides its own arguments.
struct Context {
    json: bool,
    tasks_path: Option<PathBuf>,
    /// Reference instant given with `--now`; the system clock otherwise.
    pinned_now: Option<OffsetDateTime>,
    local_offset: UtcOffset,
    config: Config,
}

impl Context {
    fn from_cli(cli: &Cli) -> Result<Self, AppError> {
        let pinned_now = cli
            .now
            .as_deref()
            .map(|raw| {
                OffsetDateTime::parse(raw.trim(), &Rfc3339)
                    .map_err(|_| AppError::invalid_input("--now must be RFC3339"))
            })
            .transpose()?;
        let local_offset = match pinned_now {
            Some(now) => now.offset(),
            None => UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        };

        let loaded = load_config_with_fallback();
        if let Some(err) = loaded.error.as_ref() {
            tracing::warn!(error = %err, "using default configuration");
        }
        let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
        let config = merge_overrides(&loaded.config, &overrides);

        Ok(Self {
            json: cli.json,
            tasks_path: cli.tasks.clone(),
            pinned_now,
            local_offset,
            config,
        })
    }

    /// Read on every call so a long session does not go stale.
    fn now(&self) -> OffsetDateTime {
        self.pinned_now
            .unwrap_or_else(|| OffsetDateTime::now_utc().to_offset(self.local_offset))
    }

    fn local_offset(&self) -> UtcOffset {
        self.local_offset
    }

    fn load_tasks(&self) -> Result<Vec<Task>, AppError> {
        let path = match self.tasks_path.as_ref() {
            Some(path) => path.clone(),
            None => json_store::snapshot_path()?,
        };
        json_store::load_snapshot(&path, self.local_offset())
    }

    fn emit(&self, plain: impl FnOnce() -> String, json: impl FnOnce() -> serde_json::Value) {
        if self.json {
            println!("{}", json());
        } else {
            println!("{}", plain());
        }
    }

    fn selected_date(&self, raw: Option<&str>) -> Result<OffsetDateTime, AppError> {
        match raw {
            Some(raw) => Ok(parse_date(raw)?.midnight().assume_offset(self.local_offset())),
            None => Ok(self.now()),
        }
    }
}

/// Reads the generator reply from a file instead of calling a remote model.
struct ReplyFile(PathBuf);

impl SuggestionProvider for ReplyFile {
    fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        std::fs::read_to_string(&self.0)
            .map_err(|err| AppError::io(format!("{}: {}", self.0.display(), err)))
    }
}

fn step_count(raw: Option<u32>) -> i32 {
    raw.map_or(0, |steps| i32::try_from(steps).unwrap_or(i32::MAX))
}

fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("date must be YYYY-MM-DD"))
}

fn show_activity(ctx: &Context, tasks: &[Task], today: bool) {
    let palette = ctx.config.palette();
    if today {
        let summary = today_activity(tasks, ctx.now());
        ctx.emit(
            || render::today_plain(&summary, &palette),
            || render::today_json(&summary),
        );
    } else {
        let week = weekly_activity(tasks, ctx.now());
        ctx.emit(
            || render::activity_plain(&week, &palette),
            || render::activity_json(&week),
        );
    }
}

fn show_schedule(ctx: &Context, tasks: &[Task], state: &ViewState) {
    let palette = ctx.config.palette();
    let days = build_schedule(tasks, state.selected, state.mode, ctx.now(), ctx.config.compact);
    ctx.emit(
        || render::schedule_plain(&days, state.mode, &palette),
        || render::schedule_json(&days, state.mode),
    );
}

fn run_command(ctx: &Context, command: Command) -> Result<(), AppError> {
    match command {
        Command::Activity { today } => {
            let tasks = ctx.load_tasks()?;
            show_activity(ctx, &tasks, today);
        }
        Command::Schedule {
            view,
            date,
            prev,
            next,
        } => {
            let mode = match view.as_deref() {
                Some(raw) => raw.parse::<ViewMode>()?,
                None => ctx.config.view_mode(),
            };
            let steps = step_count(next).saturating_sub(step_count(prev));
            let state = ViewState {
                selected: schedule::shift(ctx.selected_date(date.as_deref())?, mode, steps),
                mode,
            };

            let tasks = ctx.load_tasks()?;
            show_schedule(ctx, &tasks, &state);
        }
        Command::Board {
            search,
            date,
            status,
        } => {
            let filter = TaskFilter {
                search: search.unwrap_or_default(),
                date: date.as_deref().map(parse_date).transpose()?,
                status: status
                    .as_deref()
                    .map(|raw| {
                        TaskStatus::parse(raw).ok_or_else(|| {
                            AppError::invalid_input(
                                "status must be not_started, in_progress or completed",
                            )
                        })
                    })
                    .transpose()?,
            };

            let tasks = ctx.load_tasks()?;
            let filtered = filter_tasks(&tasks, &filter, ctx.local_offset());
            let progress = completion_progress(&tasks);
            ctx.emit(
                || render::board_plain(&filtered, progress, ctx.local_offset()),
                || render::board_json(&filtered, progress, ctx.local_offset()),
            );
        }
        Command::Suggest { goal, response } => {
            let suggestions = match response {
                Some(path) => suggest_tasks(&ReplyFile(path), &goal),
                None => suggest_tasks(&OfflineProvider, &goal),
            };
            ctx.emit(
                || render::suggestions_plain(&suggestions),
                || render::suggestions_json(&suggestions),
            );
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_session_help() {
    let mut cmd = SessionLine::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive(ctx: &Context) -> Result<(), AppError> {
    let mut tasks = ctx.load_tasks()?;
    let mut state = ViewState::new(ctx.now(), ctx.config.view_mode());
    show_schedule(ctx, &tasks, &state);

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;
        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_session_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) if !args.is_empty() => args,
            Ok(_) => continue,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let command = match SessionLine::try_parse_from(args) {
            Ok(parsed) => parsed.command,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        match command {
            SessionCommand::Activity { today } => show_activity(ctx, &tasks, today),
            SessionCommand::Reload => match ctx.load_tasks() {
                Ok(reloaded) => {
                    tasks = reloaded;
                    show_schedule(ctx, &tasks, &state);
                }
                Err(err) => eprintln!("ERROR: {}", err),
            },
            other => {
                state.apply(&other, ctx.now());
                show_schedule(ctx, &tasks, &state);
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TASKLY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let ctx = Context::from_cli(&cli)?;
    match cli.command {
        Some(command) => run_command(&ctx, command),
        None => run_interactive(&ctx),
    }
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
