//! Calendar placement of tasks on the hourly day/week grid.

use crate::activity::{local_day, short_weekday};
use crate::error::AppError;
use crate::model::Task;
use std::fmt;
use std::str::FromStr;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// First hour shown on the grid.
pub const GRID_START_HOUR: u8 = 6;
/// Number of one-hour rows on the grid (06:00 to 23:00).
pub const GRID_SLOTS: u8 = 17;

const INFERRED_START_HOUR: f64 = 9.0;
const INFERRED_SPAN_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    Day,
    #[default]
    Week,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    /// Days moved by one previous/next step.
    pub fn step(self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewMode {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(AppError::invalid_input(format!(
                "unknown view '{other}', expected day or week"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDay<'a> {
    pub date: Date,
    pub day_name: String,
    pub day_number: u8,
    pub is_today: bool,
    /// Offset the day was matched in; event times are read in it too.
    pub offset: UtcOffset,
    pub tasks: Vec<&'a Task>,
}

impl<'a> ScheduleDay<'a> {
    /// Positions every task of the day on the grid, in task order.
    pub fn place_events(&self) -> Vec<PlacedEvent<'a>> {
        let count = self.tasks.len();
        self.tasks
            .iter()
            .copied()
            .enumerate()
            .map(|(index, task)| {
                let (hour, minute) = infer_time(task, index, count, self.offset);
                PlacedEvent::new(task, hour, minute)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEvent<'a> {
    pub task: &'a Task,
    pub hour: u8,
    pub minute: u8,
    pub top_position_percent: f64,
    pub height_percent: f64,
    /// False when the event starts before 06:00 or at/after 23:00. The
    /// percentages are left unclamped either way.
    pub in_view: bool,
}

impl<'a> PlacedEvent<'a> {
    fn new(task: &'a Task, hour: u8, minute: u8) -> Self {
        let grid_minutes = f64::from(GRID_SLOTS) * 60.0;
        let offset_minutes =
            (f64::from(hour) - f64::from(GRID_START_HOUR)) * 60.0 + f64::from(minute);
        Self {
            task,
            hour,
            minute,
            top_position_percent: offset_minutes / grid_minutes * 100.0,
            height_percent: 100.0 / f64::from(GRID_SLOTS),
            in_view: (GRID_START_HOUR..GRID_START_HOUR + GRID_SLOTS).contains(&hour),
        }
    }

    pub fn time_label(&self) -> String {
        format_event_time(self.hour, self.minute)
    }
}

/// Builds the visible days for `selected` and places the tasks due on them.
///
/// `now` only decides which day is flagged as today. `compact` switches the
/// day names to their three-letter form.
pub fn build_schedule<'a>(
    tasks: &'a [Task],
    selected: OffsetDateTime,
    mode: ViewMode,
    now: OffsetDateTime,
    compact: bool,
) -> Vec<ScheduleDay<'a>> {
    let today = now.to_offset(selected.offset()).date();
    visible_dates(selected.date(), mode)
        .into_iter()
        .map(|date| ScheduleDay {
            date,
            day_name: if compact {
                short_weekday(date)
            } else {
                date.weekday().to_string()
            },
            day_number: date.day(),
            is_today: date == today,
            offset: selected.offset(),
            tasks: tasks
                .iter()
                .filter(|task| local_day(task.due_date, selected) == Some(date))
                .collect(),
        })
        .collect()
}

/// The selected date alone, or the Sunday-first week containing it.
pub fn visible_dates(selected: Date, mode: ViewMode) -> Vec<Date> {
    match mode {
        ViewMode::Day => vec![selected],
        ViewMode::Week => {
            let offset = i64::from(selected.weekday().number_days_from_sunday());
            let start = selected.saturating_sub(Duration::days(offset));
            (0..7)
                .map(|day| start.saturating_add(Duration::days(day)))
                .collect()
        }
    }
}

/// Display time for the task at `index` among `count` tasks on its day.
///
/// A due time other than local midnight is used as is, read in
/// `local_offset`. Date-only tasks are spread over 09:00-17:00 by position.
pub fn infer_time(task: &Task, index: usize, count: usize, local_offset: UtcOffset) -> (u8, u8) {
    if let Some(due) = task.due_date.map(|due| due.to_offset(local_offset))
        && (due.hour() != 0 || due.minute() != 0)
    {
        return (due.hour(), due.minute());
    }

    let share = index as f64 / count.max(1) as f64;
    let position = INFERRED_START_HOUR + share * INFERRED_SPAN_HOURS;
    (position.floor() as u8, 0)
}

pub fn previous(selected: OffsetDateTime, mode: ViewMode) -> OffsetDateTime {
    shift(selected, mode, -1)
}

pub fn next(selected: OffsetDateTime, mode: ViewMode) -> OffsetDateTime {
    shift(selected, mode, 1)
}

/// Moves `selected` by `steps` days or weeks in one jump; negative steps go
/// back. Saturates at the ends of the supported date range.
pub fn shift(selected: OffsetDateTime, mode: ViewMode, steps: i32) -> OffsetDateTime {
    let span = mode.step().checked_mul(steps).unwrap_or(if steps < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    });
    selected.saturating_add(span)
}

pub fn today(now: OffsetDateTime) -> OffsetDateTime {
    now
}

/// Hours labelled down the side of the grid.
pub fn time_slots() -> impl Iterator<Item = u8> {
    GRID_START_HOUR..GRID_START_HOUR + GRID_SLOTS
}

pub fn format_hour_label(hour: u8) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{hour} AM"),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

pub fn format_event_time(hour: u8, minute: u8) -> String {
    match hour {
        0 => format!("12:{minute:02} AM"),
        1..=11 => format!("{hour}:{minute:02} AM"),
        12 => format!("12:{minute:02} PM"),
        _ => format!("{}:{minute:02} PM", hour - 12),
    }
}
