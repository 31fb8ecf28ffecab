//! Per-day completion counts for the activity chart.
//!
//! Tasks are bucketed by the local calendar day of `created_at`, where "local"
//! is the offset carried by the reference `now`.

use crate::model::{Task, TaskStatus};
use time::{Date, Duration, OffsetDateTime};

/// Number of days covered by the weekly chart, today included.
pub const ACTIVITY_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub date: Date,
    pub label: String,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub total: usize,
    pub is_today: bool,
}

impl DayBucket {
    fn empty(date: Date, today: Date) -> Self {
        Self {
            date,
            label: short_weekday(date),
            completed: 0,
            in_progress: 0,
            not_started: 0,
            total: 0,
            is_today: date == today,
        }
    }

    fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::NotStarted => self.not_started += 1,
        }
        self.total += 1;
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Completed => self.completed,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::NotStarted => self.not_started,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityWeek {
    pub buckets: Vec<DayBucket>,
}

impl ActivityWeek {
    /// Largest bucket total, never below 1 so it can be used as a divisor.
    pub fn max_total(&self) -> usize {
        self.buckets
            .iter()
            .map(|bucket| bucket.total)
            .max()
            .unwrap_or(0)
            .max(1)
    }

    pub fn today(&self) -> Option<&DayBucket> {
        self.buckets.iter().find(|bucket| bucket.is_today)
    }
}

/// Buckets for the six days before today and today itself, oldest first.
pub fn weekly_activity(tasks: &[Task], now: OffsetDateTime) -> ActivityWeek {
    let today = now.date();
    let mut buckets: Vec<DayBucket> = (0..ACTIVITY_DAYS as i64)
        .rev()
        .map(|days_back| DayBucket::empty(today.saturating_sub(Duration::days(days_back)), today))
        .collect();

    for task in tasks {
        let Some(created) = local_day(task.created_at, now) else {
            continue;
        };
        if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.date == created) {
            bucket.record(task.status);
        }
    }

    ActivityWeek { buckets }
}

/// Counts for tasks created on the current local day.
pub fn today_activity(tasks: &[Task], now: OffsetDateTime) -> DayBucket {
    let today = now.date();
    let mut bucket = DayBucket::empty(today, today);
    for task in tasks {
        if local_day(task.created_at, now) == Some(today) {
            bucket.record(task.status);
        }
    }
    bucket
}

/// Calendar day of `instant` in the offset of `now`.
pub(crate) fn local_day(instant: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<Date> {
    instant.map(|value| value.to_offset(now.offset()).date())
}

pub(crate) fn short_weekday(date: Date) -> String {
    date.weekday().to_string().chars().take(3).collect()
}
