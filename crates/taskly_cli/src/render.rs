//! Plain-text tables and JSON payloads for the core view models.

use serde_json::{Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskly_core::activity::{ActivityWeek, DayBucket};
use taskly_core::chart::{BarGeometry, pie_slices};
use taskly_core::config::Palette;
use taskly_core::model::Task;
use taskly_core::schedule::{PlacedEvent, ScheduleDay, ViewMode, format_hour_label, time_slots};
use taskly_core::suggest::Suggestion;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

const BAR_WIDTH: f64 = 20.0;

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Completed")]
    completed: usize,
    #[tabled(rename = "In Progress")]
    in_progress: usize,
    #[tabled(rename = "Not Started")]
    not_started: usize,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Activity")]
    bar: String,
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Top %")]
    top: String,
    #[tabled(rename = "Grid")]
    grid: &'static str,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Hour")]
    hour: String,
    #[tabled(rename = "Tasks")]
    tasks: String,
}

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Done")]
    done: &'static str,
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn text_bar(geometry: &BarGeometry) -> String {
    let cells = |percent: f64| (percent / 100.0 * BAR_WIDTH).round() as usize;
    format!(
        "{}{}{}",
        "#".repeat(cells(geometry.completed_percent)),
        "+".repeat(cells(geometry.in_progress_percent)),
        ".".repeat(cells(geometry.not_started_percent)),
    )
}

pub fn activity_plain(week: &ActivityWeek, palette: &Palette) -> String {
    let max_total = week.max_total();
    let rows: Vec<ActivityRow> = week
        .buckets
        .iter()
        .map(|bucket| ActivityRow {
            day: if bucket.is_today {
                format!("{} *", bucket.label)
            } else {
                bucket.label.clone()
            },
            date: bucket.date.to_string(),
            completed: bucket.completed,
            in_progress: bucket.in_progress,
            not_started: bucket.not_started,
            total: bucket.total,
            bar: text_bar(&BarGeometry::for_bucket(bucket, max_total)),
        })
        .collect();

    format!(
        "{}\n{}\n# completed  + in progress  . not started",
        palette.accentize("Activity"),
        table(rows)
    )
}

pub fn activity_json(week: &ActivityWeek) -> Value {
    let max_total = week.max_total();
    let days: Vec<Value> = week
        .buckets
        .iter()
        .map(|bucket| {
            let bar = BarGeometry::for_bucket(bucket, max_total);
            let mut value = bucket_json(bucket);
            value["bar"] = json!({
                "height_percent": bar.height_percent,
                "completed_percent": bar.completed_percent,
                "in_progress_percent": bar.in_progress_percent,
                "not_started_percent": bar.not_started_percent,
            });
            value
        })
        .collect();
    json!({ "max_total": max_total, "days": days })
}

pub fn today_plain(summary: &DayBucket, palette: &Palette) -> String {
    let mut lines = vec![palette.accentize(&format!("Today ({})", summary.date))];
    for slice in pie_slices(summary) {
        let label = format!(
            "{}: {} ({:.1}%)",
            slice.status.display_name(),
            slice.count,
            slice.percent
        );
        lines.push(format!("  {}", palette.status(slice.status, &label)));
    }
    lines.push(format!("  Total: {}", summary.total));
    lines.join("\n")
}

pub fn today_json(summary: &DayBucket) -> Value {
    let slices: Vec<Value> = pie_slices(summary)
        .iter()
        .map(|slice| {
            json!({
                "status": slice.status.label(),
                "count": slice.count,
                "percent": slice.percent,
                "start_angle": slice.start_angle,
                "end_angle": slice.end_angle,
                "large_arc": slice.large_arc,
                "path": slice.svg_path(),
            })
        })
        .collect();
    let mut value = bucket_json(summary);
    value["slices"] = Value::Array(slices);
    value
}

fn bucket_json(bucket: &DayBucket) -> Value {
    json!({
        "date": bucket.date.to_string(),
        "label": bucket.label,
        "completed": bucket.completed,
        "in_progress": bucket.in_progress,
        "not_started": bucket.not_started,
        "total": bucket.total,
        "is_today": bucket.is_today,
    })
}

pub fn schedule_plain(days: &[ScheduleDay<'_>], mode: ViewMode, palette: &Palette) -> String {
    let mut sections = Vec::with_capacity(days.len());
    for day in days {
        let marker = if day.is_today { " (today)" } else { "" };
        let header = palette.accentize(&format!(
            "{} {} {}{}",
            day.day_name, day.day_number, day.date, marker
        ));
        let events = day.place_events();
        if events.is_empty() {
            sections.push(format!("{header}\n  no tasks"));
            continue;
        }
        let rows: Vec<EventRow> = events.iter().map(event_row).collect();
        if mode == ViewMode::Day {
            sections.push(format!("{header}\n{}\n{}", table(rows), day_grid(&events)));
        } else {
            sections.push(format!("{header}\n{}", table(rows)));
        }
    }
    format!("{} view\n\n{}", mode, sections.join("\n\n"))
}

/// One row per grid hour with the events starting in it.
fn day_grid(events: &[PlacedEvent<'_>]) -> String {
    let rows: Vec<SlotRow> = time_slots()
        .map(|hour| SlotRow {
            hour: format_hour_label(hour),
            tasks: events
                .iter()
                .filter(|event| event.hour == hour)
                .map(|event| event.task.title.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    table(rows)
}

fn event_row(event: &PlacedEvent<'_>) -> EventRow {
    EventRow {
        time: event.time_label(),
        title: event.task.title.clone(),
        status: event.task.status.display_name().to_string(),
        top: format!("{:.1}", event.top_position_percent),
        grid: if event.in_view { "" } else { "outside" },
    }
}

pub fn schedule_json(days: &[ScheduleDay<'_>], mode: ViewMode) -> Value {
    let days: Vec<Value> = days
        .iter()
        .map(|day| {
            let events: Vec<Value> = day
                .place_events()
                .iter()
                .map(|event| {
                    json!({
                        "id": event.task.id,
                        "title": event.task.title,
                        "description": event.task.description,
                        "status": event.task.status.label(),
                        "hour": event.hour,
                        "minute": event.minute,
                        "time": event.time_label(),
                        "top_position_percent": event.top_position_percent,
                        "height_percent": event.height_percent,
                        "in_view": event.in_view,
                    })
                })
                .collect();
            json!({
                "date": day.date.to_string(),
                "day_name": day.day_name,
                "day_number": day.day_number,
                "is_today": day.is_today,
                "events": events,
            })
        })
        .collect();
    json!({ "view": mode.label(), "days": days })
}

fn due_label(task: &Task, local_offset: UtcOffset) -> Option<String> {
    task.due_date
        .and_then(|due| due.to_offset(local_offset).format(&Rfc3339).ok())
}

pub fn board_plain(tasks: &[&Task], progress: f64, local_offset: UtcOffset) -> String {
    let rows: Vec<BoardRow> = tasks
        .iter()
        .map(|task| BoardRow {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status.display_name(),
            due: due_label(task, local_offset).unwrap_or_else(|| "-".to_string()),
            done: if task.is_complete { "yes" } else { "" },
        })
        .collect();
    format!("{}\nProgress: {}%", table(rows), progress.round())
}

pub fn board_json(tasks: &[&Task], progress: f64, local_offset: UtcOffset) -> Value {
    let tasks: Vec<Value> = tasks
        .iter()
        .map(|task| {
            json!({
                "id": task.id,
                "title": task.title,
                "description": task.description,
                "status": task.status.label(),
                "is_complete": task.is_complete,
                "due_date": due_label(task, local_offset),
            })
        })
        .collect();
    json!({ "progress": progress, "tasks": tasks })
}

pub fn suggestions_plain(suggestions: &[Suggestion]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| {
            if suggestion.description.is_empty() {
                format!("{}. {}", index + 1, suggestion.title)
            } else {
                format!(
                    "{}. {}\n   {}",
                    index + 1,
                    suggestion.title,
                    suggestion.description
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn suggestions_json(suggestions: &[Suggestion]) -> Value {
    Value::Array(
        suggestions
            .iter()
            .map(|suggestion| {
                json!({
                    "title": suggestion.title,
                    "description": suggestion.description,
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::{
        activity_json, schedule_json, schedule_plain, suggestions_plain, text_bar, today_json,
    };
    use taskly_core::activity::{today_activity, weekly_activity};
    use taskly_core::chart::BarGeometry;
    use taskly_core::config::palette_for_theme;
    use taskly_core::model::{Task, TaskStatus};
    use taskly_core::schedule::{ViewMode, build_schedule};
    use taskly_core::suggest::Suggestion;
    use time::macros::datetime;

    fn sample() -> Vec<Task> {
        vec![
            Task {
                id: "1".to_string(),
                title: "A".to_string(),
                description: None,
                status: TaskStatus::Completed,
                is_complete: true,
                due_date: Some(datetime!(2024-01-01 00:00 UTC)),
                created_at: Some(datetime!(2024-01-01 08:00 UTC)),
            },
            Task {
                id: "2".to_string(),
                title: "B".to_string(),
                description: Some("second".to_string()),
                status: TaskStatus::NotStarted,
                is_complete: false,
                due_date: Some(datetime!(2024-01-01 00:00 UTC)),
                created_at: Some(datetime!(2024-01-01 09:00 UTC)),
            },
        ]
    }

    #[test]
    fn activity_json_reports_bars_against_max() {
        let tasks = sample();
        let week = weekly_activity(&tasks, datetime!(2024-01-01 12:00 UTC));
        let value = activity_json(&week);

        assert_eq!(value["max_total"], 2);
        assert_eq!(value["days"].as_array().unwrap().len(), 7);
        assert_eq!(value["days"][6]["total"], 2);
        assert_eq!(value["days"][6]["bar"]["height_percent"], 100.0);
        assert_eq!(value["days"][0]["bar"]["height_percent"], 0.0);
    }

    #[test]
    fn today_json_lists_pie_slices() {
        let tasks = sample();
        let summary = today_activity(&tasks, datetime!(2024-01-01 12:00 UTC));
        let value = today_json(&summary);

        assert_eq!(value["total"], 2);
        assert_eq!(value["slices"].as_array().unwrap().len(), 2);
        assert_eq!(value["slices"][0]["status"], "completed");
        assert_eq!(value["slices"][1]["status"], "not_started");
    }

    #[test]
    fn schedule_json_contains_inferred_times() {
        let tasks = sample();
        let selected = datetime!(2024-01-01 12:00 UTC);
        let days = build_schedule(&tasks, selected, ViewMode::Day, selected, false);
        let value = schedule_json(&days, ViewMode::Day);

        assert_eq!(value["view"], "day");
        assert_eq!(value["days"][0]["events"][0]["time"], "9:00 AM");
        assert_eq!(value["days"][0]["events"][1]["hour"], 13);
        assert_eq!(value["days"][0]["events"][1]["description"], "second");
    }

    #[test]
    fn day_view_plain_draws_the_hour_grid() {
        let tasks = sample();
        let selected = datetime!(2024-01-01 12:00 UTC);
        let days = build_schedule(&tasks, selected, ViewMode::Day, selected, true);
        let rendered = schedule_plain(&days, ViewMode::Day, &palette_for_theme(None));

        assert!(rendered.starts_with("day view"));
        assert!(rendered.contains("Mon 1 2024-01-01 (today)"));
        assert!(rendered.contains("6 AM"));
        assert!(rendered.contains("10 PM"));
        assert!(!rendered.contains("11 PM"));
    }

    #[test]
    fn text_bar_draws_each_status() {
        let geometry = BarGeometry {
            height_percent: 100.0,
            completed_percent: 50.0,
            in_progress_percent: 25.0,
            not_started_percent: 25.0,
        };
        assert_eq!(text_bar(&geometry), "##########+++++.....");
    }

    #[test]
    fn suggestions_plain_numbers_entries() {
        let rendered = suggestions_plain(&[
            Suggestion {
                title: "Stretch".to_string(),
                description: "Ten minutes.".to_string(),
            },
            Suggestion {
                title: "Run".to_string(),
                description: String::new(),
            },
        ]);
        assert_eq!(rendered, "1. Stretch\n   Ten minutes.\n2. Run");
    }
}
