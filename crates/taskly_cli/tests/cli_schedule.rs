use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskly-{nanos}-{file_name}"))
}

fn write_snapshot(file_name: &str) -> PathBuf {
    let path = temp_path(file_name);
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            { "id": "a", "title": "standup notes", "due_date": "2024-01-03T14:30:00Z" },
            { "id": "b", "title": "pay rent", "due_date": "2024-01-04" },
            { "id": "c", "title": "call plumber", "due_date": "2024-01-04T00:00:00Z" },
            { "id": "d", "title": "early run", "due_date": "2024-01-05T05:00:00Z" },
            { "id": "e", "title": "next week", "due_date": "2024-01-10T09:00:00Z" },
            { "id": "f", "title": "someday" }
        ]
    });
    std::fs::write(&path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
    path
}

fn run_schedule(args: &[&str], tasks_path: &PathBuf) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_taskly");
    Command::new(exe)
        .args(["--json", "--now", "2024-01-03T10:00:00Z", "--tasks"])
        .arg(tasks_path)
        .arg("schedule")
        .args(args)
        .env("TASKLY_CONFIG_PATH", temp_path("schedule-config.json"))
        .output()
        .expect("failed to run schedule command")
}

fn schedule_json(args: &[&str], file_name: &str) -> serde_json::Value {
    let tasks_path = write_snapshot(file_name);
    let output = run_schedule(args, &tasks_path);
    std::fs::remove_file(&tasks_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("json output")
}

#[test]
fn week_view_starts_on_sunday_and_places_events() {
    let parsed = schedule_json(&[], "schedule-week.json");

    assert_eq!(parsed["view"], "week");
    let days = parsed["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2023-12-31");
    assert_eq!(days[0]["day_name"], "Sunday");
    assert_eq!(days[3]["is_today"], true);

    let event = &days[3]["events"][0];
    assert_eq!(event["id"], "a");
    assert_eq!(event["hour"], 14);
    assert_eq!(event["minute"], 30);
    assert_eq!(event["time"], "2:30 PM");
    assert_eq!(event["top_position_percent"], 50.0);
    assert_eq!(event["in_view"], true);
}

#[test]
fn date_only_tasks_spread_over_working_hours() {
    let parsed = schedule_json(&["--view", "day", "--date", "2024-01-04"], "schedule-day.json");

    assert_eq!(parsed["view"], "day");
    let days = parsed["days"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["is_today"], false);

    let events = days[0]["events"].as_array().unwrap();
    let hours: Vec<u64> = events
        .iter()
        .map(|event| event["hour"].as_u64().unwrap())
        .collect();
    assert_eq!(hours, [9, 13]);
    assert_eq!(events[0]["time"], "9:00 AM");
}

#[test]
fn events_outside_the_grid_are_flagged() {
    let parsed = schedule_json(&["--view", "day", "--date", "2024-01-05"], "schedule-early.json");

    let event = &parsed["days"][0]["events"][0];
    assert_eq!(event["hour"], 5);
    assert_eq!(event["in_view"], false);
    assert!(event["top_position_percent"].as_f64().unwrap() < 0.0);
}

#[test]
fn next_moves_by_whole_weeks() {
    let parsed = schedule_json(&["--next", "1"], "schedule-next.json");

    let days = parsed["days"].as_array().unwrap();
    assert_eq!(days[0]["date"], "2024-01-07");
    assert!(days.iter().all(|day| day["is_today"] == false));
    assert_eq!(days[3]["events"][0]["title"], "next week");
}

#[test]
fn prev_in_day_view_moves_one_day() {
    let parsed = schedule_json(&["--view", "day", "--prev", "2"], "schedule-prev.json");

    assert_eq!(parsed["days"][0]["date"], "2024-01-01");
    assert_eq!(parsed["days"][0]["events"].as_array().unwrap().len(), 0);
}

#[test]
fn huge_step_counts_jump_once_and_saturate() {
    let parsed = schedule_json(&["--prev", "4294967295"], "schedule-huge-prev.json");

    let days = parsed["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert!(days.iter().all(|day| day["events"].as_array().unwrap().is_empty()));
    assert!(days[0]["date"].as_str().unwrap().starts_with("-9999"));
}

#[test]
fn compact_override_shortens_day_names() {
    let tasks_path = write_snapshot("schedule-compact.json");
    let output = run_schedule(
        &["--config-override", "compact=true", "--view", "day"],
        &tasks_path,
    );
    std::fs::remove_file(&tasks_path).ok();

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["days"][0]["day_name"], "Wed");
}

#[test]
fn configured_default_view_is_used() {
    let tasks_path = write_snapshot("schedule-config-view.json");
    let config_path = temp_path("schedule-view-config.json");
    std::fs::write(&config_path, r#"{"default_view": "day"}"#).unwrap();

    let exe = env!("CARGO_BIN_EXE_taskly");
    let output = Command::new(exe)
        .args(["--json", "--now", "2024-01-03T10:00:00Z", "--tasks"])
        .arg(&tasks_path)
        .arg("schedule")
        .env("TASKLY_CONFIG_PATH", &config_path)
        .output()
        .expect("failed to run schedule command");
    std::fs::remove_file(&tasks_path).ok();
    std::fs::remove_file(&config_path).ok();

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["view"], "day");
}

#[test]
fn schedule_rejects_unknown_view() {
    let tasks_path = write_snapshot("schedule-bad-view.json");
    let output = run_schedule(&["--view", "month"], &tasks_path);
    std::fs::remove_file(&tasks_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown view 'month'"));
}

#[test]
fn schedule_rejects_invalid_date() {
    let tasks_path = write_snapshot("schedule-bad-date.json");
    let output = run_schedule(&["--date", "04/01/2024"], &tasks_path);
    std::fs::remove_file(&tasks_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn prev_and_next_conflict() {
    let tasks_path = write_snapshot("schedule-conflict.json");
    let output = run_schedule(&["--prev", "1", "--next", "1"], &tasks_path);
    std::fs::remove_file(&tasks_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
