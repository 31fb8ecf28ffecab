use crate::error::AppError;
use crate::model::{Task, TaskRecord};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use time::UtcOffset;

pub const SCHEMA_VERSION: u32 = 1;
const SNAPSHOT_FILE_NAME: &str = "tasks.json";
const SNAPSHOT_ENV_VAR: &str = "TASKLY_TASKS_PATH";

/// Either the rows exactly as the backend lists them, or a versioned envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Envelope {
        schema_version: u32,
        tasks: Vec<Value>,
    },
    Rows(Vec<Value>),
}

pub fn snapshot_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(SNAPSHOT_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskly")
            .join(SNAPSHOT_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskly")
            .join(SNAPSHOT_FILE_NAME))
    }
}

/// Loads the task snapshot exported from the store.
///
/// A missing file is an empty collection. Rows that do not fit the record
/// shape or fail normalisation are skipped with a warning so one bad row does
/// not hide the rest.
pub fn load_snapshot(path: &Path, local_offset: UtcOffset) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no task snapshot, starting empty");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let rows = parse_snapshot(&content)
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err.message())))?;

    let mut tasks = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let record = match serde_json::from_value::<TaskRecord>(row) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(row = index, error = %err, "skipping malformed task row");
                continue;
            }
        };
        match Task::from_record(record, local_offset) {
            Ok(task) => tasks.push(task),
            Err(err) => tracing::warn!(row = index, error = %err, "skipping task row"),
        }
    }
    tracing::debug!(count = tasks.len(), path = %path.display(), "loaded task snapshot");

    Ok(tasks)
}

fn parse_snapshot(content: &str) -> Result<Vec<Value>, AppError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Snapshot>(content)? {
        Snapshot::Rows(rows) => Ok(rows),
        Snapshot::Envelope {
            schema_version,
            tasks,
        } => {
            if !(1..=SCHEMA_VERSION).contains(&schema_version) {
                return Err(AppError::invalid_data("schema_version mismatch"));
            }
            Ok(tasks)
        }
    }
}
