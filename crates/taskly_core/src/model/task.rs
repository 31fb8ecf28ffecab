use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Identifier as delivered by the task store; either text (uuid) or a row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

/// A task row exactly as the external store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_complete: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

/// Keeps string values and drops anything else, so a malformed timestamp
/// leaves the field empty instead of failing the row.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(Some(text)),
        serde_json::Value::Null => Ok(None),
        other => {
            tracing::warn!(value = %other, "ignoring non-text timestamp");
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalised, read-only task as seen by the view-model layer.
///
/// Timestamps are kept as absolute instants; callers compare calendar days
/// after converting to the offset of their reference "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub is_complete: bool,
    pub due_date: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
}

impl Task {
    /// Converts a store record, applying the defaults for absent fields.
    ///
    /// Naive timestamps are read in `local_offset`. A timestamp that cannot be
    /// parsed is dropped, which excludes the task from day matching.
    pub fn from_record(record: TaskRecord, local_offset: UtcOffset) -> Result<Self, AppError> {
        let id = record.id.to_string();
        let title = record.title.trim();
        if title.is_empty() {
            return Err(AppError::invalid_data(format!("task {id} has an empty title")));
        }

        let status = match record.status.as_deref() {
            Some(raw) => TaskStatus::parse(raw).unwrap_or_else(|| {
                tracing::debug!(
                    task_id = %id,
                    status = raw,
                    "unknown status, treating as not_started"
                );
                TaskStatus::NotStarted
            }),
            None => TaskStatus::NotStarted,
        };

        let due_date = lenient_timestamp(&id, "due_date", record.due_date.as_deref(), local_offset);
        let created_at =
            lenient_timestamp(&id, "created_at", record.created_at.as_deref(), local_offset);

        Ok(Self {
            id,
            title: title.to_string(),
            description: record
                .description
                .filter(|description| !description.trim().is_empty()),
            status,
            is_complete: record.is_complete.unwrap_or(false),
            due_date,
            created_at,
        })
    }
}

fn lenient_timestamp(
    task_id: &str,
    field: &str,
    raw: Option<&str>,
    local_offset: UtcOffset,
) -> Option<OffsetDateTime> {
    let raw = raw?;
    let parsed = parse_timestamp(raw, local_offset);
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::warn!(task_id, field, value = raw, "ignoring unparseable timestamp");
    }
    parsed
}

/// Parses the timestamp shapes the store produces.
///
/// Accepts RFC 3339, naive date-times (read in `local_offset`) and bare dates
/// (local midnight). A space is accepted in place of the `T` separator.
pub fn parse_timestamp(raw: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = trimmed.replacen(' ', "T", 1);
    if let Ok(parsed) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Some(parsed.to_offset(local_offset));
    }

    let naive = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        )
    });
    if let Ok(naive) = naive {
        return Some(naive.assume_offset(local_offset));
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_offset(local_offset))
}
