//! Task suggestions from a text-generation provider.
//!
//! The provider itself lives outside this crate; this module builds the prompt,
//! parses the reply and falls back to canned suggestions when it fails.

use crate::error::AppError;

pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
}

pub trait SuggestionProvider {
    fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// Provider used when no generator is configured; always fails so callers
/// receive the fallback list.
pub struct OfflineProvider;

impl SuggestionProvider for OfflineProvider {
    fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::invalid_input("no suggestion provider configured"))
    }
}

pub fn build_prompt(goal: &str) -> String {
    format!(
        "Generate 3-5 distinct, actionable, and relevant to-do tasks for the goal: \"{goal}\".\n\
         For each task, provide a concise title (under 10 words) and a 1-2 line description.\n\
         Format the output as a numbered list, where each item has a 'Title:' and 'Description:' field.\n\
         Example:\n\
         1. Title: Task Title 1\n   Description: This is a short description for task 1.\n\
         2. Title: Task Title 2\n   Description: This is a short description for task 2.\n"
    )
}

/// Reads blank-line separated blocks with `Title:` and `Description:` fields.
pub fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    text.split("\n\n")
        .filter_map(|block| {
            let title = field_value(block, "Title:")?;
            if title.is_empty() {
                return None;
            }
            Some(Suggestion {
                title,
                description: field_value(block, "Description:").unwrap_or_default(),
            })
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn field_value(block: &str, marker: &str) -> Option<String> {
    let start = block.find(marker)? + marker.len();
    let rest = &block[start..];
    let line = rest.split('\n').next().unwrap_or_default();
    Some(line.trim().to_string())
}

pub fn fallback_suggestions(goal: &str) -> Vec<Suggestion> {
    [
        format!("Research about {goal}"),
        format!("Create a plan for {goal}"),
        format!("Do one {goal}-related task today"),
        format!("Track your {goal} progress"),
        format!("Review what you learned about {goal}"),
    ]
    .into_iter()
    .map(|title| Suggestion {
        title,
        description: String::new(),
    })
    .collect()
}

pub fn suggest_tasks(provider: &dyn SuggestionProvider, goal: &str) -> Vec<Suggestion> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Vec::new();
    }

    match provider.generate(&build_prompt(goal)) {
        Ok(reply) => parse_suggestions(&reply),
        Err(err) => {
            tracing::warn!(error = %err, "suggestion provider failed, using fallback tasks");
            fallback_suggestions(goal)
        }
    }
}
