use crate::model::{Task, TaskStatus};
use time::{Date, UtcOffset};

/// Criteria of the task board. Empty criteria match every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub search: String,
    pub date: Option<Date>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task, local_offset: UtcOffset) -> bool {
        self.matches_search(task)
            && self.matches_date(task, local_offset)
            && self.matches_status(task)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle)
            || task
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }

    fn matches_date(&self, task: &Task, local_offset: UtcOffset) -> bool {
        match self.date {
            Some(date) => task
                .due_date
                .is_some_and(|due| due.to_offset(local_offset).date() == date),
            None => true,
        }
    }

    fn matches_status(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
    }
}

pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    filter: &TaskFilter,
    local_offset: UtcOffset,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task, local_offset))
        .collect()
}

/// Share of tasks whose completion flag is set, in percent.
pub fn completion_progress(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|task| task.is_complete).count();
    completed as f64 / tasks.len() as f64 * 100.0
}
