use serde::{Deserialize, Serialize};

use super::Record;

/// A to-do item in the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store id; not part of the stored body.
    #[serde(skip)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Due date as entered, e.g. `2026-11-02`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            category: None,
            due: None,
            completed: false,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_due(mut self, due: Option<String>) -> Self {
        self.due = due;
        self
    }
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// One-paragraph description of task progress, used as generation input.
pub fn progress_summary(tasks: &[Task]) -> String {
    let done = tasks.iter().filter(|t| t.completed).count();
    let mut summary = format!("{done} of {} tasks completed.", tasks.len());

    let open: Vec<&str> = tasks
        .iter()
        .filter(|t| !t.completed)
        .map(|t| t.title.as_str())
        .collect();
    if !open.is_empty() {
        summary.push_str(" Still open: ");
        summary.push_str(&open.join("; "));
        summary.push('.');
    }
    summary
}
