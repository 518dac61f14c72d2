use crate::generation::{Feature, GenerationError};
use crate::models::{Resource, Task};

/// Everything that can change [`super::AppState`]: user intents, results of
/// commands, and store snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetNote(String),
    /// Request generated text. With no `input`, note features use the current
    /// note and `ProgressInsight` uses a summary of the task list.
    Generate {
        feature: Feature,
        input: Option<String>,
    },
    GenerationFinished {
        feature: Feature,
        request_id: u64,
        result: Result<String, GenerationError>,
    },
    AddTask {
        title: String,
        category: Option<String>,
        due: Option<String>,
    },
    ToggleTask(String),
    SetTaskCategory {
        id: String,
        category: Option<String>,
    },
    /// Ask the generator for a category for the task's title and store the
    /// answer (or the fallback category) on the task.
    SuggestTaskCategory(String),
    DeleteTask(String),
    AddResource {
        title: String,
        url: String,
    },
    DeleteResource(String),
    TasksChanged(Vec<Task>),
    ResourcesChanged(Vec<Resource>),
    DismissNotice,
}
