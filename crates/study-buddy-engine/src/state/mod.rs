//! # Application State
//!
//! All UI-visible state lives in [`AppState`] and changes only through
//! [`reduce`]. The reducer never performs I/O; it returns [`Command`]s that the
//! [`crate::shell::Shell`] executes, and the outcomes come back as further
//! [`Action`]s.
//!
//! ## Loading flags
//!
//! Every generation request gets a fresh request id. The feature's loading
//! flag is set when the request is issued and cleared when the latest request
//! for that feature completes, whether it succeeded or not. Completions for
//! older request ids are stale and ignored.

pub mod action;
pub mod command;

pub use action::Action;
pub use command::Command;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::generation::Feature;
use crate::models::{Flashcard, Record, Resource, Task, parse_flashcards, progress_summary};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// The note text the note-based features work on.
    pub note_input: String,
    /// Latest output per feature: generated text or its fallback message.
    pub outputs: BTreeMap<Feature, String>,
    pub tasks: Vec<Task>,
    pub resources: Vec<Resource>,
    pub flashcards: Vec<Flashcard>,
    pub loading: BTreeSet<Feature>,
    /// Latest issued request id per feature with a request in flight.
    pub pending: BTreeMap<Feature, u64>,
    pub next_request_id: u64,
    /// One-line message for the user, e.g. why a request was not sent.
    pub notice: Option<String>,
    /// Task that receives the next category suggestion.
    pub category_target: Option<String>,
}

impl AppState {
    pub fn is_loading(&self, feature: Feature) -> bool {
        self.loading.contains(&feature)
    }

    pub fn output(&self, feature: Feature) -> Option<&str> {
        self.outputs.get(&feature).map(String::as_str)
    }

    fn input_for(&self, feature: Feature, input: Option<String>) -> String {
        match (feature, input) {
            (_, Some(input)) => input,
            (Feature::ProgressInsight, None) => progress_summary(&self.tasks),
            (_, None) => self.note_input.clone(),
        }
    }
}

/// Issues a generation request for `input`, or sets a notice when it is blank.
fn request(state: &mut AppState, feature: Feature, input: &str) -> Vec<Command> {
    if input.trim().is_empty() {
        state.notice = Some(format!("Nothing to {feature}: the input is empty."));
        return vec![];
    }
    let request_id = state.next_request_id;
    state.next_request_id += 1;
    state.pending.insert(feature, request_id);
    state.loading.insert(feature);
    state.notice = None;
    vec![Command::Generate {
        feature,
        request_id,
        prompt: feature.prompt(input),
    }]
}

/// Applies `action` to `state` and returns the effects to run.
pub fn reduce(state: &mut AppState, action: Action) -> Vec<Command> {
    match action {
        Action::SetNote(text) => {
            state.note_input = text;
            vec![]
        }
        Action::Generate { feature, input } => {
            if feature == Feature::SuggestCategory {
                state.category_target = None;
            }
            let input = state.input_for(feature, input);
            request(state, feature, &input)
        }
        Action::SuggestTaskCategory(id) => {
            let Some(title) = state.tasks.iter().find(|t| t.id == id).map(|t| t.title.clone())
            else {
                state.notice = Some(format!("No task with id {id}."));
                return vec![];
            };
            let commands = request(state, Feature::SuggestCategory, &title);
            if !commands.is_empty() {
                state.category_target = Some(id);
            }
            commands
        }
        Action::GenerationFinished {
            feature,
            request_id,
            result,
        } => {
            if state.pending.get(&feature) != Some(&request_id) {
                log::debug!("Ignoring stale {feature} result for request {request_id}");
                return vec![];
            }
            state.pending.remove(&feature);
            state.loading.remove(&feature);

            let output = match result {
                Ok(raw) => {
                    if feature == Feature::GenerateQuiz {
                        state.flashcards = parse_flashcards(&raw);
                    }
                    feature.extract(&raw)
                }
                Err(_) => feature.fallback().to_string(),
            };
            let commands = match state.category_target.take() {
                Some(id) if feature == Feature::SuggestCategory => {
                    vec![Command::UpdateRecord {
                        collection: Task::COLLECTION,
                        id,
                        patch: json!({ "category": output }),
                    }]
                }
                other => {
                    state.category_target = other;
                    vec![]
                }
            };
            state.outputs.insert(feature, output);
            commands
        }
        Action::AddTask {
            title,
            category,
            due,
        } => {
            let title = title.trim();
            if title.is_empty() {
                state.notice = Some("A task needs a title.".to_string());
                return vec![];
            }
            let task = Task::new(title).with_category(category).with_due(due);
            match serde_json::to_value(&task) {
                Ok(record) => vec![Command::AddRecord {
                    collection: Task::COLLECTION,
                    record,
                }],
                Err(e) => {
                    log::error!("Failed to encode task: {e}");
                    vec![]
                }
            }
        }
        Action::ToggleTask(id) => match state.tasks.iter().find(|t| t.id == id) {
            Some(task) => vec![Command::UpdateRecord {
                collection: Task::COLLECTION,
                id,
                patch: json!({ "completed": !task.completed }),
            }],
            None => {
                state.notice = Some(format!("No task with id {id}."));
                vec![]
            }
        },
        Action::SetTaskCategory { id, category } => vec![Command::UpdateRecord {
            collection: Task::COLLECTION,
            id,
            patch: json!({ "category": category }),
        }],
        Action::DeleteTask(id) => vec![Command::DeleteRecord {
            collection: Task::COLLECTION,
            id,
        }],
        Action::AddResource { title, url } => {
            if title.trim().is_empty() || url.trim().is_empty() {
                state.notice = Some("A resource needs a title and a URL.".to_string());
                return vec![];
            }
            let resource = Resource::new(title.trim(), url.trim());
            match serde_json::to_value(&resource) {
                Ok(record) => vec![Command::AddRecord {
                    collection: Resource::COLLECTION,
                    record,
                }],
                Err(e) => {
                    log::error!("Failed to encode resource: {e}");
                    vec![]
                }
            }
        }
        Action::DeleteResource(id) => vec![Command::DeleteRecord {
            collection: Resource::COLLECTION,
            id,
        }],
        Action::TasksChanged(tasks) => {
            state.tasks = tasks;
            vec![]
        }
        Action::ResourcesChanged(resources) => {
            state.resources = resources;
            vec![]
        }
        Action::DismissNotice => {
            state.notice = None;
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use pretty_assertions::assert_eq;

    fn generate(feature: Feature, input: &str) -> Action {
        Action::Generate {
            feature,
            input: Some(input.to_string()),
        }
    }

    fn finished(feature: Feature, request_id: u64, result: Result<&str, GenerationError>) -> Action {
        Action::GenerationFinished {
            feature,
            request_id,
            result: result.map(str::to_string),
        }
    }

    fn issued_id(commands: &[Command]) -> u64 {
        match commands {
            [Command::Generate { request_id, .. }] => *request_id,
            other => panic!("expected one Generate command, got {other:?}"),
        }
    }

    #[test]
    fn generate_sets_loading_and_issues_command() {
        let mut state = AppState::default();
        let commands = reduce(&mut state, generate(Feature::Explain, "entropy"));
        assert!(state.is_loading(Feature::Explain));
        match &commands[..] {
            [Command::Generate { feature, prompt, .. }] => {
                assert_eq!(*feature, Feature::Explain);
                assert!(prompt.contains("entropy"));
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn success_clears_loading_and_stores_output() {
        let mut state = AppState::default();
        let id = issued_id(&reduce(&mut state, generate(Feature::Summarize, "notes")));
        reduce(&mut state, finished(Feature::Summarize, id, Ok("  short  ")));
        assert!(!state.is_loading(Feature::Summarize));
        assert_eq!(state.output(Feature::Summarize), Some("short"));
        assert!(state.pending.is_empty());
    }

    #[test]
    fn failure_clears_loading_and_shows_fallback() {
        let mut state = AppState::default();
        let id = issued_id(&reduce(&mut state, generate(Feature::Summarize, "notes")));
        reduce(
            &mut state,
            finished(Feature::Summarize, id, Err(GenerationError::EmptyResponse)),
        );
        assert!(!state.is_loading(Feature::Summarize));
        assert_eq!(
            state.output(Feature::Summarize),
            Some(Feature::Summarize.fallback())
        );
    }

    #[test]
    fn stale_result_is_disregarded() {
        let mut state = AppState::default();
        let first = issued_id(&reduce(&mut state, generate(Feature::Explain, "a")));
        let second = issued_id(&reduce(&mut state, generate(Feature::Explain, "b")));
        assert_ne!(first, second);

        reduce(&mut state, finished(Feature::Explain, first, Ok("old")));
        assert!(state.is_loading(Feature::Explain));
        assert_eq!(state.output(Feature::Explain), None);

        reduce(&mut state, finished(Feature::Explain, second, Ok("new")));
        assert!(!state.is_loading(Feature::Explain));
        assert_eq!(state.output(Feature::Explain), Some("new"));
    }

    #[test]
    fn features_load_independently() {
        let mut state = AppState::default();
        let quiz = issued_id(&reduce(&mut state, generate(Feature::GenerateQuiz, "cells")));
        reduce(&mut state, generate(Feature::Explain, "mitosis"));
        reduce(&mut state, finished(Feature::GenerateQuiz, quiz, Ok("Q: a?\nA: b")));
        assert!(!state.is_loading(Feature::GenerateQuiz));
        assert!(state.is_loading(Feature::Explain));
        assert_eq!(
            state.flashcards,
            vec![Flashcard {
                question: "a?".to_string(),
                answer: "b".to_string()
            }]
        );
    }

    #[test]
    fn empty_input_sets_notice_without_request() {
        let mut state = AppState::default();
        let commands = reduce(
            &mut state,
            Action::Generate {
                feature: Feature::Summarize,
                input: None,
            },
        );
        assert!(commands.is_empty());
        assert!(!state.is_loading(Feature::Summarize));
        assert_eq!(
            state.notice.as_deref(),
            Some("Nothing to summarize: the input is empty.")
        );
    }

    #[test]
    fn note_features_default_to_note_input() {
        let mut state = AppState::default();
        reduce(&mut state, Action::SetNote("photosynthesis".to_string()));
        let commands = reduce(
            &mut state,
            Action::Generate {
                feature: Feature::Simplify,
                input: None,
            },
        );
        assert!(matches!(
            &commands[..],
            [Command::Generate { prompt, .. }] if prompt.ends_with("photosynthesis")
        ));
    }

    #[test]
    fn progress_insight_defaults_to_task_summary() {
        let mut state = AppState::default();
        reduce(&mut state, Action::TasksChanged(vec![Task::new("Essay")]));
        let commands = reduce(
            &mut state,
            Action::Generate {
                feature: Feature::ProgressInsight,
                input: None,
            },
        );
        assert!(matches!(
            &commands[..],
            [Command::Generate { prompt, .. }] if prompt.contains("0 of 1 tasks completed")
        ));
    }

    #[test]
    fn toggle_task_issues_update_patch() {
        let mut state = AppState::default();
        let mut task = Task::new("Read");
        task.id = "t1".to_string();
        reduce(&mut state, Action::TasksChanged(vec![task]));

        let commands = reduce(&mut state, Action::ToggleTask("t1".to_string()));
        assert_eq!(
            commands,
            vec![Command::UpdateRecord {
                collection: "tasks",
                id: "t1".to_string(),
                patch: json!({ "completed": true }),
            }]
        );
        // No optimistic change; the next snapshot brings it in.
        assert!(!state.tasks[0].completed);
    }

    #[test]
    fn set_category_patches_only_category() {
        let mut state = AppState::default();
        let commands = reduce(
            &mut state,
            Action::SetTaskCategory {
                id: "t1".to_string(),
                category: Some("Math".to_string()),
            },
        );
        assert_eq!(
            commands,
            vec![Command::UpdateRecord {
                collection: "tasks",
                id: "t1".to_string(),
                patch: json!({ "category": "Math" }),
            }]
        );
    }

    fn state_with_task(id: &str, title: &str) -> AppState {
        let mut state = AppState::default();
        let mut task = Task::new(title);
        task.id = id.to_string();
        reduce(&mut state, Action::TasksChanged(vec![task]));
        state
    }

    #[test]
    fn suggested_category_is_written_to_task() {
        let mut state = state_with_task("t1", "Titration lab");
        let commands = reduce(&mut state, Action::SuggestTaskCategory("t1".to_string()));
        let id = match &commands[..] {
            [Command::Generate {
                feature: Feature::SuggestCategory,
                request_id,
                prompt,
            }] => {
                assert!(prompt.ends_with("Titration lab"));
                *request_id
            }
            other => panic!("unexpected commands {other:?}"),
        };

        let commands = reduce(
            &mut state,
            finished(Feature::SuggestCategory, id, Ok("Chemistry\nIt involves acids.")),
        );
        assert_eq!(
            commands,
            vec![Command::UpdateRecord {
                collection: "tasks",
                id: "t1".to_string(),
                patch: json!({ "category": "Chemistry" }),
            }]
        );
        assert_eq!(state.category_target, None);
    }

    #[test]
    fn failed_suggestion_uses_fallback_category() {
        let mut state = state_with_task("t1", "Essay");
        let id = issued_id(&reduce(&mut state, Action::SuggestTaskCategory("t1".to_string())));
        let commands = reduce(
            &mut state,
            finished(Feature::SuggestCategory, id, Err(GenerationError::EmptyResponse)),
        );
        assert!(matches!(
            &commands[..],
            [Command::UpdateRecord { patch, .. }] if *patch == json!({ "category": "General" })
        ));
    }

    #[test]
    fn plain_suggestion_request_detaches_target() {
        let mut state = state_with_task("t1", "Essay");
        reduce(&mut state, Action::SuggestTaskCategory("t1".to_string()));
        let id = issued_id(&reduce(&mut state, generate(Feature::SuggestCategory, "Lab")));
        let commands = reduce(&mut state, finished(Feature::SuggestCategory, id, Ok("Science")));
        assert!(commands.is_empty());
        assert_eq!(state.output(Feature::SuggestCategory), Some("Science"));
    }

    #[test]
    fn other_features_keep_category_target() {
        let mut state = state_with_task("t1", "Essay");
        reduce(&mut state, Action::SuggestTaskCategory("t1".to_string()));
        let explain = issued_id(&reduce(&mut state, generate(Feature::Explain, "x")));
        assert!(reduce(&mut state, finished(Feature::Explain, explain, Ok("y"))).is_empty());
        assert_eq!(state.category_target.as_deref(), Some("t1"));
    }

    #[test]
    fn suggestion_for_unknown_task_sets_notice() {
        let mut state = AppState::default();
        let commands = reduce(&mut state, Action::SuggestTaskCategory("nope".to_string()));
        assert!(commands.is_empty());
        assert!(!state.is_loading(Feature::SuggestCategory));
        assert!(state.notice.is_some());
    }

    #[test]
    fn toggle_unknown_task_sets_notice() {
        let mut state = AppState::default();
        let commands = reduce(&mut state, Action::ToggleTask("missing".to_string()));
        assert!(commands.is_empty());
        assert!(state.notice.is_some());
    }

    #[test]
    fn add_task_requires_title() {
        let mut state = AppState::default();
        assert!(
            reduce(
                &mut state,
                Action::AddTask {
                    title: "  ".to_string(),
                    category: None,
                    due: None,
                }
            )
            .is_empty()
        );
        let commands = reduce(
            &mut state,
            Action::AddTask {
                title: " Lab report ".to_string(),
                category: Some("Science".to_string()),
                due: Some("2026-11-02".to_string()),
            },
        );
        assert_eq!(
            commands,
            vec![Command::AddRecord {
                collection: "tasks",
                record: json!({
                    "title": "Lab report",
                    "category": "Science",
                    "due": "2026-11-02",
                    "completed": false
                }),
            }]
        );
    }

    #[test]
    fn snapshots_replace_collections() {
        let mut state = AppState::default();
        reduce(
            &mut state,
            Action::ResourcesChanged(vec![Resource::new("a", "https://a.test")]),
        );
        reduce(&mut state, Action::ResourcesChanged(vec![]));
        assert!(state.resources.is_empty());
    }

    #[test]
    fn state_serializes() {
        let mut state = AppState::default();
        reduce(&mut state, generate(Feature::GeneratePlan, "physics"));
        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
