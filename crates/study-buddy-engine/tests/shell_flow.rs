use std::collections::VecDeque;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use serde_json::json;
use study_buddy_engine::{
    Action, DocumentStore, Feature, Flashcard, GenerationError, MemoryStore, Shell,
    TextGenerator,
};

/// Replies with queued responses, then fails once they run out.
#[derive(Default)]
struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
}

impl ScriptedGenerator {
    fn replying(replies: impl IntoIterator<Item = Result<&'static str, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
        }
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::EmptyResponse))
    }
}

fn add_task(title: &str) -> Action {
    Action::AddTask {
        title: title.to_string(),
        category: None,
        due: None,
    }
}

#[tokio::test]
async fn tasks_flow_through_store_snapshots() {
    let store = MemoryStore::new();
    let mut shell = Shell::new(ScriptedGenerator::default(), store.clone());

    shell.dispatch(add_task("Read chapter 4")).await;
    shell.dispatch(add_task("Practice integrals")).await;
    let titles: Vec<_> = shell.state().tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Read chapter 4", "Practice integrals"]);

    let id = shell.state().tasks[0].id.clone();
    shell.dispatch(Action::ToggleTask(id.clone())).await;
    assert!(shell.state().tasks[0].completed);

    shell.dispatch(Action::DeleteTask(id)).await;
    assert_eq!(shell.state().tasks.len(), 1);
    assert_eq!(store.snapshot("tasks").len(), 1);
}

#[tokio::test]
async fn existing_records_load_on_start() {
    let store = MemoryStore::new();
    store
        .add("resources", json!({ "title": "Khan Academy", "url": "https://khanacademy.org" }))
        .unwrap();

    let shell = Shell::new(ScriptedGenerator::default(), store);
    assert_eq!(shell.state().resources.len(), 1);
    assert_eq!(shell.state().resources[0].title, "Khan Academy");
}

#[tokio::test]
async fn changes_made_elsewhere_arrive_with_next_dispatch() {
    let store = MemoryStore::new();
    let mut shell = Shell::new(ScriptedGenerator::default(), store.clone());

    store.add("tasks", json!({ "title": "Added by another client" })).unwrap();
    shell.dispatch(Action::DismissNotice).await;
    assert_eq!(shell.state().tasks.len(), 1);
}

#[tokio::test]
async fn store_failure_is_absorbed() {
    let mut shell = Shell::new(ScriptedGenerator::default(), MemoryStore::new());
    shell.dispatch(Action::DeleteTask("no-such-id".to_string())).await;
    assert!(shell.state().tasks.is_empty());
}

#[tokio::test]
async fn quiz_generation_fills_flashcards() {
    let generator = ScriptedGenerator::replying([Ok("Q: What is $e^{i\\pi}$?\nA: $-1$")]);
    let mut shell = Shell::new(generator, MemoryStore::new());

    shell
        .dispatch(Action::SetNote("Euler's identity".to_string()))
        .await;
    shell
        .dispatch(Action::Generate {
            feature: Feature::GenerateQuiz,
            input: None,
        })
        .await;

    let state = shell.state();
    assert!(!state.is_loading(Feature::GenerateQuiz));
    assert_eq!(
        state.flashcards,
        vec![Flashcard {
            question: "What is $e^{i\\pi}$?".to_string(),
            answer: "$-1$".to_string(),
        }]
    );
}

#[tokio::test]
async fn generation_failure_shows_fallback_and_allows_retry() {
    let generator = ScriptedGenerator::replying([
        Err(GenerationError::Transport("connection reset".to_string())),
        Ok("Entropy measures disorder."),
    ]);
    let mut shell = Shell::new(generator, MemoryStore::new());
    let explain = || Action::Generate {
        feature: Feature::Explain,
        input: Some("entropy".to_string()),
    };

    shell.dispatch(explain()).await;
    assert!(!shell.state().is_loading(Feature::Explain));
    assert_eq!(
        shell.state().output(Feature::Explain),
        Some(Feature::Explain.fallback())
    );

    shell.dispatch(explain()).await;
    assert_eq!(
        shell.state().output(Feature::Explain),
        Some("Entropy measures disorder.")
    );
}

#[tokio::test]
async fn category_suggestion_uses_task_title() {
    let generator = ScriptedGenerator::replying([Ok("Chemistry\nbecause of the titration")]);
    let mut shell = Shell::new(generator, MemoryStore::new());

    shell
        .dispatch(Action::Generate {
            feature: Feature::SuggestCategory,
            input: Some("Titration lab write-up".to_string()),
        })
        .await;

    assert_eq!(shell.state().output(Feature::SuggestCategory), Some("Chemistry"));
}

#[tokio::test]
async fn suggested_category_lands_on_task() {
    let generator = ScriptedGenerator::replying([Ok("Chemistry\nbecause of the titration")]);
    let store = MemoryStore::new();
    let mut shell = Shell::new(generator, store.clone());

    shell.dispatch(add_task("Titration lab write-up")).await;
    let id = shell.state().tasks[0].id.clone();
    shell.dispatch(Action::SuggestTaskCategory(id)).await;

    assert_eq!(shell.state().tasks[0].category.as_deref(), Some("Chemistry"));
    assert_eq!(store.snapshot("tasks")[0].data["category"], json!("Chemistry"));
    assert!(!shell.state().is_loading(Feature::SuggestCategory));
}

#[tokio::test]
async fn manual_category_and_due_date_are_stored() {
    let store = MemoryStore::new();
    let mut shell = Shell::new(ScriptedGenerator::default(), store.clone());

    shell
        .dispatch(Action::AddTask {
            title: "Problem set 3".to_string(),
            category: None,
            due: Some("2026-11-02".to_string()),
        })
        .await;
    let id = shell.state().tasks[0].id.clone();
    shell
        .dispatch(Action::SetTaskCategory {
            id,
            category: Some("Math".to_string()),
        })
        .await;

    let task = &shell.state().tasks[0];
    assert_eq!(task.due.as_deref(), Some("2026-11-02"));
    assert_eq!(task.category.as_deref(), Some("Math"));
}
