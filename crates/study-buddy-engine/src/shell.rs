use std::collections::VecDeque;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::generation::TextGenerator;
use crate::models::{Record, Resource, Task, decode_snapshot};
use crate::state::{Action, AppState, Command, reduce};
use crate::store::{Document, DocumentStore, Subscription};

/// Runs the reducer against real capabilities.
///
/// Owns the [`AppState`], executes the [`Command`]s the reducer emits, and
/// feeds their outcomes and store snapshots back in as [`Action`]s. Failures
/// are absorbed here: generation errors become the feature's fallback text,
/// store errors are logged.
pub struct Shell<G, S> {
    state: AppState,
    generator: G,
    store: S,
    snapshots: UnboundedReceiver<Action>,
    _subscriptions: Vec<Subscription>,
}

impl<G: TextGenerator, S: DocumentStore> Shell<G, S> {
    /// Subscribes to the task and resource collections and applies their
    /// initial snapshots.
    pub fn new(generator: G, store: S) -> Self {
        let (tx, snapshots) = mpsc::unbounded_channel();
        let subscriptions = vec![
            subscribe_records::<Task, S>(&store, tx.clone(), Action::TasksChanged),
            subscribe_records::<Resource, S>(&store, tx, Action::ResourcesChanged),
        ];
        let mut shell = Self {
            state: AppState::default(),
            generator,
            store,
            snapshots,
            _subscriptions: subscriptions,
        };
        shell.apply_snapshots();
        shell
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applies `action` and everything it causes, until nothing is left to do.
    pub async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            for command in reduce(&mut self.state, action) {
                if let Some(outcome) = self.execute(command).await {
                    queue.push_back(outcome);
                }
            }
            while let Ok(snapshot) = self.snapshots.try_recv() {
                queue.push_back(snapshot);
            }
        }
    }

    fn apply_snapshots(&mut self) {
        while let Ok(snapshot) = self.snapshots.try_recv() {
            // Snapshot actions only replace collections; they never emit commands.
            let _ = reduce(&mut self.state, snapshot);
        }
    }

    async fn execute(&self, command: Command) -> Option<Action> {
        match command {
            Command::Generate {
                feature,
                request_id,
                prompt,
            } => {
                let result = self.generator.generate(&prompt).await;
                if let Err(e) = &result {
                    log::warn!("{feature} generation failed: {e}");
                }
                Some(Action::GenerationFinished {
                    feature,
                    request_id,
                    result,
                })
            }
            Command::AddRecord { collection, record } => {
                if let Err(e) = self.store.add(collection, record) {
                    log::error!("Failed to add to {collection}: {e}");
                }
                None
            }
            Command::UpdateRecord {
                collection,
                id,
                patch,
            } => {
                if let Err(e) = self.store.update(collection, &id, patch) {
                    log::error!("Failed to update {collection}/{id}: {e}");
                }
                None
            }
            Command::DeleteRecord { collection, id } => {
                if let Err(e) = self.store.delete(collection, &id) {
                    log::error!("Failed to delete {collection}/{id}: {e}");
                }
                None
            }
        }
    }
}

fn subscribe_records<R: Record + 'static, S: DocumentStore>(
    store: &S,
    tx: UnboundedSender<Action>,
    wrap: fn(Vec<R>) -> Action,
) -> Subscription {
    store.subscribe(
        R::COLLECTION,
        Box::new(move |docs: &[Document]| {
            // The receiver only goes away with the shell itself.
            let _ = tx.send(wrap(decode_snapshot(docs)));
        }),
    )
}
