pub mod generation;
pub mod math;
pub mod models;
pub mod shell;
pub mod state;
pub mod store;

// Re-export key types for easier usage
pub use generation::{Feature, GenerationError, HttpGenerator, TextGenerator};
pub use math::{LatexTypesetter, RenderedSegment, Segment, SegmentKind, Typesetter};
pub use models::{Flashcard, Resource, Task};
pub use shell::Shell;
pub use state::{Action, AppState, Command, reduce};
pub use store::{Document, DocumentStore, MemoryStore, StoreError, Subscription};
