pub mod flashcard;
pub mod resource;
pub mod task;

pub use flashcard::{Flashcard, parse_flashcards};
pub use resource::Resource;
pub use task::{Task, progress_summary};

use serde::de::DeserializeOwned;

use crate::store::Document;

/// A typed record living in one document-store collection.
///
/// The store id is not part of the stored body; it is attached after decoding.
pub trait Record: DeserializeOwned {
    const COLLECTION: &'static str;

    fn set_id(&mut self, id: String);

    fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        let mut record: Self = serde_json::from_value(doc.data.clone())?;
        record.set_id(doc.id.clone());
        Ok(record)
    }
}

/// Decodes a collection snapshot, skipping documents that don't fit `R`.
pub fn decode_snapshot<R: Record>(docs: &[Document]) -> Vec<R> {
    docs.iter()
        .filter_map(|doc| match R::from_document(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed {} document {}: {e}", R::COLLECTION, doc.id);
                None
            }
        })
        .collect()
}
