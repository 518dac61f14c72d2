use serde_json::Value;

use crate::generation::Feature;

/// A side effect requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate {
        feature: Feature,
        request_id: u64,
        prompt: String,
    },
    AddRecord {
        collection: &'static str,
        record: Value,
    },
    UpdateRecord {
        collection: &'static str,
        id: String,
        patch: Value,
    },
    DeleteRecord {
        collection: &'static str,
        id: String,
    },
}
