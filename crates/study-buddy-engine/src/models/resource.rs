use serde::{Deserialize, Serialize};

use super::Record;

/// A saved study link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub url: String,
}

impl Resource {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            url: url.into(),
        }
    }
}

impl Record for Resource {
    const COLLECTION: &'static str = "resources";

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
