use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Dense document ID. A store holds at most `DocId::MAX + 1` documents.
pub type DocId = u32;

/// A document as held by the store. `id` is its position in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub content: String,
    pub url: Option<String>,
}

/// A document on its way in; the store assigns its ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    #[serde(alias = "body")]
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl NewDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), url: None }
    }

    pub fn with_url(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self { content: content.into(), url: Some(url.into()) }
    }
}

/// A search hit: a copy of the stored document plus its merged score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub id: DocId,
    pub content: String,
    pub url: Option<String>,
    pub score: f64,
}

/// Append-only document collection. IDs are never reused or reordered.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document, assigning it the next dense ID. Fails once every
    /// ID has been handed out.
    pub fn push(&mut self, doc: NewDocument) -> Result<DocId> {
        let id = next_id(self.docs.len())?;
        self.docs.push(Document { id, content: doc.content, url: doc.url });
        Ok(id)
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }
}

fn next_id(len: usize) -> Result<DocId> {
    DocId::try_from(len).map_err(|_| Error::StoreFull(len))
}
