use crate::bloom::ScalableBloomFilter;
use crate::document::{DocId, Document};
use crate::tokenizer::Tokenizer;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Token → posting list.
///
/// A document's ID is appended once per occurrence of the token, so a posting
/// list's length is the token's raw frequency across the corpus rather than
/// its document frequency. Scoring relies on that length as-is.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a whole corpus. Equivalent to calling [`add_document`](Self::add_document)
    /// for each document in turn.
    pub fn build<'a>(
        docs: impl IntoIterator<Item = &'a Document>,
        tokenizer: &dyn Tokenizer,
        filter: &mut ScalableBloomFilter,
    ) -> Self {
        let mut index = Self::new();
        for doc in docs {
            index.add_document(doc, tokenizer, filter);
        }
        index
    }

    /// Lower-case and tokenize one document, then record its postings.
    pub fn add_document(&mut self, doc: &Document, tokenizer: &dyn Tokenizer, filter: &mut ScalableBloomFilter) {
        let tokens = tokenizer.tokenize(&doc.content.to_lowercase());
        self.add_tokens(doc.id, tokens, filter);
    }

    /// Record an already tokenized document. Tokens new to the vocabulary are
    /// registered with `filter` as they are first seen.
    pub fn add_tokens(&mut self, doc_id: DocId, tokens: impl IntoIterator<Item = String>, filter: &mut ScalableBloomFilter) {
        for token in tokens {
            if token.is_empty() {
                continue;
            }
            match self.postings.entry(token) {
                Entry::Occupied(entry) => entry.into_mut().push(doc_id),
                Entry::Vacant(entry) => {
                    filter.add(entry.key());
                    entry.insert(vec![doc_id]);
                }
            }
        }
    }

    pub fn postings(&self, token: &str) -> Option<&[DocId]> {
        self.postings.get(token).map(Vec::as_slice)
    }

    /// Number of distinct tokens.
    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }
}
