use crate::bloom::ScalableBloomFilter;
use crate::cleaning::{QueryCleaner, StopwordCleaner};
use crate::config::{EngineConfig, RankingParams, LENGTH_HEADROOM};
use crate::document::{DocId, Document, DocumentStore, NewDocument, ScoredDocument};
use crate::error::Result;
use crate::index::InvertedIndex;
use crate::scoring::{bm25_scores, merge_scores, tfidf_scores, CorpusView};
use crate::tokenizer::{Tokenizer, WordTokenizer};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use std::sync::Arc;

/// Aggregate corpus statistics, maintained incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total_doc_count: u64,
    /// Sum of content lengths in characters.
    pub total_doc_len: u64,
    pub avg_doc_length: f64,
}

impl CorpusStats {
    /// Account for one more document of `len` characters.
    ///
    /// Returns false, leaving the statistics untouched, when the running
    /// total would come within [`LENGTH_HEADROOM`] of overflowing.
    pub fn try_add(&mut self, len: u64) -> bool {
        let total = match self.total_doc_len.checked_add(len) {
            Some(t) if t <= u64::MAX - LENGTH_HEADROOM => t,
            _ => return false,
        };
        self.total_doc_count += 1;
        self.total_doc_len = total;
        self.avg_doc_length = total as f64 / self.total_doc_count as f64;
        true
    }
}

/// Point-in-time summary of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineStats {
    #[serde(flatten)]
    pub corpus: CorpusStats,
    /// Documents in the store, including any whose statistics update was skipped.
    pub documents: usize,
    pub vocabulary: usize,
    pub filter_tiers: usize,
}

/// Everything a search reads and an add writes. Guarded as a unit so readers
/// never observe a document that is stored but not yet indexed.
#[derive(Debug)]
pub struct EngineState {
    pub documents: DocumentStore,
    pub index: InvertedIndex,
    pub filter: ScalableBloomFilter,
    pub stats: CorpusStats,
    pub ranking: RankingParams,
}

impl EngineState {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            documents: DocumentStore::new(),
            index: InvertedIndex::new(),
            filter: ScalableBloomFilter::new(&config.filter)?,
            stats: CorpusStats::default(),
            ranking: config.ranking,
        })
    }

    /// Store a document and, unless the length guard trips, index it and
    /// fold it into the corpus statistics.
    ///
    /// `tokens` must come from the lower-cased content. Fails only when the
    /// store has run out of document IDs, in which case nothing changes.
    pub fn add_document(&mut self, doc: NewDocument, tokens: Vec<String>) -> Result<DocId> {
        let len = doc.content.chars().count() as u64;
        let id = self.documents.push(doc)?;

        let mut stats = self.stats;
        if !stats.try_add(len) {
            tracing::warn!(doc_id = id, len, total = self.stats.total_doc_len, "corpus length near overflow; document stored without indexing");
            return Ok(id);
        }
        self.index.add_tokens(id, tokens, &mut self.filter);
        self.stats = stats;
        Ok(id)
    }

    fn view<'a>(&'a self, tokenizer: &'a dyn Tokenizer) -> CorpusView<'a> {
        CorpusView {
            index: &self.index,
            documents: &self.documents,
            tokenizer,
            avg_doc_length: self.stats.avg_doc_length,
        }
    }

    /// Score, threshold, rank and truncate for already tokenized query terms.
    ///
    /// `tokenizer` must be the one the index was built with; term frequency is
    /// recounted in its normalized form of each document.
    pub fn rank(&self, tokens: &[String], limit: usize, tokenizer: &dyn Tokenizer) -> Vec<ScoredDocument> {
        let present: Vec<String> = tokens
            .iter()
            .filter(|t| !t.is_empty() && self.filter.test(t.as_str()))
            .cloned()
            .collect();
        if present.is_empty() {
            tracing::debug!(tokens = tokens.len(), "no query token passed the membership filter");
            return Vec::new();
        }

        let view = self.view(tokenizer);
        let scores = merge_scores(
            tfidf_scores(view, &present, &self.ranking),
            bm25_scores(view, &present, &self.ranking),
        );

        let threshold = self.ranking.score_threshold;
        let mut results: Vec<ScoredDocument> = scores
            .into_iter()
            // NaN and infinities never clear the threshold
            .filter(|(_, score)| score.is_finite() && *score >= threshold)
            .filter_map(|(id, score)| {
                self.documents.get(id).map(|doc| ScoredDocument {
                    id,
                    content: doc.content.clone(),
                    url: doc.url.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
        results.truncate(limit);

        tracing::debug!(tokens = tokens.len(), present = present.len(), hits = results.len(), "ranked query");
        results
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            corpus: self.stats,
            documents: self.documents.len(),
            vocabulary: self.index.vocabulary_size(),
            filter_tiers: self.filter.tiers().len(),
        }
    }
}

/// Shared search engine handle: one lock-guarded state plus the text collaborators.
///
/// Cleaning and tokenization run before the lock is taken, so the critical
/// sections only touch in-memory structures.
pub struct SearchEngine {
    state: RwLock<EngineState>,
    tokenizer: Arc<dyn Tokenizer>,
    cleaner: Arc<dyn QueryCleaner>,
}

impl SearchEngine {
    /// Build an engine over a seed corpus. Seed documents get IDs `0..seed.len()`.
    pub fn new(
        config: EngineConfig,
        tokenizer: Arc<dyn Tokenizer>,
        cleaner: Arc<dyn QueryCleaner>,
        seed: impl IntoIterator<Item = NewDocument>,
    ) -> Result<Self> {
        let mut state = EngineState::new(&config)?;
        for doc in seed {
            let tokens = tokenizer.tokenize(&doc.content.to_lowercase());
            state.add_document(doc, tokens)?;
        }
        tracing::info!(
            documents = state.documents.len(),
            vocabulary = state.index.vocabulary_size(),
            filter_tiers = state.filter.tiers().len(),
            avg_doc_length = state.stats.avg_doc_length,
            "search engine built"
        );
        Ok(Self { state: RwLock::new(state), tokenizer, cleaner })
    }

    /// Default configuration with the word tokenizer and stopword cleaner.
    pub fn with_defaults(seed: impl IntoIterator<Item = NewDocument>) -> Result<Self> {
        Self::new(EngineConfig::default(), Arc::new(WordTokenizer::new()), Arc::new(StopwordCleaner), seed)
    }

    /// Append a document and index it. Returns its assigned ID.
    pub fn add_document(&self, doc: NewDocument) -> Result<DocId> {
        let tokens = self.tokenizer.tokenize(&doc.content.to_lowercase());
        let mut state = self.state.write();
        let id = state.add_document(doc, tokens)?;
        tracing::debug!(doc_id = id, "document added");
        Ok(id)
    }

    /// Add documents in order, stopping at the first failure. Documents added
    /// before it stay in the engine.
    pub fn add_documents(&self, docs: impl IntoIterator<Item = NewDocument>) -> Result<Vec<DocId>> {
        docs.into_iter().map(|doc| self.add_document(doc)).collect()
    }

    /// Ranked documents for a free-text query, at most `limit` of them.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredDocument> {
        let cleaned = self.clean_query(query);
        let tokens = self.tokenizer.tokenize(&cleaned.to_lowercase());
        self.state.read().rank(&tokens, limit, self.tokenizer.as_ref())
    }

    /// The cleaner's output, or the raw query if cleaning failed or left nothing.
    fn clean_query(&self, query: &str) -> String {
        match self.cleaner.clean(query) {
            Some(cleaned) if !cleaned.trim().is_empty() => cleaned,
            _ => query.to_string(),
        }
    }

    /// Consistent read snapshot of the whole state. Writers block while it is held.
    pub fn state(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read()
    }

    pub fn document(&self, id: DocId) -> Option<Document> {
        self.state.read().documents.get(id).cloned()
    }

    /// Membership probe: false means no indexed document contains `token`.
    pub fn might_contain(&self, token: &str) -> bool {
        self.state.read().filter.test(token)
    }

    pub fn stats(&self) -> EngineStats {
        self.state.read().stats()
    }

    pub fn len(&self) -> usize {
        self.state.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ranking(&self) -> RankingParams {
        self.state.read().ranking
    }

    pub fn set_k1(&self, k1: f64) -> Result<()> {
        self.update_ranking(|r| r.k1 = k1)
    }

    pub fn set_b(&self, b: f64) -> Result<()> {
        self.update_ranking(|r| r.b = b)
    }

    /// Apply `f` to the ranking parameters; rejected changes leave them as they were.
    pub fn update_ranking(&self, f: impl FnOnce(&mut RankingParams)) -> Result<()> {
        let mut state = self.state.write();
        let mut ranking = state.ranking;
        f(&mut ranking);
        ranking.validate()?;
        state.ranking = ranking;
        Ok(())
    }
}
