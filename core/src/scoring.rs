//! TF-IDF and BM25 partial scores.
//!
//! Both scorers walk every entry of a token's posting list, so a document is
//! credited once per occurrence of the token. IDF is computed from the posting
//! list length (raw corpus frequency), not from document frequency. Term
//! frequency is recounted from the document's lower-cased content, put through
//! the same normalization the tokenizer applied when the document was indexed.

use crate::config::RankingParams;
use crate::document::{DocId, DocumentStore};
use crate::index::InvertedIndex;
use crate::tokenizer::Tokenizer;
use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

pub type Scores = BTreeMap<DocId, f64>;

/// Read-only view of the corpus state a scorer needs.
#[derive(Clone, Copy)]
pub struct CorpusView<'a> {
    pub index: &'a InvertedIndex,
    pub documents: &'a DocumentStore,
    /// Tokenizer the index was built with; supplies the text form tf is counted in.
    pub tokenizer: &'a dyn Tokenizer,
    /// Mean content length in characters.
    pub avg_doc_length: f64,
}

/// Non-overlapping occurrences of `token` as a substring of `text`.
pub fn term_frequency(text: &str, token: &str) -> f64 {
    if token.is_empty() {
        return 0.0;
    }
    text.matches(token).count() as f64
}

pub fn word_count(text: &str) -> f64 {
    text.split_whitespace().count() as f64
}

/// Lower-cased, normalized content and word count, computed once per document
/// per scoring pass.
struct LoweredDocs<'a> {
    store: &'a DocumentStore,
    tokenizer: &'a dyn Tokenizer,
    cache: HashMap<DocId, (String, f64)>,
}

impl<'a> LoweredDocs<'a> {
    fn new(view: CorpusView<'a>) -> Self {
        Self { store: view.documents, tokenizer: view.tokenizer, cache: HashMap::new() }
    }

    fn get(&mut self, id: DocId) -> Option<&(String, f64)> {
        let (store, tokenizer) = (self.store, self.tokenizer);
        match self.cache.entry(id) {
            Entry::Occupied(e) => Some(&*e.into_mut()),
            Entry::Vacant(e) => {
                let lowered = store.get(id)?.content.to_lowercase();
                let normalized = match tokenizer.normalize(&lowered) {
                    Cow::Owned(text) => Some(text),
                    Cow::Borrowed(_) => None,
                };
                let text = normalized.unwrap_or(lowered);
                let words = word_count(&text);
                Some(&*e.insert((text, words)))
            }
        }
    }
}

/// `score[d] += tf * ln(N / |postings|) * tfidf_weight` for every posting entry.
pub fn tfidf_scores(view: CorpusView<'_>, tokens: &[String], params: &RankingParams) -> Scores {
    let total_docs = view.documents.len() as f64;
    let mut docs = LoweredDocs::new(view);
    let mut scores = Scores::new();

    for token in tokens {
        let Some(postings) = view.index.postings(token) else {
            continue;
        };
        let idf = (total_docs / postings.len() as f64).ln();

        for &doc_id in postings {
            let Some((text, _)) = docs.get(doc_id) else {
                continue;
            };
            let tf = term_frequency(text, token);
            *scores.entry(doc_id).or_insert(0.0) += tf * idf * params.tfidf_weight;
        }
    }
    scores
}

/// BM25 partial scores with this engine's term grouping.
///
/// `idf = ln(N - n + 0.5) / (n + 0.5)` where `n` is the posting list length,
/// and the per-entry term is `idf * ((k1+1) * tf * (k1+1) / (tf + sat)) / (tf + sat)`
/// with `sat = k1 * (1 - b + b * dl / avgdl)`. `dl` is a word count while
/// `avgdl` is a mean character length.
pub fn bm25_scores(view: CorpusView<'_>, tokens: &[String], params: &RankingParams) -> Scores {
    let total_docs = view.documents.len() as f64;
    let (k1, b) = (params.k1, params.b);
    let mut docs = LoweredDocs::new(view);
    let mut scores = Scores::new();

    for token in tokens {
        let Some(postings) = view.index.postings(token) else {
            continue;
        };
        let n = postings.len() as f64;
        let idf = (total_docs - n + 0.5).ln() / (n + 0.5);

        for &doc_id in postings {
            let Some((text, dl)) = docs.get(doc_id) else {
                continue;
            };
            let tf = term_frequency(text, token);
            let sat = k1 * (1.0 - b + b * *dl / view.avg_doc_length);
            let numerator = (k1 + 1.0) * tf * (k1 + 1.0) / (tf + sat);
            let denominator = tf + sat;
            *scores.entry(doc_id).or_insert(0.0) += idf * numerator / denominator * params.bm25_weight;
        }
    }
    scores
}

/// Sum two partial score maps per document.
pub fn merge_scores(mut into: Scores, other: Scores) -> Scores {
    for (doc_id, score) in other {
        *into.entry(doc_id).or_insert(0.0) += score;
    }
    into
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::ScalableBloomFilter;
    use crate::config::FilterConfig;
    use crate::document::NewDocument;
    use crate::tokenizer::{WhitespaceTokenizer, WordTokenizer};

    struct Fixture {
        index: InvertedIndex,
        documents: DocumentStore,
        tokenizer: Box<dyn Tokenizer>,
        avg: f64,
    }

    impl Fixture {
        fn new(contents: &[&str]) -> Self {
            Self::with_tokenizer(contents, Box::new(WhitespaceTokenizer))
        }

        fn with_tokenizer(contents: &[&str], tokenizer: Box<dyn Tokenizer>) -> Self {
            let mut documents = DocumentStore::new();
            for c in contents {
                documents.push(NewDocument::new(*c)).unwrap();
            }
            let mut filter = ScalableBloomFilter::new(&FilterConfig::default()).unwrap();
            let index = InvertedIndex::build(documents.iter(), tokenizer.as_ref(), &mut filter);
            let total: usize = contents.iter().map(|c| c.chars().count()).sum();
            let avg = total as f64 / contents.len() as f64;
            Self { index, documents, tokenizer, avg }
        }

        fn view(&self) -> CorpusView<'_> {
            CorpusView {
                index: &self.index,
                documents: &self.documents,
                tokenizer: self.tokenizer.as_ref(),
                avg_doc_length: self.avg,
            }
        }
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn tf_counts_substrings() {
        assert_eq!(term_frequency("the dog dogged the dogs", "dog"), 3.0);
        assert_eq!(term_frequency("aaaa", "aa"), 2.0);
        assert_eq!(term_frequency("anything", ""), 0.0);
        assert_eq!(word_count("  two   words "), 2.0);
    }

    #[test]
    fn tfidf_single_hit() {
        let fx = Fixture::new(&["the quick brown fox", "the lazy dog"]);
        let params = RankingParams::default();
        let scores = tfidf_scores(fx.view(), &tokens(&["fox"]), &params);
        assert_eq!(scores.len(), 1);
        assert!(close(scores[&0], 2f64.ln() * 0.5));
    }

    #[test]
    fn bm25_single_hit_matches_formula() {
        let fx = Fixture::new(&["the quick brown fox", "the lazy dog"]);
        let params = RankingParams::default();
        let scores = bm25_scores(fx.view(), &tokens(&["fox"]), &params);

        let idf = 1.5f64.ln() / 1.5;
        let sat = 1.2 * (1.0 - 0.75 + 0.75 * 4.0 / 15.5);
        let numerator = 2.2 * 1.0 * 2.2 / (1.0 + sat);
        let expected = idf * numerator / (1.0 + sat) * 0.5;
        assert_eq!(scores.len(), 1);
        assert!(close(scores[&0], expected), "{} vs {expected}", scores[&0]);
        assert!(scores[&0] > 0.0);
    }

    #[test]
    fn tf_is_counted_in_normalized_text() {
        let fx = Fixture::with_tokenizer(&["the ｆｏｘ ran", "a lazy dog", "a cat"], Box::new(WordTokenizer::new()));
        assert_eq!(fx.index.postings("fox"), Some(&[0][..]));
        let scores = tfidf_scores(fx.view(), &tokens(&["fox"]), &RankingParams::default());
        assert!(close(scores[&0], 3f64.ln() * 0.5));
        let scores = bm25_scores(fx.view(), &tokens(&["fox"]), &RankingParams::default());
        assert!(scores[&0] > 0.0);
    }

    #[test]
    fn common_token_gets_zero_tfidf() {
        let fx = Fixture::new(&["the quick brown fox", "the lazy dog"]);
        let scores = tfidf_scores(fx.view(), &tokens(&["the"]), &RankingParams::default());
        // ln(2 / 2) == 0
        assert!(scores.values().all(|s| *s == 0.0));
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn each_posting_entry_contributes() {
        let fx = Fixture::new(&["echo echo", "other words here"]);
        let params = RankingParams::default();
        let scores = tfidf_scores(fx.view(), &tokens(&["echo"]), &params);
        // two posting entries, each crediting tf = 2 at idf = ln(2 / 2) = 0
        assert_eq!(scores[&0], 0.0);

        let fx = Fixture::new(&["echo echo", "a", "b", "c"]);
        let scores = tfidf_scores(fx.view(), &tokens(&["echo"]), &params);
        let per_entry = 2.0 * (4f64 / 2.0).ln() * 0.5;
        assert!(close(scores[&0], per_entry * 2.0));
    }

    #[test]
    fn unknown_tokens_score_nothing() {
        let fx = Fixture::new(&["alpha beta"]);
        let params = RankingParams::default();
        assert!(tfidf_scores(fx.view(), &tokens(&["gamma"]), &params).is_empty());
        assert!(bm25_scores(fx.view(), &tokens(&["gamma"]), &params).is_empty());
    }

    #[test]
    fn weights_scale_linearly() {
        let fx = Fixture::new(&["the quick brown fox", "the lazy dog"]);
        let base = RankingParams::default();
        let doubled = RankingParams { tfidf_weight: 1.0, bm25_weight: 1.0, ..base };
        let q = tokens(&["fox"]);
        assert!(close(tfidf_scores(fx.view(), &q, &doubled)[&0], 2.0 * tfidf_scores(fx.view(), &q, &base)[&0]));
        assert!(close(bm25_scores(fx.view(), &q, &doubled)[&0], 2.0 * bm25_scores(fx.view(), &q, &base)[&0]));
    }

    #[test]
    fn merge_sums_per_document() {
        let a: Scores = [(0, 1.0), (1, 2.0)].into_iter().collect();
        let b: Scores = [(1, 0.5), (2, 3.0)].into_iter().collect();
        let merged = merge_scores(a, b);
        assert_eq!(merged.into_iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 2.5), (2, 3.0)]);
    }
}
