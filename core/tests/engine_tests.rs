use sift_core::{
    EngineConfig, IdentityCleaner, NewDocument, RankingParams, SearchEngine, StopwordCleaner, WhitespaceTokenizer,
    WordTokenizer,
};
use std::sync::Arc;
use std::thread;

fn docs(contents: &[&str]) -> Vec<NewDocument> {
    contents.iter().map(|c| NewDocument::new(*c)).collect()
}

fn permissive_engine(seed: &[&str]) -> SearchEngine {
    let config = EngineConfig {
        ranking: RankingParams { score_threshold: 0.0, ..Default::default() },
        ..Default::default()
    };
    SearchEngine::new(config, Arc::new(WordTokenizer::new()), Arc::new(StopwordCleaner), docs(seed)).unwrap()
}

#[test]
fn finds_the_fox() {
    let engine = SearchEngine::with_defaults(docs(&["the quick brown fox", "the lazy dog"])).unwrap();
    let results = engine.search("fox", 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, 0);
    assert_eq!(results[0].content, "the quick brown fox");
    assert!(results[0].score > 0.5);
}

#[test]
fn unseen_tokens_return_nothing() {
    let engine = SearchEngine::with_defaults(docs(&["the quick brown fox", "the lazy dog"])).unwrap();
    assert!(engine.might_contain("fox"));
    assert!(engine.search("zebra unicorn", 10).is_empty());
    assert!(engine.search("", 10).is_empty());
}

#[test]
fn stopwords_do_not_change_ranking() {
    let engine = SearchEngine::with_defaults(docs(&["the quick brown fox", "the lazy dog"])).unwrap();
    assert_eq!(engine.search("The fox", 10), engine.search("fox", 10));
}

#[test]
fn non_latin_queries_fall_back_to_raw_text() {
    let engine = SearchEngine::with_defaults(sift_core::corpus::sample_corpus()).unwrap();
    let results = engine.search("아이유", 10);
    assert_eq!(results.len(), 1);
    assert!(results[0].content.starts_with("아이유"));
}

#[test]
fn query_is_lowercased() {
    let engine = SearchEngine::new(
        EngineConfig::default(),
        Arc::new(WhitespaceTokenizer),
        Arc::new(IdentityCleaner),
        docs(&["The Quick brown FOX", "the lazy dog"]),
    )
    .unwrap();
    assert_eq!(engine.search("FoX", 10).len(), 1);
}

#[test]
fn results_are_limited_sorted_and_thresholded() {
    let mut seed: Vec<String> = (0..30).map(|i| format!("needle {}", "hay ".repeat(i))).collect();
    seed.extend((0..30).map(|i| format!("filler text number {i}")));
    let seed: Vec<&str> = seed.iter().map(String::as_str).collect();
    let engine = permissive_engine(&seed);

    let results = engine.search("needle", 5);
    assert_eq!(results.len(), 5);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.iter().all(|r| r.score >= 0.0));
    // shorter documents saturate less, so the bare needle ranks first
    assert_eq!(results[0].id, 0);

    engine.update_ranking(|r| r.score_threshold = 1e9).unwrap();
    assert!(engine.search("needle", 5).is_empty());
}

#[test]
fn full_width_documents_are_found() {
    let engine = SearchEngine::with_defaults(docs(&["the ｆｏｘ ran", "a lazy dog", "a cat"])).unwrap();
    let results = engine.search("fox", 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, 0);
    assert!(results[0].score > 0.5, "score {}", results[0].score);

    // full-width queries fold the same way
    assert_eq!(engine.search("ＦＯＸ", 10), results);
}

#[test]
fn ligatures_are_found() {
    let engine = SearchEngine::with_defaults(docs(&["ﬁsh and chips", "a lazy dog", "a cat"])).unwrap();
    let results = engine.search("fish", 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, 0);
}

#[test]
fn ids_follow_insertion_order() {
    let engine = SearchEngine::with_defaults(docs(&["one", "two"])).unwrap();
    assert_eq!(engine.len(), 2);
    let ids = engine.add_documents(docs(&["three", "four", "five"])).unwrap();
    assert_eq!(ids, vec![2, 3, 4]);
    assert_eq!(engine.len(), 5);
    assert_eq!(engine.document(3).unwrap().content, "four");
    assert!(engine.document(5).is_none());
}

#[test]
fn average_length_tracks_every_add() {
    let engine = SearchEngine::with_defaults(docs(&["the quick brown fox", "the lazy dog"])).unwrap();
    let stats = engine.stats();
    assert_eq!(stats.corpus.total_doc_count, 2);
    assert_eq!(stats.corpus.avg_doc_length, 15.5);

    for text in ["a", "somewhat longer document body", "mid length"] {
        engine.add_document(NewDocument::new(text)).unwrap();
        let s = engine.stats();
        assert_eq!(s.corpus.avg_doc_length, s.corpus.total_doc_len as f64 / s.corpus.total_doc_count as f64);
        assert_eq!(s.documents as u64, s.corpus.total_doc_count);
    }
}

#[test]
fn added_documents_become_searchable() {
    let engine = SearchEngine::with_defaults(docs(&["the quick brown fox", "the lazy dog", "a sleepy cat"])).unwrap();
    assert!(engine.search("walrus", 10).is_empty());
    let id = engine
        .add_document(NewDocument::with_url("the walrus and the carpenter", "https://walrus.example"))
        .unwrap();
    let results = engine.search("walrus", 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, id);
    assert_eq!(results[0].url.as_deref(), Some("https://walrus.example"));
}

#[test]
fn every_indexed_token_passes_the_filter() {
    let engine = permissive_engine(&[]);
    let tokens: Vec<String> = (0..3000).map(|i| format!("word{i}x")).collect();
    for chunk in tokens.chunks(100) {
        engine.add_document(NewDocument::new(chunk.join(" "))).unwrap();
    }
    let state = engine.state();
    assert!(state.filter.tiers().len() > 1);
    assert_eq!(state.index.vocabulary_size(), 3000);
    assert!(state.index.tokens().all(|t| state.filter.test(t)));
}

#[test]
fn concurrent_writers_lose_nothing() {
    let engine = SearchEngine::with_defaults(docs(&["seed document"])).unwrap();
    thread::scope(|s| {
        s.spawn(|| engine.add_document(NewDocument::new("shared left")).unwrap());
        s.spawn(|| engine.add_document(NewDocument::new("shared right")).unwrap());
    });
    assert_eq!(engine.len(), 3);

    let state = engine.state();
    let mut postings = state.index.postings("shared").unwrap().to_vec();
    postings.sort_unstable();
    assert_eq!(postings, vec![1, 2]);
    assert_eq!(state.stats.total_doc_count, 3);
}

#[test]
fn readers_never_see_torn_updates() {
    let engine = SearchEngine::with_defaults(docs(&["seed document"])).unwrap();
    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                engine.add_document(NewDocument::new(format!("batch entry {i}"))).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..200 {
                let state = engine.state();
                let n = state.documents.len();
                assert_eq!(state.stats.total_doc_count as usize, n);
                let entries = state.index.postings("batch").map_or(0, |p| p.len());
                assert_eq!(entries, n - 1);
            }
        });
    });
    assert_eq!(engine.len(), 201);
}

#[test]
fn invalid_configuration_fails_fast() {
    let mut config = EngineConfig::default();
    config.filter.initial_capacity = 0;
    let built = SearchEngine::new(config, Arc::new(WordTokenizer::new()), Arc::new(StopwordCleaner), Vec::new());
    assert!(matches!(built, Err(sift_core::Error::InvalidCapacity(0))));
}
