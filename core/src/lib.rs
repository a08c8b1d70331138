//! In-memory full-text retrieval core.
//!
//! Documents are appended to an ID-ordered store and indexed into
//! occurrence-counted posting lists. A scalable Bloom filter over the
//! vocabulary rejects queries that cannot match before any scoring happens,
//! and surviving query tokens are ranked by a weighted sum of TF-IDF and BM25.
//!
//! Tokenization and query cleaning are pluggable through [`Tokenizer`] and
//! [`QueryCleaner`]; [`SearchEngine`] ties everything together behind a
//! single read/write lock.

pub mod bloom;
pub mod cleaning;
pub mod config;
pub mod corpus;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod scoring;
pub mod tokenizer;

pub use bloom::{BloomFilter, ScalableBloomFilter};
pub use cleaning::{detect_language, IdentityCleaner, Language, QueryCleaner, StopwordCleaner};
pub use config::{EngineConfig, FilterConfig, RankingParams};
pub use document::{DocId, Document, DocumentStore, NewDocument, ScoredDocument};
pub use engine::{CorpusStats, EngineState, EngineStats, SearchEngine};
pub use error::{Error, Result};
pub use index::InvertedIndex;
pub use tokenizer::{Tokenizer, WhitespaceTokenizer, WordTokenizer};
