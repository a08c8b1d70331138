//! Engine tunables and their defaults.
//!
//! Defaults are compile-time constants; a deployment overrides them by
//! deserializing an [`EngineConfig`] (every field is optional in JSON).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// BM25 term frequency saturation parameter.
pub const DEFAULT_K1: f64 = 1.2;

/// BM25 document length normalization strength. 0.0 disables normalization.
pub const DEFAULT_B: f64 = 0.75;

/// Share of the merged score contributed by TF-IDF.
pub const DEFAULT_TFIDF_WEIGHT: f64 = 0.5;

/// Share of the merged score contributed by BM25.
pub const DEFAULT_BM25_WEIGHT: f64 = 0.5;

/// Documents whose merged score falls strictly below this are dropped.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Number of distinct tokens the first membership filter tier is sized for.
pub const DEFAULT_FILTER_CAPACITY: usize = 1024;

/// Target false-positive rate of the first membership filter tier.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Capacity multiplier (and false-positive divisor) between filter tiers.
pub const DEFAULT_GROWTH_FACTOR: f64 = 2.0;

/// Largest first-tier capacity accepted (about 20 MiB of bits at 1% false positives).
pub const MAX_FILTER_CAPACITY: usize = 1 << 24;

/// Largest accepted growth factor between filter tiers.
pub const MAX_GROWTH_FACTOR: f64 = 16.0;

/// Margin kept below `u64::MAX` when accumulating total corpus length.
pub const LENGTH_HEADROOM: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    pub k1: f64,
    pub b: f64,
    pub tfidf_weight: f64,
    pub bm25_weight: f64,
    pub score_threshold: f64,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
            tfidf_weight: DEFAULT_TFIDF_WEIGHT,
            bm25_weight: DEFAULT_BM25_WEIGHT,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

impl RankingParams {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::InvalidRanking("k1 must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidRanking("b must be in [0, 1]"));
        }
        if !self.tfidf_weight.is_finite() || !self.bm25_weight.is_finite() {
            return Err(Error::InvalidRanking("scoring weights must be finite"));
        }
        if !self.score_threshold.is_finite() {
            return Err(Error::InvalidRanking("score threshold must be finite"));
        }
        Ok(())
    }
}

/// Sizing of the scalable membership filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub initial_capacity: usize,
    pub false_positive_rate: f64,
    pub growth_factor: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_FILTER_CAPACITY,
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 || self.initial_capacity > MAX_FILTER_CAPACITY {
            return Err(Error::InvalidCapacity(self.initial_capacity));
        }
        // NaN fails both comparisons
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(Error::InvalidFalsePositiveRate(self.false_positive_rate));
        }
        if !(self.growth_factor > 1.0 && self.growth_factor <= MAX_GROWTH_FACTOR) {
            return Err(Error::InvalidGrowthFactor(self.growth_factor));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ranking: RankingParams,
    pub filter: FilterConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.ranking.validate()?;
        self.filter.validate()
    }

    /// Parse a JSON config; fields that are absent keep their defaults.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
