//! Scalable Bloom filter over the index vocabulary.
//!
//! A [`ScalableBloomFilter`] is an arena of fixed-size [`BloomFilter`] tiers.
//! Adds always go to the newest tier; once that tier has absorbed as many
//! items as it was sized for, a larger and stricter tier is appended. Tests
//! consult every tier, so an added item is never reported absent.

use crate::config::FilterConfig;
use crate::error::Result;
use std::collections::hash_map::DefaultHasher;
use std::f64::consts::LN_2;
use std::hash::Hasher;

/// Salt mixed into the second hash so the two probes are independent.
const SECOND_HASH_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Smallest bit array a tier will allocate.
const MIN_BITS: u64 = 64;

/// A single fixed-capacity Bloom filter tier.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
    capacity: usize,
    false_positive_rate: f64,
    count: usize,
}

impl BloomFilter {
    /// Size a filter for `capacity` items at the given false-positive rate.
    ///
    /// Uses the optimal bit count `m = -n ln p / (ln 2)^2` and hash count
    /// `k = (m / n) ln 2`.
    pub fn new(capacity: usize, false_positive_rate: f64) -> Self {
        let n = capacity.max(1) as f64;
        let num_bits = ((-n * false_positive_rate.ln()) / (LN_2 * LN_2))
            .ceil()
            .max(MIN_BITS as f64) as u64;
        let num_hashes = ((num_bits as f64 / n) * LN_2).round().max(1.0) as u32;
        let words = num_bits.div_ceil(64) as usize;
        Self {
            bits: vec![0; words],
            num_bits,
            num_hashes,
            capacity,
            false_positive_rate,
            count: 0,
        }
    }

    pub fn insert(&mut self, item: &[u8]) {
        let (h1, h2) = hash_pair(item);
        for i in 0..self.num_hashes {
            let bit = self.position(h1, h2, i);
            self.bits[(bit / 64) as usize] |= 1u64 << (bit % 64);
        }
        self.count += 1;
    }

    pub fn contains(&self, item: &[u8]) -> bool {
        let (h1, h2) = hash_pair(item);
        (0..self.num_hashes).all(|i| {
            let bit = self.position(h1, h2, i);
            self.bits[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0
        })
    }

    // Kirsch-Mitzenmacher double hashing: g_i(x) = h1(x) + i * h2(x)
    fn position(&self, h1: u64, h2: u64, i: u32) -> u64 {
        h1.wrapping_add((i as u64).wrapping_mul(h2)) % self.num_bits
    }

    /// True once the tier has absorbed as many items as it was sized for.
    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    /// Expected fraction of set bits given the number of inserts so far.
    pub fn estimated_fill_ratio(&self) -> f64 {
        1.0 - (-(self.num_hashes as f64) * self.count as f64 / self.num_bits as f64).exp()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

fn hash_pair(item: &[u8]) -> (u64, u64) {
    let mut first = DefaultHasher::new();
    first.write(item);
    let mut second = DefaultHasher::new();
    second.write_u64(SECOND_HASH_SALT);
    second.write(item);
    // odd stride so successive probes never collapse onto one bit
    (first.finish(), second.finish() | 1)
}

/// Growable Bloom filter made of tiers with geometrically increasing capacity
/// and geometrically decreasing false-positive rate.
#[derive(Debug, Clone)]
pub struct ScalableBloomFilter {
    tiers: Vec<BloomFilter>,
    growth_factor: f64,
}

impl ScalableBloomFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tiers: vec![BloomFilter::new(config.initial_capacity, config.false_positive_rate)],
            growth_factor: config.growth_factor,
        })
    }

    /// Record `item`. Appends a new tier first if the current one is full.
    pub fn add(&mut self, item: impl AsRef<[u8]>) {
        if self.current().is_full() {
            let next = self.next_tier();
            tracing::debug!(
                tier = self.tiers.len(),
                capacity = next.capacity(),
                false_positive_rate = next.false_positive_rate(),
                "membership filter tier added"
            );
            self.tiers.push(next);
        }
        let last = self.tiers.len() - 1;
        self.tiers[last].insert(item.as_ref());
    }

    /// Whether `item` may have been added. Never false for an added item.
    pub fn test(&self, item: impl AsRef<[u8]>) -> bool {
        let item = item.as_ref();
        self.tiers.iter().any(|tier| tier.contains(item))
    }

    fn current(&self) -> &BloomFilter {
        &self.tiers[self.tiers.len() - 1]
    }

    fn next_tier(&self) -> BloomFilter {
        let prev = self.current();
        let capacity = (prev.capacity() as f64 * self.growth_factor).ceil() as usize;
        let rate = prev.false_positive_rate() / self.growth_factor;
        BloomFilter::new(capacity, rate)
    }

    pub fn tiers(&self) -> &[BloomFilter] {
        &self.tiers
    }

    /// Total number of adds across all tiers.
    pub fn len(&self) -> usize {
        self.tiers.iter().map(BloomFilter::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upper bound on the aggregate false-positive rate: `1 - Π(1 - p_i)`.
    pub fn false_positive_bound(&self) -> f64 {
        1.0 - self
            .tiers
            .iter()
            .map(|t| 1.0 - t.false_positive_rate())
            .product::<f64>()
    }
}
