pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing, reconfiguring or growing a search engine.
///
/// Apart from [`Error::StoreFull`] these are configuration errors: they surface
/// at startup or from a runtime tuning call, never from `search`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// First membership filter tier sized at zero or beyond the allowed maximum.
    #[error("membership filter capacity must be in 1..={max}, got {0}", max = crate::config::MAX_FILTER_CAPACITY)]
    InvalidCapacity(usize),

    /// False-positive rate outside the open interval (0, 1).
    #[error("false-positive rate must be in (0, 1), got {0}")]
    InvalidFalsePositiveRate(f64),

    /// Growth factor that would not tighten successive tiers, or would
    /// balloon the next tier's allocation.
    #[error("growth factor must be in (1, {max}], got {0}", max = crate::config::MAX_GROWTH_FACTOR)]
    InvalidGrowthFactor(f64),

    #[error("invalid ranking parameter: {0}")]
    InvalidRanking(&'static str),

    /// Every document ID is taken; the store refuses further appends.
    #[error("document store is full ({0} documents)")]
    StoreFull(usize),

    /// Tokenizer pattern did not compile; no searches are possible without it.
    #[error("tokenizer initialization failed: {0}")]
    Tokenizer(#[from] regex::Error),
}
