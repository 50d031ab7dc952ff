//! Error types shared across the crate.

use thiserror::Error;

/// Everything that can go wrong during a session cycle.
///
/// Nothing here is retried or recovered locally; errors propagate to the
/// binary, which reports them and ends the current cycle. The next cycle
/// starts again from scratch.
#[derive(Debug, Error)]
pub enum Error {
    /// The provider answered, but had no rows for the symbol.
    #[error("no price data available for symbol '{symbol}'")]
    DataUnavailable { symbol: String },

    /// Model fitting needs at least two observations.
    #[error("not enough data to fit a model: {rows} row(s), need at least 2")]
    InsufficientData { rows: usize },

    /// The provider could not be reached at all.
    #[error("upstream provider unreachable: {0}")]
    UpstreamUnreachable(#[from] reqwest::Error),

    /// The provider answered with a body we could not decode.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// A user input failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type with our custom error.
pub type Result<T> = std::result::Result<T, Error>;
