//! Market feed trait, rank window, and structured error types.
//!
//! The MarketFeed trait abstracts over where the raw ticker bytes come from
//! (the live HTTP endpoint, or a canned body in tests). The snapshot and the
//! cache file sit above this trait; feeds don't know about either.

use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for market data operations.
///
/// These are designed to be displayable in CLI output without extra context.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("rank window out of range: limit {limit} exceeds {len} records")]
    IndexOutOfRange { limit: usize, len: usize },

    #[error("record {index} is missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("invalid rank window: start {start} is past limit {limit}")]
    InvalidWindow { start: usize, limit: usize },

    #[error("network error: {0}")]
    Network(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MarketError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Half-open `[start, limit)` slice of the ranked currency array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankWindow {
    start: usize,
    limit: usize,
}

impl RankWindow {
    /// Build a window, rejecting `start > limit`. `start == limit` is a valid
    /// empty window.
    pub fn new(start: usize, limit: usize) -> Result<Self, MarketError> {
        if start > limit {
            return Err(MarketError::InvalidWindow { start, limit });
        }
        Ok(Self { start, limit })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of records the window selects.
    pub fn len(&self) -> usize {
        self.limit - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.limit
    }

    /// Check the window against the length of the source array.
    pub fn check(&self, len: usize) -> Result<std::ops::Range<usize>, MarketError> {
        if self.limit > len {
            return Err(MarketError::IndexOutOfRange {
                limit: self.limit,
                len,
            });
        }
        Ok(self.start..self.limit)
    }
}

impl Default for RankWindow {
    fn default() -> Self {
        Self { start: 0, limit: 10 }
    }
}

/// Trait for sources of the raw ticker response body.
///
/// Implementations issue exactly one request per call; there is no retry.
pub trait MarketFeed {
    /// Human-readable name of this feed.
    fn name(&self) -> &str;

    /// Open the response body for `url` as a byte stream.
    ///
    /// Connection failures and non-success statuses surface as
    /// [`MarketError::Network`].
    fn open(&self, url: &str) -> Result<Box<dyn Read>, MarketError>;
}
