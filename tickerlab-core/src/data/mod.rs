//! Market data: ticker feed, cache file, record decoding, snapshot

pub mod cache;
pub mod provider;
pub mod record;
pub mod snapshot;
pub mod ticker;

pub use cache::{write_cache, CacheMeta, CHUNK_SIZE};
pub use provider::{MarketError, MarketFeed, RankWindow};
pub use record::{CurrencyRecord, MarketField};
pub use snapshot::MarketSnapshot;
pub use ticker::TickerFeed;
