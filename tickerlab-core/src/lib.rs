//! TickerLab core: market snapshot loading, caching, and export.
//!
//! This crate contains everything below the command line:
//! - Snapshot configuration (endpoint URL, rank window, cache path)
//! - Ticker feed over blocking HTTP, with a trait seam for tests
//! - Cache file writing with a metadata sidecar
//! - Typed currency records and the rank-windowed snapshot
//! - Tab-separated CSV export and PNG bar charts

pub mod config;
pub mod data;
pub mod export;

pub use config::{ConfigError, MarketConfig};
pub use data::{CurrencyRecord, MarketError, MarketField, MarketSnapshot, RankWindow};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public data types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<MarketSnapshot>();
        require_sync::<MarketSnapshot>();
        require_send::<CurrencyRecord>();
        require_sync::<CurrencyRecord>();
        require_send::<MarketConfig>();
        require_sync::<MarketConfig>();
        require_send::<data::CacheMeta>();
        require_sync::<data::CacheMeta>();
        require_send::<data::TickerFeed>();
        require_sync::<data::TickerFeed>();

        // Errors cross into anyhow in the CLI
        require_send::<MarketError>();
        require_sync::<MarketError>();
        require_send::<ConfigError>();
        require_sync::<ConfigError>();
        require_send::<export::ExportError>();
        require_sync::<export::ExportError>();
    }

    #[test]
    fn default_config_builds_default_window() {
        let snap = MarketSnapshot::from_config(&MarketConfig::default()).unwrap();
        assert_eq!(snap.window(), RankWindow::default());
        assert!(snap.is_empty());
    }
}
