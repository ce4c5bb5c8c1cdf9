//! Market snapshot: the ranked currency records for one rank window.
//!
//! Both load paths end in [`MarketSnapshot::load_from_reader`]: the whole JSON
//! document is parsed, the window is checked against the array length, and
//! each element in the window is decoded into a [`CurrencyRecord`] keyed by its
//! id. Records are staged and only swapped in once every element decoded, so a
//! failed load leaves the snapshot exactly as it was.

use super::cache;
use super::provider::{MarketError, MarketFeed, RankWindow};
use super::record::{CurrencyRecord, MarketField};
use super::ticker::TickerFeed;
use crate::config::MarketConfig;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Currency records for a rank window, in rank order, indexed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    window: RankWindow,
    records: Vec<CurrencyRecord>,
    index: HashMap<String, usize>,
}

impl MarketSnapshot {
    pub fn new(window: RankWindow) -> Self {
        Self {
            window,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build an empty snapshot for the window described by `config`.
    pub fn from_config(config: &MarketConfig) -> Result<Self, MarketError> {
        Ok(Self::new(config.window()?))
    }

    pub fn window(&self) -> RankWindow {
        self.window
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in rank order.
    pub fn records(&self) -> &[CurrencyRecord] {
        &self.records
    }

    /// Currency ids in rank order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&CurrencyRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Project one metric into an id → value mapping.
    pub fn field(&self, field: MarketField) -> HashMap<String, Value> {
        self.records
            .iter()
            .map(|r| (r.id.clone(), r.value(field).clone()))
            .collect()
    }

    /// Rank-ordered `(id, value)` pairs for a metric, skipping values that
    /// are null or not numeric.
    pub fn series(&self, field: MarketField) -> Vec<(String, f64)> {
        self.records
            .iter()
            .filter_map(|r| match r.numeric(field) {
                Some(v) => Some((r.id.clone(), v)),
                None => {
                    debug!(id = %r.id, %field, "skipping non-numeric value");
                    None
                }
            })
            .collect()
    }

    /// Parse a JSON ticker array from `reader` and replace the snapshot's
    /// records with the ones in the rank window.
    ///
    /// The reader is consumed to the end; trailing non-whitespace is a parse
    /// error.
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<(), MarketError> {
        let doc: Value =
            serde_json::from_reader(reader).map_err(|e| MarketError::Parse(e.to_string()))?;

        let items = doc
            .as_array()
            .ok_or_else(|| MarketError::Parse("top-level JSON value is not an array".into()))?;

        let range = self.window.check(items.len())?;

        let mut records: Vec<CurrencyRecord> = Vec::with_capacity(range.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(range.len());

        for i in range {
            let record = CurrencyRecord::decode(i, &items[i])?;
            match index.get(&record.id) {
                // Same id twice in one window: the later record wins, the
                // earlier rank position is kept.
                Some(&pos) => {
                    warn!(id = %record.id, index = i, "duplicate currency id in window");
                    records[pos] = record;
                }
                None => {
                    index.insert(record.id.clone(), records.len());
                    records.push(record);
                }
            }
        }

        debug!(
            total = items.len(),
            start = self.window.start(),
            limit = self.window.limit(),
            loaded = records.len(),
            "decoded market snapshot"
        );

        self.records = records;
        self.index = index;
        Ok(())
    }

    /// Load from a cache file on disk.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), MarketError> {
        let file = fs::File::open(path).map_err(|e| MarketError::io(path, e))?;
        self.load_from_reader(BufReader::new(file))?;
        info!(path = %path.display(), records = self.len(), "loaded market data from file");
        Ok(())
    }

    /// Fetch `url` over HTTP and load the response.
    ///
    /// With `cache_file`, the raw body is persisted there first and then read
    /// back; without it the body is loaded straight from memory.
    pub fn load_from_url(&mut self, url: &str, cache_file: Option<&Path>) -> Result<(), MarketError> {
        let feed = TickerFeed::new()?;
        self.load_from_feed(&feed, url, cache_file)
    }

    /// Same as [`load_from_url`](Self::load_from_url) with an explicit feed.
    pub fn load_from_feed(
        &mut self,
        feed: &dyn MarketFeed,
        url: &str,
        cache_file: Option<&Path>,
    ) -> Result<(), MarketError> {
        let mut body = feed.open(url)?;

        match cache_file {
            Some(path) => {
                let meta = cache::write_cache(body.as_mut(), path, url)?;
                info!(
                    feed = feed.name(),
                    path = %path.display(),
                    bytes = meta.byte_len,
                    "saved market data"
                );
                self.load_from_file(path)
            }
            None => {
                let mut buf = Vec::new();
                body.read_to_end(&mut buf)
                    .map_err(|e| MarketError::Network(format!("reading response body: {e}")))?;
                debug!(feed = feed.name(), bytes = buf.len(), "loading market data from memory");
                self.load_from_reader(buf.as_slice())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTC: &str = r#"{"id":"bitcoin","market_cap_usd":"100","price_usd":"1","price_btc":"1","24h_volume_usd":"10","percent_change_7d":"5","available_supply":"1000","total_supply":"1000","max_supply":"2000","percent_change_1h":"0.1","percent_change_24h":"1"}"#;
    const ETH: &str = r#"{"id":"ethereum","market_cap_usd":"50","price_usd":"0.5","price_btc":"0.05","24h_volume_usd":"4","percent_change_7d":"-2","available_supply":"900","total_supply":"900","max_supply":null,"percent_change_1h":"0.0","percent_change_24h":"-0.5"}"#;

    fn array(items: &[&str]) -> String {
        format!("[{}]", items.join(","))
    }

    fn window(start: usize, limit: usize) -> MarketSnapshot {
        MarketSnapshot::new(RankWindow::new(start, limit).unwrap())
    }

    #[test]
    fn get_and_ids_follow_rank_order() {
        let mut snap = window(0, 2);
        snap.load_from_reader(array(&[BTC, ETH]).as_bytes()).unwrap();

        let ids: Vec<&str> = snap.ids().collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum"]);
        assert_eq!(snap.get("ethereum").unwrap().price_btc, Value::from("0.05"));
        assert!(snap.get("dogecoin").is_none());
    }

    #[test]
    fn series_skips_null_values() {
        let mut snap = window(0, 2);
        snap.load_from_reader(array(&[BTC, ETH]).as_bytes()).unwrap();

        assert_eq!(
            snap.series(MarketField::PriceUsd),
            vec![("bitcoin".to_string(), 1.0), ("ethereum".to_string(), 0.5)]
        );
        assert_eq!(
            snap.series(MarketField::MaxSupply),
            vec![("bitcoin".to_string(), 2000.0)]
        );
    }

    #[test]
    fn top_level_object_is_parse_error() {
        let mut snap = window(0, 0);
        let err = snap.load_from_reader(&br#"{"id":"bitcoin"}"#[..]).unwrap_err();
        assert!(matches!(err, MarketError::Parse(_)));
    }

    #[test]
    fn trailing_garbage_is_parse_error() {
        let mut snap = window(0, 0);
        let err = snap.load_from_reader(&b"[] []"[..]).unwrap_err();
        assert!(matches!(err, MarketError::Parse(_)));
    }

    #[test]
    fn duplicate_ids_keep_first_position_last_value() {
        let eth_as_btc = ETH.replace("ethereum", "bitcoin");
        let json = array(&[BTC, eth_as_btc.as_str()]);
        let mut snap = window(0, 2);
        snap.load_from_reader(json.as_bytes()).unwrap();

        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get("bitcoin").unwrap().price_usd, Value::from("0.5"));
    }

    #[test]
    fn second_load_replaces_contents() {
        let mut snap = window(0, 2);
        snap.load_from_reader(array(&[BTC, ETH]).as_bytes()).unwrap();

        let only_eth = array(&[ETH]);
        let mut narrow = window(0, 1);
        narrow.load_from_reader(only_eth.as_bytes()).unwrap();
        assert_eq!(narrow.ids().collect::<Vec<_>>(), vec!["ethereum"]);

        snap.window = RankWindow::new(0, 1).unwrap();
        snap.load_from_reader(only_eth.as_bytes()).unwrap();
        assert_eq!(snap, narrow);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut snap = window(0, 1);
        let err = snap
            .load_from_file(Path::new("/definitely/not/here/market_data.txt"))
            .unwrap_err();
        assert!(matches!(err, MarketError::Io { .. }));
    }
}
