//! Per-session memoization of provider fetches.

use crate::endp::PriceSource;
use crate::error::Result;
use crate::schema::PriceSeries;
use reqwest::Client;
use std::collections::HashMap;

/// Session-scoped store of fetched histories, keyed by the raw requested
/// symbol (before any exchange-suffix normalization).
///
/// No TTL and no eviction: a session touches a symbol or two, and the
/// store dies with the session. Failed fetches are never stored, so the
/// next cycle retries from scratch.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: HashMap<String, PriceSeries>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached series for `symbol`, fetching through `source`
    /// on a miss.
    pub async fn load<S: PriceSource>(
        &mut self,
        source: &S,
        client: &Client,
        symbol: &str,
    ) -> Result<PriceSeries> {
        if let Some(series) = self.entries.get(symbol) {
            log::debug!("[{symbol}] cache hit ({} rows)", series.len());
            return Ok(series.clone());
        }

        let series = source.fetch(client, symbol).await?;
        log::info!("[{symbol}] fetched {} rows", series.len());
        self.entries.insert(symbol.to_string(), series.clone());
        Ok(series)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
