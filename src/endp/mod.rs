//! Upstream price-history providers.
//!
//! Each provider is a unit struct implementing [`PriceSource`]; the
//! session only ever talks to the trait, which keeps the network edge
//! swappable in tests.

pub mod coinmarketcap;
pub mod yahoo_finance;

pub use coinmarketcap::CoinMarketCap;
pub use yahoo_finance::YahooFinance;

use crate::error::Result;
use crate::schema::PriceSeries;
use reqwest::Client;
use std::future::Future;

/// How a daily price history is fetched for one symbol.
pub trait PriceSource {
    fn fetch(
        &self,
        client: &Client,
        symbol: &str,
    ) -> impl Future<Output = Result<PriceSeries>> + Send;
}
