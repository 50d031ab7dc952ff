//! Price history & forecast sessions for stocks, indices, and crypto.
//!
//! One session fetches daily histories from two upstream providers
//! (Yahoo! Finance for equities/indices, CoinMarketCap for crypto),
//! memoizes them for the session's lifetime, and renders table tails
//! plus line-chart specifications. On request it fits a seasonal-trend
//! decomposition model and renders the forecast table, the overlay
//! chart, and the component panels.

pub mod cache;
pub mod chart;
pub mod cli;
pub mod endp;
pub mod error;
pub mod forecast;
pub mod schema;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
pub use schema::{AssetClass, PricePoint, PriceSeries};
pub use session::{Event, Phase, Session};
