use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which upstream family a symbol belongs to.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    EquityIndex,
    Crypto,
}

/// One daily observation.
///
/// `open` is only populated by the equity/index provider; the crypto
/// provider is projected down to closes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub dated: NaiveDate,
    pub open: Option<f64>,
    pub close: f64,
}

/// Daily price history for a single symbol.
///
/// ```text
/// "points": [
///      { "dated": "2015-01-05", "open": 110.4, "close": 109.3 },
///      { "dated": "2015-01-06", "open": 109.1, "close": 107.8 },
///      // ...
/// ]
/// ```
///
/// Dates are strictly increasing and unique; the constructor sorts and
/// de-duplicates whatever order the provider returned. Immutable once
/// built.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from provider rows, restoring the date invariant.
    ///
    /// Rows may arrive in any order (the crypto provider returns newest
    /// first); duplicate dates collapse to a single row. An empty row
    /// set is `DataUnavailable`; adapters never hand out hollow series.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self> {
        let symbol = symbol.into();
        if points.is_empty() {
            return Err(Error::DataUnavailable { symbol });
        }
        points.sort_by_key(|p| p.dated);
        points.dedup_by_key(|p| p.dated);
        Ok(Self { symbol, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].dated
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].dated
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.dated).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Last `n` rows, provider order preserved.
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}
