//! Seasonal-trend forecasting.
//!
//! A price series is projected down to a two-column training frame
//! (`ds`, `y`), a decomposition model is fitted on it, and predictions
//! run over the historical dates plus a future horizon.

pub mod seasonal_trend;

pub use seasonal_trend::{SeasonalTrend, TrainedSeasonalTrend};

use crate::error::Result;
use crate::schema::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a seasonal component is fitted.
///
/// `Auto` follows the span of the training data: weekly needs at least
/// two weeks of history, yearly at least two years.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seasonality {
    Auto,
    Enabled,
    Disabled,
}

/// How seasonal effects combine with the trend.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalityMode {
    /// Effects are added to the trend; suits roughly linear series.
    Additive,
    /// Effects scale with the trend; suits series whose seasonal swing
    /// grows with the level.
    Multiplicative,
}

/// Two-column model input: dates and the values to fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingFrame {
    pub ds: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl TrainingFrame {
    /// Project a price series to (date, close) pairs under the column
    /// names the model expects.
    pub fn from_series(series: &PriceSeries) -> Self {
        Self {
            ds: series.dates(),
            y: series.closes(),
        }
    }

    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }
}

/// One predicted date.
///
/// For an additive fit the component columns are in price units and
/// `yhat = trend + weekly + yearly`; for a multiplicative fit they are
/// fractions of the trend and `yhat = trend * (1 + weekly + yearly)`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
}

/// Predictions over every historical date plus `horizon` future days.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ForecastFrame {
    pub rows: Vec<ForecastRow>,
    pub horizon: usize,
}

impl ForecastFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}

/// Fit `config` on the series and predict `horizon` days past its last
/// date. This is the whole calling contract in one place: project,
/// fit, extend, predict.
pub fn forecast(
    series: &PriceSeries,
    config: &SeasonalTrend,
    horizon: usize,
) -> Result<ForecastFrame> {
    let frame = TrainingFrame::from_series(series);
    let model = config.fit(&frame)?;
    let future = model.make_future_dates(horizon);
    Ok(model.predict(&future))
}
