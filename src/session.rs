//! One user session: input state, the event model, and the render cycle.
//!
//! The cycle re-executes the full page order on every dispatched input,
//! top to bottom: equity load → tail → chart → optional forecast →
//! crypto load → tail → chart → optional forecast. Forecast sections
//! only run when their button event fired since the previous cycle; the
//! button flags are consumed by the cycle that observes them.

use crate::cache::SeriesCache;
use crate::chart::{self, AxisScale, ChartSpec, ComponentsSpec};
use crate::endp::PriceSource;
use crate::error::{Error, Result};
use crate::forecast::{self, ForecastRow, SeasonalTrend};
use crate::schema::{AssetClass, PricePoint, PriceSeries};
use reqwest::Client;

pub const DEFAULT_TICKER: &str = "^N225";
pub const DEFAULT_CRYPTO: &str = "BTC";
pub const MIN_YEARS: u8 = 1;
pub const MAX_YEARS: u8 = 4;
pub const DAYS_PER_YEAR: usize = 365;

/// The crypto forecast always extends 365 days, whatever the slider
/// says; only the equity horizon follows `years`.
pub const CRYPTO_HORIZON_DAYS: usize = 365;

/// Rows shown in every table tail.
pub const TAIL_ROWS: usize = 5;

/// Current values of the user-controlled inputs.
///
/// The two `forecast_*` flags are one-shot button presses, valid for a
/// single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub ticker: String,
    pub crypto: String,
    pub years: u8,
    pub log_scale: bool,
    pub forecast_equity: bool,
    pub forecast_crypto: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            crypto: DEFAULT_CRYPTO.to_string(),
            years: MIN_YEARS,
            log_scale: false,
            forecast_equity: false,
            forecast_crypto: false,
        }
    }
}

/// An input change or button press.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SetTicker(String),
    SetCrypto(String),
    SetYears(u8),
    SetLogScale(bool),
    PressForecastEquity,
    PressForecastCrypto,
}

/// Where the session sits in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Forecasting,
    ForecastReady,
    Error,
}

/// Everything one render cycle produces, in page order.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub equity_tail: Vec<PricePoint>,
    pub equity_chart: ChartSpec,
    pub equity_forecast: Option<ForecastOutput>,
    pub crypto_tail: Vec<PricePoint>,
    pub crypto_chart: ChartSpec,
    pub crypto_forecast: Option<ForecastOutput>,
}

#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub table_tail: Vec<ForecastRow>,
    pub overlay: ChartSpec,
    pub components: ComponentsSpec,
}

/// Session context: input state, phase, and the per-session fetch cache.
#[derive(Debug, Default)]
pub struct Session {
    state: UiState,
    phase: Phase,
    cache: SeriesCache,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Apply one input event to the session state.
    pub fn apply(&mut self, event: Event) -> Result<()> {
        log::debug!("event: {event:?}");
        match event {
            Event::SetTicker(ticker) => self.state.ticker = ticker,
            Event::SetCrypto(crypto) => self.state.crypto = crypto,
            Event::SetYears(years) => {
                if !(MIN_YEARS..=MAX_YEARS).contains(&years) {
                    return Err(Error::InvalidInput(format!(
                        "years must be between {MIN_YEARS} and {MAX_YEARS}, got {years}"
                    )));
                }
                self.state.years = years;
            }
            Event::SetLogScale(on) => self.state.log_scale = on,
            Event::PressForecastEquity => self.state.forecast_equity = true,
            Event::PressForecastCrypto => self.state.forecast_crypto = true,
        }
        Ok(())
    }

    /// Run one full render cycle in page order.
    ///
    /// Any error aborts the cycle and leaves the session in `Error`; the
    /// next cycle starts over from scratch. Button flags are consumed
    /// either way.
    pub async fn run_cycle<E, C>(
        &mut self,
        client: &Client,
        equity_source: &E,
        crypto_source: &C,
    ) -> Result<CycleOutput>
    where
        E: PriceSource,
        C: PriceSource,
    {
        let result = self.cycle_inner(client, equity_source, crypto_source).await;
        self.state.forecast_equity = false;
        self.state.forecast_crypto = false;
        if result.is_err() {
            self.set_phase(Phase::Error);
        }
        result
    }

    async fn cycle_inner<E, C>(
        &mut self,
        client: &Client,
        equity_source: &E,
        crypto_source: &C,
    ) -> Result<CycleOutput>
    where
        E: PriceSource,
        C: PriceSource,
    {
        let ticker = self.state.ticker.clone();
        let crypto = self.state.crypto.clone();
        let ran_forecast = self.state.forecast_equity || self.state.forecast_crypto;

        // equity section
        self.set_phase(Phase::Loading);
        let equity_series = self.cache.load(equity_source, client, &ticker).await?;
        self.set_phase(Phase::Loaded);
        let equity_chart = chart::price_chart(
            &equity_series,
            AssetClass::EquityIndex.into(),
            AxisScale::Linear,
        );
        let equity_forecast = if self.state.forecast_equity {
            let horizon = self.state.years as usize * DAYS_PER_YEAR;
            Some(self.forecast_section(
                &equity_series,
                &SeasonalTrend::default(),
                horizon,
                AxisScale::Linear,
            )?)
        } else {
            None
        };

        // crypto section
        self.set_phase(Phase::Loading);
        let crypto_series = self.cache.load(crypto_source, client, &crypto).await?;
        self.set_phase(Phase::Loaded);
        let crypto_scale = if self.state.log_scale {
            AxisScale::Log
        } else {
            AxisScale::Linear
        };
        let crypto_chart =
            chart::price_chart(&crypto_series, AssetClass::Crypto.into(), crypto_scale);
        let crypto_forecast = if self.state.forecast_crypto {
            // the forecast overlay inherits the log-scale flag
            Some(self.forecast_section(
                &crypto_series,
                &SeasonalTrend::multiplicative(),
                CRYPTO_HORIZON_DAYS,
                crypto_scale,
            )?)
        } else {
            None
        };

        self.set_phase(if ran_forecast {
            Phase::ForecastReady
        } else {
            Phase::Loaded
        });

        Ok(CycleOutput {
            equity_tail: equity_series.tail(TAIL_ROWS).to_vec(),
            equity_chart,
            equity_forecast,
            crypto_tail: crypto_series.tail(TAIL_ROWS).to_vec(),
            crypto_chart,
            crypto_forecast,
        })
    }

    fn forecast_section(
        &mut self,
        series: &PriceSeries,
        config: &SeasonalTrend,
        horizon: usize,
        scale: AxisScale,
    ) -> Result<ForecastOutput> {
        self.set_phase(Phase::Forecasting);
        let frame = forecast::forecast(series, config, horizon)?;
        self.set_phase(Phase::ForecastReady);
        Ok(ForecastOutput {
            table_tail: frame.tail(TAIL_ROWS).to_vec(),
            overlay: chart::forecast_chart(series, &frame, scale),
            components: chart::components_chart(&frame),
        })
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            log::debug!("phase: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}
