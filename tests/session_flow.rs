use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use yosoku::chart::AxisScale;
use yosoku::endp::PriceSource;
use yosoku::error::{Error, Result};
use yosoku::schema::{PricePoint, PriceSeries};
use yosoku::session::{
    Event, Phase, Session, CRYPTO_HORIZON_DAYS, DAYS_PER_YEAR, TAIL_ROWS,
};

/// Provider stub handing out a fixed daily series and counting fetches.
struct StubSource {
    days: usize,
    with_open: bool,
    calls: AtomicUsize,
}

impl StubSource {
    fn new(days: usize, with_open: bool) -> Self {
        Self {
            days,
            with_open,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceSource for StubSource {
    async fn fetch(&self, _client: &Client, symbol: &str) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let points = (0..self.days)
            .map(|i| {
                let close = 50.0 + (i as f64).sin() + 0.2 * i as f64;
                PricePoint {
                    dated: start + chrono::Days::new(i as u64),
                    open: self.with_open.then_some(close - 0.5),
                    close,
                }
            })
            .collect();
        PriceSeries::new(symbol, points)
    }
}

struct DeadSource;

impl PriceSource for DeadSource {
    async fn fetch(&self, _client: &Client, symbol: &str) -> Result<PriceSeries> {
        Err(Error::DataUnavailable {
            symbol: symbol.to_string(),
        })
    }
}

fn sources() -> (StubSource, StubSource) {
    (StubSource::new(90, true), StubSource::new(60, false))
}

#[tokio::test]
async fn page_order_defaults() {
    let (equity, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    let output = session.run_cycle(&client, &equity, &crypto).await.unwrap();

    assert_eq!(session.phase(), Phase::Loaded);
    assert_eq!(output.equity_tail.len(), TAIL_ROWS);
    assert_eq!(output.crypto_tail.len(), TAIL_ROWS);

    let equity_traces: Vec<&str> = output
        .equity_chart
        .traces
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(equity_traces, vec!["Open", "Close"]);

    let crypto_traces: Vec<&str> = output
        .crypto_chart
        .traces
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(crypto_traces, vec!["Close"]);
    assert_eq!(output.crypto_chart.y_scale, AxisScale::Linear);

    // no button press, no forecast sections
    assert!(output.equity_forecast.is_none());
    assert!(output.crypto_forecast.is_none());
}

#[tokio::test]
async fn repeated_cycles_hit_the_cache() {
    let (equity, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    session.run_cycle(&client, &equity, &crypto).await.unwrap();
    session.apply(Event::SetLogScale(true)).unwrap();
    session.run_cycle(&client, &equity, &crypto).await.unwrap();

    assert_eq!(equity.calls(), 1);
    assert_eq!(crypto.calls(), 1);
}

#[tokio::test]
async fn changing_a_symbol_fetches_again() {
    let (equity, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    session.run_cycle(&client, &equity, &crypto).await.unwrap();
    session.apply(Event::SetCrypto("ETH".into())).unwrap();
    session.run_cycle(&client, &equity, &crypto).await.unwrap();

    assert_eq!(equity.calls(), 1);
    assert_eq!(crypto.calls(), 2);
}

#[tokio::test]
async fn log_scale_flips_only_the_crypto_axis() {
    let (equity, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    let linear = session.run_cycle(&client, &equity, &crypto).await.unwrap();
    session.apply(Event::SetLogScale(true)).unwrap();
    let log = session.run_cycle(&client, &equity, &crypto).await.unwrap();

    assert_eq!(log.crypto_chart.y_scale, AxisScale::Log);
    assert_eq!(log.equity_chart.y_scale, AxisScale::Linear);
    // same numbers underneath
    assert_eq!(linear.crypto_chart.traces, log.crypto_chart.traces);
}

#[tokio::test]
async fn forecast_runs_once_per_button_press() {
    let (equity, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    session.apply(Event::PressForecastEquity).unwrap();
    let first = session.run_cycle(&client, &equity, &crypto).await.unwrap();
    assert!(first.equity_forecast.is_some());
    assert!(first.crypto_forecast.is_none());
    assert_eq!(session.phase(), Phase::ForecastReady);
    assert!(!session.state().forecast_equity, "button press must be consumed");

    // next cycle without a press renders no forecast
    let second = session.run_cycle(&client, &equity, &crypto).await.unwrap();
    assert!(second.equity_forecast.is_none());
    assert_eq!(session.phase(), Phase::Loaded);
}

#[tokio::test]
async fn equity_horizon_follows_the_slider() {
    let (equity, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    session.apply(Event::SetYears(2)).unwrap();
    session.apply(Event::PressForecastEquity).unwrap();
    let output = session.run_cycle(&client, &equity, &crypto).await.unwrap();

    let forecast = output.equity_forecast.unwrap();
    let trace = forecast
        .overlay
        .traces
        .iter()
        .find(|t| t.name == "Forecast")
        .unwrap();
    assert_eq!(trace.y.len(), 90 + 2 * DAYS_PER_YEAR);
}

#[tokio::test]
async fn crypto_horizon_ignores_the_slider() {
    let client = Client::new();

    for years in [1u8, 4u8] {
        let (equity, crypto) = sources();
        let mut session = Session::new();
        session.apply(Event::SetYears(years)).unwrap();
        session.apply(Event::PressForecastCrypto).unwrap();
        let output = session.run_cycle(&client, &equity, &crypto).await.unwrap();

        let forecast = output.crypto_forecast.unwrap();
        let trace = forecast
            .overlay
            .traces
            .iter()
            .find(|t| t.name == "Forecast")
            .unwrap();
        assert_eq!(trace.y.len(), 60 + CRYPTO_HORIZON_DAYS);
    }
}

#[tokio::test]
async fn crypto_forecast_inherits_the_log_axis() {
    let (equity, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    session.apply(Event::SetLogScale(true)).unwrap();
    session.apply(Event::PressForecastCrypto).unwrap();
    let output = session.run_cycle(&client, &equity, &crypto).await.unwrap();

    let forecast = output.crypto_forecast.unwrap();
    assert_eq!(forecast.overlay.y_scale, AxisScale::Log);
    assert_eq!(forecast.components.panels.len(), 3);
}

#[tokio::test]
async fn slider_rejects_out_of_range_years() {
    let mut session = Session::new();
    assert!(matches!(
        session.apply(Event::SetYears(0)).unwrap_err(),
        Error::InvalidInput(_)
    ));
    assert!(matches!(
        session.apply(Event::SetYears(5)).unwrap_err(),
        Error::InvalidInput(_)
    ));
    assert!(session.apply(Event::SetYears(4)).is_ok());
}

#[tokio::test]
async fn dead_symbol_aborts_the_cycle() {
    let (_, crypto) = sources();
    let client = Client::new();
    let mut session = Session::new();

    let err = session
        .run_cycle(&client, &DeadSource, &crypto)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DataUnavailable { .. }));
    assert_eq!(session.phase(), Phase::Error);
    // the failed cycle never reached the crypto section
    assert_eq!(crypto.calls(), 0);
}
