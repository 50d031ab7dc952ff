use super::PriceSource;
use crate::error::{Error, Result};
use crate::schema::{PricePoint, PriceSeries};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer};

/// Histories always start here; the far end is "today" at request time.
pub const START: &str = "2015-01-01";

/// Equity & index price history via the Yahoo! Finance chart endpoint.
pub struct YahooFinance;

impl PriceSource for YahooFinance {
    async fn fetch(&self, client: &Client, symbol: &str) -> Result<PriceSeries> {
        let ticker = normalize_ticker(symbol);
        let start: NaiveDate = START.parse().expect("START is a valid date literal");
        let end = Utc::now().date_naive();
        let url = price_url(&ticker, start, end);
        log::debug!("[{symbol}] fetching {url}");

        let response = client.get(url).send().await?;
        let history: PriceHistory = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        extran(history, symbol)
    }
}

/// Purely numeric codes are taken to be Tokyo-exchange listings and get
/// the `.T` market suffix; anything else queries as typed.
pub fn normalize_ticker(symbol: &str) -> String {
    if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit()) {
        format!("{symbol}.T")
    } else {
        symbol.to_string()
    }
}

fn price_url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
    let period1 = start.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp()).unwrap_or(0);
    let period2 = end.and_hms_opt(23, 59, 59).map(|t| t.and_utc().timestamp()).unwrap_or(0);
    format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{ticker}\
         ?period1={period1}&period2={period2}&interval=1d&events=history"
    )
}

/// Flatten the chart response into a [`PriceSeries`].
///
/// Rows where the provider filled `close` with null (halted days) are
/// dropped; a missing result block or an all-null set is `DataUnavailable`.
fn extran(history: PriceHistory, symbol: &str) -> Result<PriceSeries> {
    let data = history.chart.result.ok_or_else(|| {
        log::warn!("[{symbol}] no result block in chart response");
        Error::DataUnavailable {
            symbol: symbol.to_string(),
        }
    })?;

    let base = data.into_iter().next().ok_or_else(|| Error::DataUnavailable {
        symbol: symbol.to_string(),
    })?;
    let quote = base
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedResponse("chart result carries no quote set".into()))?;

    let points = base
        .dates
        .iter()
        .zip(quote.open.iter())
        .zip(quote.close.iter())
        .filter_map(|((dated, open), close)| {
            close.map(|close| PricePoint {
                dated: *dated,
                open: *open,
                close,
            })
        })
        .collect::<Vec<_>>();

    PriceSeries::new(symbol, points)
}

// `chart` response schema
#[derive(Deserialize, Debug)]
pub struct PriceHistory {
    pub chart: PriceResponse,
}

#[derive(Deserialize, Debug)]
pub struct PriceResponse {
    pub result: Option<Vec<PriceCategories>>,
}

#[derive(Deserialize, Debug)]
pub struct PriceCategories {
    #[serde(rename = "timestamp", deserialize_with = "de_timestamps")]
    pub dates: Vec<NaiveDate>,
    pub indicators: Indicators,
}

fn de_timestamps<'de, D>(deserializer: D) -> std::result::Result<Vec<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamps: Vec<i64> = Deserialize::deserialize(deserializer)?;
    timestamps
        .into_iter()
        .map(|timestamp| {
            DateTime::from_timestamp(timestamp, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| serde::de::Error::custom(format!("bad unix timestamp {timestamp}")))
        })
        .collect()
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
pub struct Quote {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<i64>>,
}
