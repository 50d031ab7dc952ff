use super::PriceSource;
use crate::error::{Error, Result};
use crate::schema::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

/// Cryptocurrency price history via the CoinMarketCap web API.
///
/// Queried by currency symbol with no date range, which the provider
/// treats as "full history". Quotes are USD; rows arrive newest first
/// and are re-ordered by the series constructor.
pub struct CoinMarketCap;

impl PriceSource for CoinMarketCap {
    async fn fetch(&self, client: &Client, symbol: &str) -> Result<PriceSeries> {
        let url = history_url(symbol);
        log::debug!("[{symbol}] fetching {url}");

        let response = client.get(url).send().await?;
        let history: Historical = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        extran(history, symbol)
    }
}

fn history_url(symbol: &str) -> String {
    format!(
        "https://web-api.coinmarketcap.com/v1/cryptocurrency/ohlcv/historical\
         ?symbol={symbol}&convert=USD"
    )
}

fn extran(history: Historical, symbol: &str) -> Result<PriceSeries> {
    let data = history.data.ok_or_else(|| {
        log::warn!("[{symbol}] no data block in historical response");
        Error::DataUnavailable {
            symbol: symbol.to_string(),
        }
    })?;

    let points = data
        .quotes
        .into_iter()
        .map(|row| {
            let dated = parse_quote_date(&row.time_open)?;
            Ok(PricePoint {
                dated,
                open: None,
                close: row.quote.usd.close,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    PriceSeries::new(symbol, points)
}

fn parse_quote_date(time_open: &str) -> Result<NaiveDate> {
    time_open
        .get(..10)
        .and_then(|day| day.parse().ok())
        .ok_or_else(|| Error::MalformedResponse(format!("unreadable quote date '{time_open}'")))
}

// `historical` response schema
#[derive(Deserialize, Debug)]
pub struct Historical {
    pub data: Option<HistoricalData>,
}

#[derive(Deserialize, Debug)]
pub struct HistoricalData {
    pub quotes: Vec<QuoteRow>,
}

#[derive(Deserialize, Debug)]
pub struct QuoteRow {
    pub time_open: String,
    pub quote: QuoteSet,
}

#[derive(Deserialize, Debug)]
pub struct QuoteSet {
    #[serde(rename = "USD")]
    pub usd: Ohlcv,
}

#[derive(Deserialize, Debug)]
pub struct Ohlcv {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
