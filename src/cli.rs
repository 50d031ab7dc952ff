use crate::session::{Event, MAX_YEARS, MIN_YEARS};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one session cycle from the given inputs.
    Run(SessionArgs),

    /// Start an interactive session: each input line dispatches an event
    /// and re-renders the cycle.
    Interactive(SessionArgs),
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Ticker or market code for the equity/index view; purely numeric
    /// codes are treated as Tokyo-exchange listings.
    #[arg(long, default_value = "^N225")]
    pub ticker: String,

    /// Currency symbol for the crypto view (BTC, ETH, LINK, ...).
    #[arg(long, default_value = "BTC")]
    pub crypto: String,

    /// Forecast horizon for the equity view, in years.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(MIN_YEARS as i64..=MAX_YEARS as i64))]
    pub years: u8,

    /// Draw the crypto chart with a logarithmic y axis.
    #[arg(long)]
    pub log_scale: bool,

    /// Press the equity forecast button for this cycle.
    #[arg(long)]
    pub forecast_stock: bool,

    /// Press the crypto forecast button for this cycle.
    #[arg(long)]
    pub forecast_crypto: bool,

    /// Directory the chart specifications are written to.
    #[arg(long, default_value = "out")]
    pub out: PathBuf,
}

impl SessionArgs {
    /// The input events this argument set implies, in dispatch order.
    pub fn events(&self) -> Vec<Event> {
        let mut events = vec![
            Event::SetTicker(self.ticker.clone()),
            Event::SetCrypto(self.crypto.clone()),
            Event::SetYears(self.years),
            Event::SetLogScale(self.log_scale),
        ];
        if self.forecast_stock {
            events.push(Event::PressForecastEquity);
        }
        if self.forecast_crypto {
            events.push(Event::PressForecastCrypto);
        }
        events
    }
}

/// One parsed line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Dispatch(Event),
    Show,
    Quit,
}

/// Parse an interactive command line.
///
/// Grammar: `ticker <SYM>` | `crypto <SYM>` | `years <1-4>` |
/// `log on|off` | `forecast stock|crypto` | `show` | `quit`.
pub fn parse_directive(line: &str) -> Option<Directive> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let arg = words.next();

    let directive = match (head, arg) {
        ("ticker", Some(symbol)) => Directive::Dispatch(Event::SetTicker(symbol.to_string())),
        ("crypto", Some(symbol)) => Directive::Dispatch(Event::SetCrypto(symbol.to_string())),
        ("years", Some(n)) => Directive::Dispatch(Event::SetYears(n.parse().ok()?)),
        ("log", Some("on")) => Directive::Dispatch(Event::SetLogScale(true)),
        ("log", Some("off")) => Directive::Dispatch(Event::SetLogScale(false)),
        ("forecast", Some("stock")) => Directive::Dispatch(Event::PressForecastEquity),
        ("forecast", Some("crypto")) => Directive::Dispatch(Event::PressForecastCrypto),
        ("show", None) => Directive::Show,
        ("quit", None) | ("exit", None) => Directive::Quit,
        _ => return None,
    };
    Some(directive)
}
