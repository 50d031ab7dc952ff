use crate::forecast::ForecastRow;
use crate::schema::PricePoint;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a provider fetch is in flight.
pub fn loading_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Print the last rows of a price table, date-indexed.
pub fn print_series_tail(heading: &str, tail: &[PricePoint]) {
    println!("\n== {heading} ==");
    println!("{:<12} {:>12} {:>12}", "Date", "Open", "Close");
    for point in tail {
        match point.open {
            Some(open) => println!("{:<12} {:>12.2} {:>12.2}", point.dated, open, point.close),
            None => println!("{:<12} {:>12} {:>12.2}", point.dated, "-", point.close),
        }
    }
}

/// Print the last rows of a forecast table.
pub fn print_forecast_tail(heading: &str, tail: &[ForecastRow]) {
    println!("\n== {heading} ==");
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12}",
        "Date", "Forecast", "Lower", "Upper", "Trend"
    );
    for row in tail {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            row.ds, row.yhat, row.yhat_lower, row.yhat_upper, row.trend
        );
    }
}
