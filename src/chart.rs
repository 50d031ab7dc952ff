//! Line-chart specifications.
//!
//! The core builds these; a frontend renders them. Nothing here touches
//! the numbers: a log-scale request flips a rendering attribute, never
//! the trace data.

use crate::forecast::ForecastFrame;
use crate::schema::{AssetClass, PriceSeries};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How the y axis is drawn.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    Linear,
    Log,
}

/// Which price fields a raw-data chart carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceFields {
    /// Equity view: one trace per side of the session.
    OpenAndClose,
    /// Crypto view: closes only.
    CloseOnly,
}

impl From<AssetClass> for PriceFields {
    fn from(class: AssetClass) -> Self {
        match class {
            AssetClass::EquityIndex => PriceFields::OpenAndClose,
            AssetClass::Crypto => PriceFields::CloseOnly,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl Trace {
    fn new(name: &str, x: Vec<NaiveDate>, y: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub traces: Vec<Trace>,
    pub y_scale: AxisScale,
    pub range_slider: bool,
}

/// Raw price history chart, range slider always on.
pub fn price_chart(series: &PriceSeries, fields: PriceFields, scale: AxisScale) -> ChartSpec {
    let dates = series.dates();
    let mut traces = Vec::new();

    if fields == PriceFields::OpenAndClose {
        let opens: Vec<f64> = series
            .points
            .iter()
            .map(|p| p.open.unwrap_or(p.close))
            .collect();
        traces.push(Trace::new("Open", dates.clone(), opens));
    }
    traces.push(Trace::new("Close", dates, series.closes()));

    let title = match fields {
        PriceFields::OpenAndClose => "Time Series Data (stock)",
        PriceFields::CloseOnly => "Time Series Data (crypto)",
    };

    ChartSpec {
        title: title.to_string(),
        traces,
        y_scale: scale,
        range_slider: true,
    }
}

/// Actual + forecast + confidence band overlay.
pub fn forecast_chart(series: &PriceSeries, frame: &ForecastFrame, scale: AxisScale) -> ChartSpec {
    let forecast_dates: Vec<NaiveDate> = frame.rows.iter().map(|r| r.ds).collect();

    let traces = vec![
        Trace::new("Actual", series.dates(), series.closes()),
        Trace::new(
            "Forecast",
            forecast_dates.clone(),
            frame.rows.iter().map(|r| r.yhat).collect(),
        ),
        Trace::new(
            "Lower",
            forecast_dates.clone(),
            frame.rows.iter().map(|r| r.yhat_lower).collect(),
        ),
        Trace::new(
            "Upper",
            forecast_dates,
            frame.rows.iter().map(|r| r.yhat_upper).collect(),
        ),
    ];

    ChartSpec {
        title: format!("Forecast plot for {} days", frame.horizon),
        traces,
        y_scale: scale,
        range_slider: true,
    }
}

/// One decomposition panel: labelled x positions and the component value
/// at each.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ComponentPanel {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ComponentsSpec {
    pub title: String,
    pub panels: Vec<ComponentPanel>,
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Trend / weekly / yearly decomposition panels.
///
/// The weekly panel averages the fitted weekly effect per day of week
/// (Monday first); the yearly panel averages per day of year.
pub fn components_chart(frame: &ForecastFrame) -> ComponentsSpec {
    let trend = ComponentPanel {
        name: "trend".to_string(),
        x: frame.rows.iter().map(|r| r.ds.to_string()).collect(),
        y: frame.rows.iter().map(|r| r.trend).collect(),
    };

    let mut weekly_sum = [0.0f64; 7];
    let mut weekly_n = [0usize; 7];
    for row in &frame.rows {
        let day = row.ds.weekday().num_days_from_monday() as usize;
        weekly_sum[day] += row.weekly;
        weekly_n[day] += 1;
    }
    let weekly = ComponentPanel {
        name: "weekly".to_string(),
        x: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
        y: weekly_sum
            .iter()
            .zip(weekly_n.iter())
            .map(|(sum, n)| if *n == 0 { 0.0 } else { sum / *n as f64 })
            .collect(),
    };

    let mut yearly_sum = vec![0.0f64; 366];
    let mut yearly_n = vec![0usize; 366];
    for row in &frame.rows {
        let day = row.ds.ordinal0() as usize;
        yearly_sum[day] += row.yearly;
        yearly_n[day] += 1;
    }
    let (x, y): (Vec<String>, Vec<f64>) = yearly_sum
        .iter()
        .zip(yearly_n.iter())
        .enumerate()
        .filter(|(_, (_, n))| **n > 0)
        .map(|(day, (sum, n))| (format!("day {}", day + 1), sum / *n as f64))
        .unzip();
    let yearly = ComponentPanel {
        name: "yearly".to_string(),
        x,
        y,
    };

    ComponentsSpec {
        title: "Forecast components".to_string(),
        panels: vec![trend, weekly, yearly],
    }
}
