//! Piecewise-linear trend with Fourier seasonality.
//!
//! The trend is a linear segment per changepoint region, changepoints
//! spread uniformly over the first `changepoint_range` fraction of the
//! training span, solved by ridge-regularized least squares. Weekly and
//! yearly cycles are low-order Fourier expansions fitted on the
//! detrended series. Daily terms are never generated.

use super::{ForecastFrame, ForecastRow, Seasonality, SeasonalityMode, TrainingFrame};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use std::f64::consts::TAU;

const WEEKLY_PERIOD: f64 = 7.0;
const WEEKLY_ORDER: usize = 3;
const YEARLY_PERIOD: f64 = 365.25;
const YEARLY_ORDER: usize = 10;

/// Minimum history span before an `Auto` component switches on.
const WEEKLY_AUTO_MIN_DAYS: f64 = 14.0;
const YEARLY_AUTO_MIN_DAYS: f64 = 730.0;

/// Ridge weights: stiff on changepoint slope adjustments, light on
/// seasonal coefficients.
const DELTA_RIDGE: f64 = 0.1;
const SEASONAL_RIDGE: f64 = 0.01;

/// Untrained seasonal-trend model configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalTrend {
    /// Fraction of the history span in which trend changepoints may sit.
    pub changepoint_range: f64,
    pub n_changepoints: usize,
    pub yearly_seasonality: Seasonality,
    pub weekly_seasonality: Seasonality,
    /// Kept for call-site symmetry; daily terms are never generated.
    pub daily_seasonality: Seasonality,
    pub seasonality_mode: SeasonalityMode,
    /// Width of the confidence interval, e.g. 0.8 for 80%.
    pub interval_width: f64,
}

impl Default for SeasonalTrend {
    fn default() -> Self {
        Self {
            changepoint_range: 0.8,
            n_changepoints: 25,
            yearly_seasonality: Seasonality::Auto,
            weekly_seasonality: Seasonality::Auto,
            daily_seasonality: Seasonality::Disabled,
            seasonality_mode: SeasonalityMode::Additive,
            interval_width: 0.8,
        }
    }
}

impl SeasonalTrend {
    /// Configuration used for the crypto forecast: trend changepoints on
    /// the first 80% of the span, automatic yearly/weekly cycles, no
    /// daily cycle, seasonality scaling with the trend.
    pub fn multiplicative() -> Self {
        Self {
            changepoint_range: 0.8,
            yearly_seasonality: Seasonality::Auto,
            weekly_seasonality: Seasonality::Auto,
            daily_seasonality: Seasonality::Disabled,
            seasonality_mode: SeasonalityMode::Multiplicative,
            ..Self::default()
        }
    }

    /// Fit the model on historical (ds, y) pairs.
    pub fn fit(&self, frame: &TrainingFrame) -> Result<TrainedSeasonalTrend> {
        let n = frame.len();
        if n < 2 {
            return Err(Error::InsufficientData { rows: n });
        }

        let start = frame.ds[0];
        let last = frame.ds[n - 1];
        let span_days = (last - start).num_days() as f64;
        if span_days <= 0.0 {
            return Err(Error::InvalidInput(
                "training dates must be strictly increasing".into(),
            ));
        }

        // scale time to [0,1] and values by the largest magnitude
        let days: Vec<f64> = frame
            .ds
            .iter()
            .map(|d| (*d - start).num_days() as f64)
            .collect();
        let t: Vec<f64> = days.iter().map(|d| d / span_days).collect();
        let y_scale = frame
            .y
            .iter()
            .fold(0.0f64, |acc, y| acc.max(y.abs()))
            .max(1e-12);
        let y: Vec<f64> = frame.y.iter().map(|y| y / y_scale).collect();

        let n_changepoints = self.n_changepoints.min(n.saturating_sub(2));
        let changepoints: Vec<f64> = (1..=n_changepoints)
            .map(|j| self.changepoint_range * j as f64 / (n_changepoints + 1) as f64)
            .collect();

        // trend: y ~ m + k*t + sum_j delta_j * max(t - s_j, 0)
        let trend_rows: Vec<Vec<f64>> = t.iter().map(|ti| trend_features(*ti, &changepoints)).collect();
        let mut ridge = vec![0.0; 2 + changepoints.len()];
        for r in ridge.iter_mut().skip(2) {
            *r = DELTA_RIDGE;
        }
        let trend_coef = least_squares(&trend_rows, &y, &ridge)?;
        let trend: Vec<f64> = trend_rows.iter().map(|row| dot(row, &trend_coef)).collect();

        // seasonality fits on the detrended series
        let weekly_on = self.weekly_seasonality.resolve(span_days, WEEKLY_AUTO_MIN_DAYS);
        let yearly_on = self.yearly_seasonality.resolve(span_days, YEARLY_AUTO_MIN_DAYS);
        let residual: Vec<f64> = match self.seasonality_mode {
            SeasonalityMode::Additive => y.iter().zip(&trend).map(|(y, g)| y - g).collect(),
            SeasonalityMode::Multiplicative => y
                .iter()
                .zip(&trend)
                .map(|(y, g)| y / clamp_away_from_zero(*g) - 1.0)
                .collect(),
        };

        let weekly_beta = if weekly_on {
            let rows: Vec<Vec<f64>> = days.iter().map(|d| fourier(*d, WEEKLY_PERIOD, WEEKLY_ORDER)).collect();
            least_squares(&rows, &residual, &vec![SEASONAL_RIDGE; 2 * WEEKLY_ORDER])?
        } else {
            vec![0.0; 2 * WEEKLY_ORDER]
        };
        // yearly fits on what the weekly terms left behind
        let after_weekly: Vec<f64> = days
            .iter()
            .zip(&residual)
            .map(|(d, r)| r - dot(&fourier(*d, WEEKLY_PERIOD, WEEKLY_ORDER), &weekly_beta))
            .collect();
        let yearly_beta = if yearly_on {
            let rows: Vec<Vec<f64>> = days.iter().map(|d| fourier(*d, YEARLY_PERIOD, YEARLY_ORDER)).collect();
            least_squares(&rows, &after_weekly, &vec![SEASONAL_RIDGE; 2 * YEARLY_ORDER])?
        } else {
            vec![0.0; 2 * YEARLY_ORDER]
        };

        let model = TrainedSeasonalTrend {
            seasonality_mode: self.seasonality_mode,
            interval_width: self.interval_width,
            history_ds: frame.ds.clone(),
            start,
            last_train: last,
            span_days,
            y_scale,
            changepoints,
            trend_coef,
            weekly_beta,
            yearly_beta,
            sigma: 0.0,
        };

        // in-sample residual deviation drives the confidence band
        let sigma = {
            let mut sq = 0.0;
            for (ds, y_raw) in frame.ds.iter().zip(&frame.y) {
                let err = y_raw - model.point_estimate(*ds).0;
                sq += err * err;
            }
            (sq / n as f64).sqrt()
        };

        log::info!(
            "fitted seasonal-trend model: {n} rows, {} changepoints, weekly={weekly_on}, yearly={yearly_on}, sigma={sigma:.4}",
            model.changepoints.len(),
        );

        Ok(TrainedSeasonalTrend { sigma, ..model })
    }
}

impl Seasonality {
    fn resolve(self, span_days: f64, auto_min: f64) -> bool {
        match self {
            Seasonality::Enabled => true,
            Seasonality::Disabled => false,
            Seasonality::Auto => span_days >= auto_min,
        }
    }
}

/// A fitted model, ready to predict over any date index.
#[derive(Debug, Clone)]
pub struct TrainedSeasonalTrend {
    seasonality_mode: SeasonalityMode,
    interval_width: f64,
    history_ds: Vec<NaiveDate>,
    start: NaiveDate,
    last_train: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    trend_coef: Vec<f64>,
    weekly_beta: Vec<f64>,
    yearly_beta: Vec<f64>,
    sigma: f64,
}

impl TrainedSeasonalTrend {
    /// The training dates extended by exactly `horizon` consecutive
    /// calendar days past the last training date.
    pub fn make_future_dates(&self, horizon: usize) -> Vec<NaiveDate> {
        let mut dates = self.history_ds.clone();
        let mut cursor = self.last_train;
        for _ in 0..horizon {
            match cursor.succ_opt() {
                Some(next) => {
                    dates.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        dates
    }

    /// Predict over the given date index.
    pub fn predict(&self, dates: &[NaiveDate]) -> ForecastFrame {
        let horizon = dates.iter().filter(|d| **d > self.last_train).count();
        let rows = dates
            .iter()
            .map(|ds| {
                let (yhat, trend, weekly, yearly) = self.point_estimate(*ds);
                let margin = self.margin(*ds);
                ForecastRow {
                    ds: *ds,
                    yhat,
                    yhat_lower: yhat - margin,
                    yhat_upper: yhat + margin,
                    trend,
                    weekly,
                    yearly,
                }
            })
            .collect();
        ForecastFrame { rows, horizon }
    }

    /// (yhat, trend, weekly, yearly) at one date, in output units.
    fn point_estimate(&self, ds: NaiveDate) -> (f64, f64, f64, f64) {
        let d = (ds - self.start).num_days() as f64;
        let t = d / self.span_days;

        let g = dot(&trend_features(t, &self.changepoints), &self.trend_coef);
        let w = dot(&fourier(d, WEEKLY_PERIOD, WEEKLY_ORDER), &self.weekly_beta);
        let yr = dot(&fourier(d, YEARLY_PERIOD, YEARLY_ORDER), &self.yearly_beta);

        let trend = g * self.y_scale;
        match self.seasonality_mode {
            SeasonalityMode::Additive => {
                let weekly = w * self.y_scale;
                let yearly = yr * self.y_scale;
                (trend + weekly + yearly, trend, weekly, yearly)
            }
            SeasonalityMode::Multiplicative => {
                let yhat = trend * (1.0 + w + yr);
                (yhat, trend, w, yr)
            }
        }
    }

    /// Interval half-width: in-sample deviation widened the further a
    /// date sits past the end of training.
    fn margin(&self, ds: NaiveDate) -> f64 {
        let ahead = (ds - self.last_train).num_days().max(0) as f64;
        let widening = (1.0 + ahead / self.span_days).sqrt();
        z_score(self.interval_width) * self.sigma * widening
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

fn trend_features(t: f64, changepoints: &[f64]) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + changepoints.len());
    row.push(1.0);
    row.push(t);
    for s in changepoints {
        row.push((t - s).max(0.0));
    }
    row
}

fn fourier(day: f64, period: f64, order: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let angle = TAU * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
    row
}

fn clamp_away_from_zero(g: f64) -> f64 {
    if g.abs() < 1e-10 {
        1e-10_f64.copysign(g)
    } else {
        g
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Two-sided z for the requested interval width.
fn z_score(interval_width: f64) -> f64 {
    match interval_width {
        w if w >= 0.99 => 2.576,
        w if w >= 0.95 => 1.960,
        w if w >= 0.90 => 1.645,
        w if w >= 0.80 => 1.282,
        _ => 1.0,
    }
}

/// Solve `min ||X b - y||^2 + ||diag(ridge) b||^2` via the normal
/// equations and Gaussian elimination with partial pivoting.
fn least_squares(rows: &[Vec<f64>], y: &[f64], ridge: &[f64]) -> Result<Vec<f64>> {
    let p = rows.first().map(|r| r.len()).unwrap_or(0);
    if p == 0 {
        return Ok(Vec::new());
    }

    // X^T X + diag(ridge), X^T y
    let mut ata = vec![vec![0.0; p]; p];
    let mut aty = vec![0.0; p];
    for (row, yi) in rows.iter().zip(y) {
        for i in 0..p {
            aty[i] += row[i] * yi;
            for j in 0..p {
                ata[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..p {
        ata[i][i] += ridge[i];
    }

    for col in 0..p {
        let pivot = (col..p)
            .max_by(|a, b| ata[*a][col].abs().total_cmp(&ata[*b][col].abs()))
            .unwrap_or(col);
        if ata[pivot][col].abs() < 1e-12 {
            return Err(Error::InvalidInput("singular trend system".into()));
        }
        ata.swap(col, pivot);
        aty.swap(col, pivot);

        for row in (col + 1)..p {
            let factor = ata[row][col] / ata[col][col];
            for k in col..p {
                ata[row][k] -= factor * ata[col][k];
            }
            aty[row] -= factor * aty[col];
        }
    }

    let mut beta = vec![0.0; p];
    for i in (0..p).rev() {
        let mut acc = aty[i];
        for j in (i + 1)..p {
            acc -= ata[i][j] * beta[j];
        }
        beta[i] = acc / ata[i][i];
    }
    Ok(beta)
}
