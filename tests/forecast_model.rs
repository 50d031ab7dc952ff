use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;
use rstest::rstest;
use yosoku::error::Error;
use yosoku::forecast::{
    forecast, SeasonalTrend, Seasonality, SeasonalityMode, TrainingFrame,
};
use yosoku::schema::{PricePoint, PriceSeries};

/// Daily series with an upward drift and a mild weekday dip.
fn synthetic_series(days: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
    let points = (0..days)
        .map(|i| {
            let dated = start + chrono::Days::new(i as u64);
            let weekday_dip = if i % 7 >= 5 { -2.0 } else { 1.0 };
            PricePoint {
                dated,
                open: None,
                close: 100.0 + 0.5 * i as f64 + weekday_dip,
            }
        })
        .collect();
    PriceSeries::new("SYN", points).unwrap()
}

#[rstest]
#[case(30)]
#[case(365)]
fn frame_covers_history_plus_horizon(#[case] horizon: usize) {
    let series = synthetic_series(120);
    let frame = forecast(&series, &SeasonalTrend::default(), horizon).unwrap();

    assert_eq!(frame.len(), series.len() + horizon);
    assert_eq!(frame.horizon, horizon);

    // historical part aligns with the series dates
    for (row, point) in frame.rows.iter().zip(&series.points) {
        assert_eq!(row.ds, point.dated);
    }

    // future part is exactly `horizon` consecutive days past the end
    let future = &frame.rows[series.len()..];
    let mut expected = series.last_date();
    for row in future {
        expected = expected.succ_opt().unwrap();
        assert_eq!(row.ds, expected);
    }
}

#[test]
fn bounds_bracket_the_point_forecast() {
    let series = synthetic_series(200);
    let frame = forecast(&series, &SeasonalTrend::default(), 60).unwrap();

    for row in &frame.rows {
        assert!(row.yhat.is_finite());
        assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
    }
}

#[test]
fn intervals_widen_past_the_training_window() {
    let series = synthetic_series(200);
    let frame = forecast(&series, &SeasonalTrend::default(), 120).unwrap();

    let width = |i: usize| frame.rows[i].yhat_upper - frame.rows[i].yhat_lower;
    let last_hist = series.len() - 1;
    assert!(width(frame.len() - 1) > width(last_hist));
}

#[test]
fn trend_follows_an_upward_series() {
    let series = synthetic_series(300);
    let frame = forecast(&series, &SeasonalTrend::default(), 30).unwrap();

    let early = frame.rows[10].trend;
    let late = frame.rows[frame.len() - 1].trend;
    assert!(late > early, "trend should rise with the series: {early} -> {late}");
}

#[test]
fn short_span_disables_auto_weekly() {
    let series = synthetic_series(10); // under two weeks
    let frame = forecast(&series, &SeasonalTrend::default(), 5).unwrap();

    for row in &frame.rows {
        assert_approx_eq!(row.weekly, 0.0, 1e-12);
        assert_approx_eq!(row.yearly, 0.0, 1e-12);
    }
}

#[test]
fn additive_components_sum_to_yhat() {
    let series = synthetic_series(150);
    let frame = forecast(&series, &SeasonalTrend::default(), 20).unwrap();

    for row in &frame.rows {
        assert_approx_eq!(row.yhat, row.trend + row.weekly + row.yearly, 1e-8);
    }
}

#[test]
fn multiplicative_components_scale_the_trend() {
    let series = synthetic_series(150);
    let config = SeasonalTrend::multiplicative();
    assert_eq!(config.seasonality_mode, SeasonalityMode::Multiplicative);
    assert_eq!(config.changepoint_range, 0.8);
    assert_eq!(config.daily_seasonality, Seasonality::Disabled);

    let frame = forecast(&series, &config, 20).unwrap();
    for row in &frame.rows {
        assert_approx_eq!(row.yhat, row.trend * (1.0 + row.weekly + row.yearly), 1e-8);
    }
}

#[test]
fn one_row_is_insufficient() {
    let frame = TrainingFrame {
        ds: vec![NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()],
        y: vec![42.0],
    };
    let err = SeasonalTrend::default().fit(&frame).unwrap_err();
    assert!(matches!(err, Error::InsufficientData { rows: 1 }));
}

#[test]
fn two_rows_fit_a_line() {
    let frame = TrainingFrame {
        ds: vec![
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 2).unwrap(),
        ],
        y: vec![10.0, 12.0],
    };
    let model = SeasonalTrend::default().fit(&frame).unwrap();
    let prediction = model.predict(&model.make_future_dates(3));

    assert_eq!(prediction.len(), 5);
    assert_eq!(prediction.horizon, 3);
    // linear continuation of the two observed points
    assert_approx_eq!(prediction.rows[4].yhat, 18.0, 0.5);
}

#[test]
fn tail_returns_the_last_rows() {
    let series = synthetic_series(50);
    let frame = forecast(&series, &SeasonalTrend::default(), 10).unwrap();
    let tail = frame.tail(5);

    assert_eq!(tail.len(), 5);
    assert_eq!(tail[4].ds, frame.rows[frame.len() - 1].ds);
}
