//! Forecast behaviour on representative daily series

use chrono::{Duration, NaiveDate, Utc};
use tally::core::forecast::{build_forecast, FORECAST_METHOD, HISTORY_WINDOW_DAYS};
use tally::domain::DailyCount;
use test_case::test_case;

fn series(start: &str, counts: &[u64]) -> Vec<DailyCount> {
    let first = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let day = first + Duration::days(i as i64);
            DailyCount::new(day.format("%Y-%m-%d").to_string(), *count)
        })
        .collect()
}

#[test]
fn test_flat_week_uses_heuristic_band() {
    // 2024-01-01 is a Monday
    let forecast = build_forecast(&series("2024-01-01", &[10; 7]), Utc::now()).unwrap();

    let monday = &forecast.forecast[0];
    assert_eq!(monday.date, "2024-01-08");
    assert_eq!(monday.predicted_value, 10);
    assert_eq!(monday.lower_bound, 4);
    assert_eq!(monday.upper_bound, 16);
    assert_eq!(forecast.method, FORECAST_METHOD);
}

#[test]
fn test_varying_week_uses_sample_std() {
    // Monday..Sunday = 1..7, sample std = sqrt(28 / 6)
    let forecast = build_forecast(&series("2024-01-01", &[1, 2, 3, 4, 5, 6, 7]), Utc::now()).unwrap();
    let points = &forecast.forecast;

    assert_eq!((points[0].predicted_value, points[0].lower_bound, points[0].upper_bound), (1, 0, 4));
    assert_eq!((points[2].predicted_value, points[2].lower_bound, points[2].upper_bound), (3, 0, 6));
    assert_eq!((points[6].predicted_value, points[6].lower_bound, points[6].upper_bound), (7, 4, 10));
    // Second week repeats the first
    assert_eq!(points[7].predicted_value, points[0].predicted_value);
    assert_eq!(points[13].date, "2024-01-21");
}

#[test_case(&[] ; "empty")]
#[test_case(&[0] ; "single zero")]
#[test_case(&[3] ; "single point")]
#[test_case(&[0, 0, 0, 0, 0, 0, 0, 0, 0] ; "all zero")]
#[test_case(&[50, 0, 50, 0, 50, 0, 50, 0, 50, 0] ; "alternating")]
#[test_case(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35] ; "trend longer than window")]
fn test_forecast_invariants(counts: &[u64]) {
    let forecast = build_forecast(&series("2024-02-20", counts), Utc::now()).unwrap();

    assert!(forecast.history.len() <= HISTORY_WINDOW_DAYS);
    assert_eq!(forecast.history.len(), counts.len().min(HISTORY_WINDOW_DAYS));
    if forecast.history.is_empty() {
        assert!(forecast.forecast.is_empty());
        return;
    }

    assert_eq!(forecast.forecast.len(), 14);
    for point in &forecast.forecast {
        assert!(point.lower_bound <= point.predicted_value, "{point:?}");
        assert!(point.predicted_value <= point.upper_bound, "{point:?}");
        assert!(point.lower_bound >= 0, "{point:?}");
    }

    // Forecast dates are the 14 days after the last history date
    let last = NaiveDate::parse_from_str(&forecast.history.last().unwrap().date, "%Y-%m-%d").unwrap();
    for (offset, point) in forecast.forecast.iter().enumerate() {
        let expected = last + Duration::days(offset as i64 + 1);
        assert_eq!(point.date, expected.format("%Y-%m-%d").to_string());
    }
}

#[test]
fn test_unsorted_input_is_ordered() {
    let mut days = series("2024-01-01", &[5, 6, 7]);
    days.reverse();
    let forecast = build_forecast(&days, Utc::now()).unwrap();
    assert_eq!(forecast.history[0].date, "2024-01-01");
    assert_eq!(forecast.forecast[0].date, "2024-01-04");
}
