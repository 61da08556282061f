//! Final metrics assembly
//!
//! Turns fully merged accumulators into a [`MetricsSnapshot`]. Every ordering
//! here uses (count, key) only and `notes` are sorted, so the output does not
//! depend on the order the accumulators were merged in. The one exception is a
//! condition code seen with different displays, where the first file wins.

use super::accumulator::{ConditionTally, EncounterTally};
use crate::domain::snapshot::{
    Breakdowns, ClassBreakdown, ConditionFrequency, DailyCount, Kpis, MetricsSnapshot, Series,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Maximum number of entries in `top_conditions`
pub const TOP_CONDITIONS_LIMIT: usize = 10;

/// Two consecutive visits at most this far apart count as a revisit
pub const REVISIT_WINDOW_DAYS: i64 = 30;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Builds the snapshot from merged accumulators
pub fn build_snapshot(
    encounters: EncounterTally,
    conditions: ConditionTally,
    generated_at: DateTime<Utc>,
) -> MetricsSnapshot {
    let kpis = Kpis {
        total_encounters: encounters.total,
        avg_length_of_stay_days: average_length_of_stay(encounters.los_millis, encounters.los_count),
        revisit_rate_30_day: revisit_rate(&encounters.visits),
    };

    let mut notes = encounters.notes;
    notes.sort();

    let encounters_by_day = encounters
        .by_day
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    MetricsSnapshot {
        generated_at,
        kpis,
        series: Series { encounters_by_day },
        breakdowns: Breakdowns {
            encounters_by_class: class_breakdown(encounters.by_class),
        },
        top_conditions: top_conditions(conditions),
        notes,
    }
}

/// Mean stay in days rounded to 2 decimals; `None` without any valid stay
pub fn average_length_of_stay(total_millis: u128, stays: u64) -> Option<f64> {
    if stays == 0 {
        return None;
    }
    let days = total_millis as f64 / MILLIS_PER_DAY / stays as f64;
    Some(round_to(days, 2))
}

/// 30-day revisit rate
///
/// A patient with two or more visits qualifies; a qualifying patient counts
/// once if any two consecutive visits (sorted by start) are at most
/// [`REVISIT_WINDOW_DAYS`] apart, inclusive. `None` if nobody qualifies.
pub fn revisit_rate(visits: &HashMap<String, Vec<DateTime<Utc>>>) -> Option<f64> {
    let window = Duration::days(REVISIT_WINDOW_DAYS);
    let mut qualifying = 0u64;
    let mut revisiting = 0u64;

    for starts in visits.values().filter(|starts| starts.len() >= 2) {
        qualifying += 1;
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[1] - pair[0] <= window) {
            revisiting += 1;
        }
    }

    if qualifying == 0 {
        return None;
    }
    Some(revisiting as f64 / qualifying as f64)
}

/// Class breakdown sorted descending by count, ties ascending by code
pub fn class_breakdown(by_class: HashMap<String, u64>) -> Vec<ClassBreakdown> {
    let mut breakdown: Vec<ClassBreakdown> = by_class
        .into_iter()
        .map(|(class_code, count)| ClassBreakdown { class_code, count })
        .collect();
    breakdown.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.class_code.cmp(&b.class_code))
    });
    breakdown
}

/// Most frequent conditions, descending by count, ties ascending by code,
/// truncated to [`TOP_CONDITIONS_LIMIT`]
pub fn top_conditions(conditions: ConditionTally) -> Vec<ConditionFrequency> {
    let mut top: Vec<ConditionFrequency> = conditions
        .by_code
        .into_iter()
        .map(|(code, entry)| ConditionFrequency {
            code,
            display: entry.display,
            count: entry.count,
        })
        .collect();
    top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
    top.truncate(TOP_CONDITIONS_LIMIT);
    top
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::accumulator::ConditionEntry;
    use chrono::TimeZone;

    fn at(day: u32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_average_length_of_stay() {
        assert_eq!(average_length_of_stay(0, 0), None);
        // 1 day + 2 days over 2 stays
        assert_eq!(average_length_of_stay(3 * 86_400_000, 2), Some(1.5));
        // One third of a day rounds to 2 places
        assert_eq!(average_length_of_stay(28_800_000, 1), Some(0.33));
    }

    #[test]
    fn test_revisit_rate_none_without_repeat_patients() {
        let mut visits = HashMap::new();
        visits.insert("Patient/1".to_string(), vec![at(1, 1)]);
        assert_eq!(revisit_rate(&visits), None);
        assert_eq!(revisit_rate(&HashMap::new()), None);
    }

    #[test]
    fn test_revisit_rate_boundary_is_inclusive() {
        let mut visits = HashMap::new();
        // Exactly 30 days apart
        visits.insert(
            "Patient/1".to_string(),
            vec![at(1, 1), at(1, 1) + Duration::days(30)],
        );
        // 30 days and one second apart
        visits.insert(
            "Patient/2".to_string(),
            vec![at(1, 1), at(1, 1) + Duration::days(30) + Duration::seconds(1)],
        );
        assert_eq!(revisit_rate(&visits), Some(0.5));
    }

    #[test]
    fn test_revisit_rate_sorts_before_comparing() {
        let mut visits = HashMap::new();
        // Unsorted: consecutive pairs after sorting are 1 Jan -> 10 Jan
        visits.insert(
            "Patient/1".to_string(),
            vec![at(1, 6), at(1, 1), at(10, 1)],
        );
        assert_eq!(revisit_rate(&visits), Some(1.0));
    }

    #[test]
    fn test_revisit_counts_patient_once() {
        let mut visits = HashMap::new();
        visits.insert(
            "Patient/1".to_string(),
            vec![at(1, 1), at(2, 1), at(3, 1), at(4, 1)],
        );
        visits.insert("Patient/2".to_string(), vec![at(1, 1), at(1, 6)]);
        visits.insert("Patient/3".to_string(), vec![at(1, 1), at(1, 9)]);
        let rate = revisit_rate(&visits).unwrap();
        assert!((rate - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_class_breakdown_tie_break() {
        let by_class = HashMap::from([
            ("EMER".to_string(), 2),
            ("AMB".to_string(), 5),
            ("IMP".to_string(), 2),
            ("HH".to_string(), 2),
        ]);
        let ordered: Vec<(String, u64)> = class_breakdown(by_class)
            .into_iter()
            .map(|c| (c.class_code, c.count))
            .collect();
        assert_eq!(
            ordered,
            vec![
                ("AMB".to_string(), 5),
                ("EMER".to_string(), 2),
                ("HH".to_string(), 2),
                ("IMP".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_top_conditions_truncated_and_ordered() {
        let mut tally = ConditionTally::default();
        for i in 0..15u64 {
            tally.by_code.insert(
                format!("C{i:02}"),
                ConditionEntry {
                    display: format!("Condition {i}"),
                    count: i % 4,
                },
            );
        }
        let top = top_conditions(tally);
        assert_eq!(top.len(), TOP_CONDITIONS_LIMIT);
        for pair in top.windows(2) {
            assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].code < pair[1].code)
            );
        }
        assert_eq!(top[0].code, "C03");
        assert_eq!(top[0].count, 3);
    }

    #[test]
    fn test_build_snapshot_series_is_ascending() {
        let mut tally = EncounterTally::default();
        tally.by_day.insert("2024-02-01".into(), 1);
        tally.by_day.insert("2023-12-31".into(), 2);
        tally.by_day.insert("2024-01-15".into(), 3);
        tally.total = 6;

        let snapshot = build_snapshot(tally, ConditionTally::default(), Utc::now());
        let dates: Vec<&str> = snapshot
            .series
            .encounters_by_day
            .iter()
            .map(|d| d.date.as_str())
            .collect();
        assert_eq!(dates, vec!["2023-12-31", "2024-01-15", "2024-02-01"]);
        assert_eq!(snapshot.kpis.avg_length_of_stay_days, None);
        assert_eq!(snapshot.kpis.revisit_rate_30_day, None);
    }

    #[test]
    fn test_build_snapshot_sorts_notes() {
        let mut tally = EncounterTally::default();
        tally.total = 2;
        tally.notes = vec![
            "Encounter y is missing period.start".to_string(),
            "Encounter x is missing period.start".to_string(),
        ];

        let snapshot = build_snapshot(tally, ConditionTally::default(), Utc::now());
        assert_eq!(
            snapshot.notes,
            vec![
                "Encounter x is missing period.start",
                "Encounter y is missing period.start"
            ]
        );
    }
}
