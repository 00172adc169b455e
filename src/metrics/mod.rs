// src/metrics/mod.rs
use tracing::debug;

use crate::acs;
use crate::fetch::TractEstimates;

/// Derived ambulatory-difficulty figures for one tract.
///
/// Counts stay `None` when any contributing estimate is undefined.
/// Percentages are always defined: an undefined or zero denominator gives 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbulatoryMetrics {
    pub total_pop_5plus: Option<i64>,
    pub total_amb_diff: Option<i64>,
    pub total_amb_diff_pct: f64,
    pub pop_65plus: Option<i64>,
    pub pop_65plus_amb_diff: Option<i64>,
    pub pop_65plus_amb_diff_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub geoid: String,
    pub metrics: AmbulatoryMetrics,
}

fn sum_of(row: &TractEstimates, codes: &[&str]) -> Option<i64> {
    codes
        .iter()
        .try_fold(0i64, |acc, code| acc.checked_add(row.get(code)?))
}

/// Round half away from zero to two decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `part / whole * 100` rounded to 2 decimals, or 0 when either side is
/// undefined or `whole` is 0.
pub fn percentage(part: Option<i64>, whole: Option<i64>) -> f64 {
    match (part, whole) {
        (Some(p), Some(w)) if w != 0 => round2(p as f64 / w as f64 * 100.0),
        _ => 0.0,
    }
}

impl AmbulatoryMetrics {
    pub fn from_estimates(row: &TractEstimates) -> Self {
        let total_pop_5plus = row.get(acs::TOTAL_5PLUS);
        let total_amb_diff = sum_of(row, &acs::WITH_DIFFICULTY);
        let pop_65plus = sum_of(row, &acs::SENIOR_TOTALS);
        let pop_65plus_amb_diff = sum_of(row, &acs::SENIOR_WITH_DIFFICULTY);

        Self {
            total_pop_5plus,
            total_amb_diff,
            total_amb_diff_pct: percentage(total_amb_diff, total_pop_5plus),
            pop_65plus,
            pop_65plus_amb_diff,
            pop_65plus_amb_diff_pct: percentage(pop_65plus_amb_diff, pop_65plus),
        }
    }
}

pub fn calculate_metrics(rows: &[TractEstimates]) -> Vec<DerivedRow> {
    rows.iter()
        .map(|row| {
            let metrics = AmbulatoryMetrics::from_estimates(row);
            debug!(geoid = %row.geoid, ?metrics, "derived");
            DerivedRow {
                geoid: row.geoid.clone(),
                metrics,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Estimates with every variable set through `f(code)`.
    fn estimates(f: impl Fn(&str) -> Option<i64>) -> TractEstimates {
        let mut values = [None; acs::VARIABLE_COUNT];
        for (slot, code) in values.iter_mut().zip(acs::VARIABLES) {
            *slot = f(code);
        }
        TractEstimates {
            geoid: "06075010800".into(),
            name: None,
            estimates: values,
        }
    }

    /// 1000 universe; the ten difficulty cells sum to 150, of which the four
    /// senior cells sum to 40; the four senior totals sum to 200.
    fn worked_example(code: &str) -> Option<i64> {
        Some(match code {
            acs::TOTAL_5PLUS => 1000,
            "B18105_013E" | "B18105_016E" | "B18105_029E" | "B18105_032E" => 10,
            "B18105_012E" | "B18105_015E" | "B18105_028E" | "B18105_031E" => 50,
            "B18105_004E" | "B18105_020E" => 5,
            _ => 25,
        })
    }

    #[test]
    fn worked_example_matches_hand_calculation() {
        let m = AmbulatoryMetrics::from_estimates(&estimates(worked_example));
        assert_eq!(m.total_pop_5plus, Some(1000));
        assert_eq!(m.total_amb_diff, Some(150));
        assert_eq!(m.total_amb_diff_pct, 15.0);
        assert_eq!(m.pop_65plus, Some(200));
        assert_eq!(m.pop_65plus_amb_diff, Some(40));
        assert_eq!(m.pop_65plus_amb_diff_pct, 20.0);
    }

    #[test]
    fn zero_universe_gives_zero_percent() {
        let m = AmbulatoryMetrics::from_estimates(&estimates(|_| Some(0)));
        assert_eq!(m.total_pop_5plus, Some(0));
        assert_eq!(m.total_amb_diff_pct, 0.0);
        assert_eq!(m.pop_65plus_amb_diff_pct, 0.0);
        assert!(!m.total_amb_diff_pct.is_nan());
    }

    #[test]
    fn undefined_summand_propagates_to_count_not_percentage() {
        let m = AmbulatoryMetrics::from_estimates(&estimates(|code| {
            if code == "B18105_029E" {
                None
            } else {
                worked_example(code)
            }
        }));
        assert_eq!(m.total_pop_5plus, Some(1000));
        assert_eq!(m.total_amb_diff, None);
        assert_eq!(m.pop_65plus_amb_diff, None);
        assert_eq!(m.pop_65plus, Some(200));
        assert_eq!(m.total_amb_diff_pct, 0.0);
        assert_eq!(m.pop_65plus_amb_diff_pct, 0.0);
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        assert_eq!(percentage(Some(1), Some(3)), 33.33);
        assert_eq!(percentage(Some(2), Some(3)), 66.67);
        assert_eq!(percentage(Some(7), None), 0.0);
        assert_eq!(percentage(Some(1234), Some(1234)), 100.0);
    }

    /// A senior age band as (total, with difficulty), difficulty never above the total.
    fn senior_band() -> impl Strategy<Value = (i64, i64)> {
        (0i64..100_000).prop_flat_map(|total| (Just(total), 0..=total))
    }

    proptest! {
        /// Any tract whose difficulty counts fit inside their universes yields
        /// percentages between 0 and 100.
        #[test]
        fn contained_counts_stay_within_percent_range(
            younger in vec(0i64..1_000_000, 6),
            seniors in vec(senior_band(), 4),
            slack in 0i64..10_000_000,
        ) {
            let mut values: HashMap<&str, i64> = HashMap::new();
            let younger_codes = acs::WITH_DIFFICULTY
                .iter()
                .copied()
                .filter(|c| !acs::SENIOR_WITH_DIFFICULTY.contains(c));
            for (code, n) in younger_codes.zip(&younger) {
                values.insert(code, *n);
            }
            let senior_codes = acs::SENIOR_TOTALS
                .iter()
                .copied()
                .zip(acs::SENIOR_WITH_DIFFICULTY.iter().copied());
            for ((total_code, diff_code), (total, diff)) in senior_codes.zip(&seniors) {
                values.insert(total_code, *total);
                values.insert(diff_code, *diff);
            }
            let universe = younger.iter().sum::<i64>()
                + seniors.iter().map(|(total, _)| total).sum::<i64>()
                + slack;
            values.insert(acs::TOTAL_5PLUS, universe);

            let m = AmbulatoryMetrics::from_estimates(&estimates(|code| values.get(code).copied()));
            prop_assert!(m.total_amb_diff <= m.total_pop_5plus);
            prop_assert!(m.pop_65plus_amb_diff <= m.pop_65plus);
            prop_assert!(
                (0.0..=100.0).contains(&m.total_amb_diff_pct),
                "total pct {} out of range", m.total_amb_diff_pct
            );
            prop_assert!(
                (0.0..=100.0).contains(&m.pop_65plus_amb_diff_pct),
                "senior pct {} out of range", m.pop_65plus_amb_diff_pct
            );
        }
    }

    #[test]
    fn calculate_metrics_keeps_geoids() {
        let rows = calculate_metrics(&[estimates(worked_example)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].geoid, "06075010800");
    }
}
