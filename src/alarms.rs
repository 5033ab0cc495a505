use crate::aggregator::VendorYearTable;
use crate::models::{Alarm, AlarmKind, Category};
use crate::profiles::Profiles;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmOutcome {
    pub kind: AlarmKind,
    pub delta: f64,
    pub pct: Option<f64>,
}

/// Classify a year-over-year change. Exactly one of NEW, DROPPED, CHANGED or
/// no alarm applies; `base == min_base` counts as reaching the minimum.
/// NEW is checked first, so with `min_base == 0` two empty years give NEW with delta 0.
pub fn classify_change(base: f64, new: f64, threshold_pct: f64, min_base: f64) -> Option<AlarmOutcome> {
    if base == 0.0 && new >= min_base {
        return Some(AlarmOutcome {
            kind: AlarmKind::New,
            delta: new,
            pct: None,
        });
    }
    if base > 0.0 && base >= min_base {
        if new == 0.0 {
            return Some(AlarmOutcome {
                kind: AlarmKind::Dropped,
                delta: -base,
                pct: Some(-100.0),
            });
        }
        let pct = (new - base) / base * 100.0;
        if new > 0.0 && pct.abs() >= threshold_pct {
            return Some(AlarmOutcome {
                kind: AlarmKind::Changed,
                delta: new - base,
                pct: Some(pct),
            });
        }
    }
    None
}

/// Compare every vendor across each consecutive pair of dataset years.
///
/// Sorted by period ascending, then by delta descending; vendor order breaks ties.
pub fn detect_alarms(
    table: &VendorYearTable,
    profiles: &Profiles,
    threshold_pct: f64,
    min_base: f64,
) -> Vec<Alarm> {
    let mut alarms = Vec::new();
    for vendor in table.vendors() {
        let category = profiles.get(vendor).map_or(Category::Other, |p| p.category);
        for pair in table.years().windows(2) {
            let (y1, y2) = (pair[0], pair[1]);
            let base = table.value(vendor, y1);
            let new = table.value(vendor, y2);
            if let Some(o) = classify_change(base, new, threshold_pct, min_base) {
                alarms.push(Alarm {
                    vendor: vendor.clone(),
                    period: format!("{y1}->{y2}"),
                    kind: o.kind,
                    base,
                    new,
                    delta: o.delta,
                    pct: o.pct,
                    category,
                });
            }
        }
    }
    alarms.sort_by(|a, b| a.period.cmp(&b.period).then(b.delta.total_cmp(&a.delta)));
    tracing::debug!(alarms = alarms.len(), threshold_pct, min_base, "alarm detection");
    alarms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use crate::profiles::build_profiles;
    use chrono::NaiveDate;

    #[test]
    fn test_changed_scenario() {
        let o = classify_change(1000.0, 1300.0, 10.0, 100.0).unwrap();
        assert_eq!(o.kind, AlarmKind::Changed);
        assert_eq!(o.delta, 300.0);
        assert_eq!(o.pct, Some(30.0));
    }

    #[test]
    fn test_new_scenario() {
        let o = classify_change(0.0, 150.0, 10.0, 100.0).unwrap();
        assert_eq!(o.kind, AlarmKind::New);
        assert_eq!(o.delta, 150.0);
        assert_eq!(o.pct, None);
    }

    #[test]
    fn test_dropped_scenario() {
        let o = classify_change(500.0, 0.0, 10.0, 100.0).unwrap();
        assert_eq!(o.kind, AlarmKind::Dropped);
        assert_eq!(o.delta, -500.0);
        assert_eq!(o.pct, Some(-100.0));
    }

    #[test]
    fn test_min_base_boundary_is_inclusive() {
        assert_eq!(classify_change(0.0, 100.0, 10.0, 100.0).unwrap().kind, AlarmKind::New);
        assert_eq!(classify_change(100.0, 0.0, 10.0, 100.0).unwrap().kind, AlarmKind::Dropped);
        assert_eq!(classify_change(100.0, 110.0, 10.0, 100.0).unwrap().kind, AlarmKind::Changed);
        assert!(classify_change(0.0, 99.99, 10.0, 100.0).is_none());
        assert!(classify_change(99.99, 0.0, 10.0, 100.0).is_none());
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        assert!(classify_change(1000.0, 1100.0, 10.0, 100.0).is_some());
        assert!(classify_change(1000.0, 900.0, 10.0, 100.0).is_some());
        assert!(classify_change(1000.0, 1099.0, 10.0, 100.0).is_none());
        assert_eq!(
            classify_change(1000.0, 500.0, 10.0, 100.0).unwrap().pct,
            Some(-50.0)
        );
    }

    #[test]
    fn test_small_base_never_alarms_on_change() {
        assert!(classify_change(50.0, 90.0, 10.0, 100.0).is_none());
        assert!(classify_change(50.0, 500.0, 10.0, 100.0).is_none());
    }

    #[test]
    fn test_zero_min_base_flags_empty_years_as_new() {
        let o = classify_change(0.0, 0.0, 10.0, 0.0).unwrap();
        assert_eq!(o.kind, AlarmKind::New);
        assert_eq!(o.delta, 0.0);
        assert_eq!(o.pct, None);
        assert_eq!(classify_change(0.0, 40.0, 10.0, 0.0).unwrap().kind, AlarmKind::New);
        assert_eq!(classify_change(40.0, 0.0, 10.0, 0.0).unwrap().kind, AlarmKind::Dropped);
    }

    #[test]
    fn test_partition_over_grid() {
        let values = [0.0, 50.0, 99.0, 100.0, 101.0, 109.0, 110.0, 1000.0];
        for &base in &values {
            for &new in &values {
                let o = classify_change(base, new, 10.0, 100.0);
                let expect_new = base == 0.0 && new >= 100.0;
                let expect_dropped = base >= 100.0 && new == 0.0;
                let expect_changed = base >= 100.0
                    && new > 0.0
                    && ((new - base) / base * 100.0).abs() >= 10.0;
                let hits = [expect_new, expect_dropped, expect_changed]
                    .iter()
                    .filter(|b| **b)
                    .count();
                assert!(hits <= 1);
                match o.map(|o| o.kind) {
                    Some(AlarmKind::New) => assert!(expect_new),
                    Some(AlarmKind::Dropped) => assert!(expect_dropped),
                    Some(AlarmKind::Changed) => assert!(expect_changed),
                    None => assert_eq!(hits, 0),
                }
            }
        }
    }

    fn txn(vendor: &str, year: i32, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(year, 6, 1),
            amount_net: amount,
            vendor_raw: vendor.to_string(),
            vendor_norm: vendor.to_string(),
            account: String::new(),
            text: String::new(),
            category: Category::Energy,
        }
    }

    #[test]
    fn test_detect_uses_dataset_years_and_sorts() {
        let txns = vec![
            txn("hera", 2023, 1000.0),
            txn("hera", 2024, 1300.0),
            txn("alperia", 2023, 500.0),
            txn("aruba", 2024, 150.0),
            txn("aruba", 2025, 900.0),
            txn("other", 2025, 10.0),
        ];
        let table = VendorYearTable::build(&txns).unwrap();
        let profiles = build_profiles(&txns, &table);
        let alarms = detect_alarms(&table, &profiles, 10.0, 100.0);
        let summary: Vec<(&str, &str, AlarmKind)> = alarms
            .iter()
            .map(|a| (a.period.as_str(), a.vendor.as_str(), a.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2023->2024", "hera", AlarmKind::Changed),
                ("2023->2024", "aruba", AlarmKind::New),
                ("2023->2024", "alperia", AlarmKind::Dropped),
                ("2024->2025", "aruba", AlarmKind::Changed),
                ("2024->2025", "hera", AlarmKind::Dropped),
            ]
        );
        assert!(alarms.iter().all(|a| a.category == Category::Energy));
    }
}
