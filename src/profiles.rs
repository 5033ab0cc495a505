use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::aggregator::VendorYearTable;
use crate::frequency::guess_frequency;
use crate::models::{Category, Frequency, Transaction, VendorProfile};

/// Recurring when the vendor spans two or more years or shows a periodic cadence.
pub fn is_recurring(years_nonzero: usize, freq: Frequency) -> bool {
    years_nonzero >= 2 || freq.is_periodic()
}

/// Most frequent category; ties go to the category seen first.
pub fn dominant_category(categories: &[Category]) -> Category {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for c in categories {
        match counts.iter_mut().find(|(k, _)| k == c) {
            Some((_, n)) => *n += 1,
            None => counts.push((*c, 1)),
        }
    }
    let mut best: Option<(Category, usize)> = None;
    for (c, n) in counts {
        if best.map_or(true, |(_, b)| n > b) {
            best = Some((c, n));
        }
    }
    best.map_or(Category::Other, |(c, _)| c)
}

#[derive(Default)]
struct VendorRows {
    dates: Vec<NaiveDate>,
    categories: Vec<Category>,
}

pub type Profiles = BTreeMap<String, VendorProfile>;

/// Derive one profile per vendor in the table, keyed by normalized vendor.
pub fn build_profiles(txns: &[Transaction], table: &VendorYearTable) -> Profiles {
    let mut by_vendor: BTreeMap<&str, VendorRows> = BTreeMap::new();
    for t in txns {
        let entry = by_vendor.entry(t.vendor_norm.as_str()).or_default();
        if let Some(d) = t.date {
            entry.dates.push(d);
        }
        entry.categories.push(t.category);
    }

    let latest = table.latest_year();
    table
        .vendors()
        .iter()
        .map(|vendor| {
            let rows = by_vendor.get(vendor.as_str());
            let dates = rows.map(|r| r.dates.as_slice()).unwrap_or_default();
            let categories = rows.map(|r| r.categories.as_slice()).unwrap_or_default();
            let years_nonzero = table.years_nonzero(vendor);
            let freq_guess = guess_frequency(dates);
            let profile = VendorProfile {
                vendor: vendor.clone(),
                category: dominant_category(categories),
                total: table.vendor_total(vendor),
                years_nonzero,
                latest_cost: table.value(vendor, latest),
                freq_guess,
                recurring_flag: is_recurring(years_nonzero, freq_guess),
            };
            (vendor.clone(), profile)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(vendor: &str, date: &str, amount: f64, category: Category) -> Transaction {
        Transaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            amount_net: amount,
            vendor_raw: vendor.to_string(),
            vendor_norm: vendor.to_string(),
            account: String::new(),
            text: String::new(),
            category,
        }
    }

    #[test]
    fn test_is_recurring() {
        assert!(is_recurring(2, Frequency::Unclear));
        assert!(is_recurring(1, Frequency::Monthly));
        assert!(is_recurring(1, Frequency::Yearly));
        assert!(!is_recurring(1, Frequency::Unclear));
        assert!(!is_recurring(0, Frequency::Unclear));
    }

    #[test]
    fn test_dominant_category_tie_goes_to_first_seen() {
        use Category::*;
        assert_eq!(dominant_category(&[Energy, Marketing, Marketing, Energy]), Energy);
        assert_eq!(dominant_category(&[Other, Energy, Energy]), Energy);
        assert_eq!(dominant_category(&[]), Other);
    }

    #[test]
    fn test_monthly_vendor_in_single_year() {
        let txns = vec![
            txn("aruba", "2024-01-01", 10.0, Category::SoftwareIt),
            txn("aruba", "2024-01-31", 10.0, Category::SoftwareIt),
            txn("aruba", "2024-03-01", 10.0, Category::SoftwareIt),
        ];
        let table = VendorYearTable::build(&txns).unwrap();
        let p = &build_profiles(&txns, &table)["aruba"];
        assert_eq!(p.freq_guess, Frequency::Monthly);
        assert_eq!(p.years_nonzero, 1);
        assert!(p.recurring_flag);
        assert_eq!(p.total, 30.0);
        assert_eq!(p.latest_cost, 30.0);
        assert_eq!(p.category, Category::SoftwareIt);
    }

    #[test]
    fn test_latest_cost_uses_dataset_latest_year() {
        let txns = vec![
            txn("hera", "2023-05-01", 100.0, Category::Energy),
            txn("hera", "2024-05-01", 120.0, Category::Energy),
            txn("arval", "2025-05-01", 300.0, Category::LeasingVehicle),
        ];
        let table = VendorYearTable::build(&txns).unwrap();
        let profiles = build_profiles(&txns, &table);
        assert_eq!(profiles["hera"].latest_cost, 0.0);
        assert_eq!(profiles["hera"].years_nonzero, 2);
        assert!(profiles["hera"].recurring_flag);
        assert_eq!(profiles["arval"].latest_cost, 300.0);
        assert!(!profiles["arval"].recurring_flag);
    }
}
