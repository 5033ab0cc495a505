use std::collections::{BTreeMap, BTreeSet};

use crate::categorizer::Categorizer;
use crate::error::{CostscanError, Result};
use crate::models::{Category, RawRow, Transaction, VendorYearAggregate};
use crate::normalizer::Normalizer;

/// Normalize and categorize raw rows. No row is dropped here.
pub fn prepare(rows: &[RawRow], normalizer: &Normalizer, categorizer: &Categorizer) -> Vec<Transaction> {
    rows.iter()
        .map(|r| {
            let vendor_norm = normalizer.normalize(r.vendor.as_deref());
            let category = categorizer.categorize(&vendor_norm, &r.account, &r.text);
            let txn = Transaction {
                date: r.date,
                amount_net: r.amount,
                vendor_raw: r.vendor.clone().unwrap_or_default(),
                vendor_norm,
                account: r.account.clone(),
                text: r.text.clone(),
                category,
            };
            if txn.category == Category::Other {
                tracing::trace!(
                    vendor = %txn.vendor_raw,
                    account = %txn.account,
                    text = %txn.text,
                    "no category rule matched"
                );
            }
            txn
        })
        .collect()
}

/// Admission filter: year within `[year_min, year_max]` and a strictly positive amount.
pub fn is_admitted(txn: &Transaction, year_min: i32, year_max: i32) -> bool {
    txn.year().is_some_and(|y| (year_min..=year_max).contains(&y)) && txn.amount_net > 0.0
}

pub fn admit(txns: Vec<Transaction>, year_min: i32, year_max: i32) -> Result<Vec<Transaction>> {
    let total = txns.len();
    let admitted: Vec<Transaction> = txns
        .into_iter()
        .filter(|t| is_admitted(t, year_min, year_max))
        .collect();
    tracing::debug!(total, admitted = admitted.len(), year_min, year_max, "admission filter");
    if admitted.is_empty() {
        return Err(CostscanError::EmptyResult(
            "No rows left after filtering (check the year range and amounts).".to_string(),
        ));
    }
    Ok(admitted)
}

/// Sparse (vendor, year) table. Absent cells read as zero.
#[derive(Debug, Clone)]
pub struct VendorYearTable {
    cells: BTreeMap<(String, i32), VendorYearAggregate>,
    years: Vec<i32>,
    vendors: Vec<String>,
}

impl VendorYearTable {
    /// Group admitted transactions by (vendor, year). Rows without a date are ignored.
    pub fn build(txns: &[Transaction]) -> Result<Self> {
        let mut cells: BTreeMap<(String, i32), VendorYearAggregate> = BTreeMap::new();
        let mut years = BTreeSet::new();
        let mut vendors = BTreeSet::new();
        for t in txns {
            let Some(year) = t.year() else { continue };
            let cell = cells.entry((t.vendor_norm.clone(), year)).or_default();
            cell.sum_net += t.amount_net;
            cell.count += 1;
            years.insert(year);
            vendors.insert(t.vendor_norm.clone());
        }
        if years.is_empty() {
            return Err(CostscanError::EmptyResult(
                "No years left after filtering.".to_string(),
            ));
        }
        tracing::debug!(cells = cells.len(), vendors = vendors.len(), years = years.len(), "aggregated");
        Ok(Self {
            cells,
            years: years.into_iter().collect(),
            vendors: vendors.into_iter().collect(),
        })
    }

    pub fn get(&self, vendor: &str, year: i32) -> Option<&VendorYearAggregate> {
        self.cells.get(&(vendor.to_string(), year))
    }

    /// Dense lookup: 0.0 for a vendor without bookings in `year`.
    pub fn value(&self, vendor: &str, year: i32) -> f64 {
        self.get(vendor, year).map_or(0.0, |c| c.sum_net)
    }

    /// Sorted years present anywhere in the dataset.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Vendors in ascending key order.
    pub fn vendors(&self) -> &[String] {
        &self.vendors
    }

    pub fn latest_year(&self) -> i32 {
        // build() guarantees at least one year
        self.years.last().copied().unwrap_or_default()
    }

    /// One value per entry of `years()`, zero-filled.
    pub fn dense_row(&self, vendor: &str) -> Vec<f64> {
        self.years.iter().map(|&y| self.value(vendor, y)).collect()
    }

    pub fn vendor_total(&self, vendor: &str) -> f64 {
        self.dense_row(vendor).iter().sum()
    }

    pub fn years_nonzero(&self, vendor: &str) -> usize {
        self.dense_row(vendor).iter().filter(|v| **v > 0.0).count()
    }

    /// Vendors with bookings in `year`, in vendor order.
    pub fn year_slice(&self, year: i32) -> impl Iterator<Item = (&str, &VendorYearAggregate)> {
        self.cells
            .iter()
            .filter(move |((_, y), _)| *y == year)
            .map(|((v, _), c)| (v.as_str(), c))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;

    fn txn(vendor: &str, date: &str, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            amount_net: amount,
            vendor_raw: vendor.to_string(),
            vendor_norm: vendor.to_string(),
            account: String::new(),
            text: String::new(),
            category: Category::Other,
        }
    }

    #[test]
    fn test_admission_bounds_are_inclusive() {
        assert!(is_admitted(&txn("a", "2023-01-01", 1.0), 2023, 2025));
        assert!(is_admitted(&txn("a", "2025-12-31", 1.0), 2023, 2025));
        assert!(!is_admitted(&txn("a", "2022-12-31", 1.0), 2023, 2025));
        assert!(!is_admitted(&txn("a", "2026-01-01", 1.0), 2023, 2025));
    }

    #[test]
    fn test_admission_rejects_non_positive_and_undated() {
        assert!(!is_admitted(&txn("a", "2024-01-01", 0.0), 2023, 2025));
        assert!(!is_admitted(&txn("a", "2024-01-01", -5.0), 2023, 2025));
        assert!(!is_admitted(&txn("a", "garbage", 5.0), 2023, 2025));
    }

    #[test]
    fn test_admit_empty_is_warning() {
        let err = admit(vec![txn("a", "2020-01-01", 10.0)], 2023, 2025).unwrap_err();
        assert!(err.is_warning());
    }

    #[test]
    fn test_sum_and_count_per_vendor_year() {
        let t = VendorYearTable::build(&[
            txn("hera", "2023-01-10", 100.0),
            txn("hera", "2023-02-10", 50.0),
            txn("hera", "2024-01-10", 80.0),
            txn("aruba", "2024-03-01", 20.0),
        ])
        .unwrap();
        assert_eq!(t.years(), &[2023, 2024]);
        assert_eq!(t.vendors(), &["aruba".to_string(), "hera".to_string()]);
        assert_eq!(t.value("hera", 2023), 150.0);
        assert_eq!(t.get("hera", 2023).map(|c| c.count), Some(2));
        assert_eq!(t.cell_count(), 3);
    }

    #[test]
    fn test_absent_cells_read_as_zero_and_are_not_stored() {
        let t = VendorYearTable::build(&[
            txn("hera", "2023-01-10", 100.0),
            txn("aruba", "2024-03-01", 20.0),
        ])
        .unwrap();
        assert!(t.get("aruba", 2023).is_none());
        assert_eq!(t.value("aruba", 2023), 0.0);
        assert_eq!(t.value("nobody", 2024), 0.0);
        assert_eq!(t.dense_row("aruba"), vec![0.0, 20.0]);
    }

    #[test]
    fn test_years_nonzero_never_exceeds_dataset_years() {
        let t = VendorYearTable::build(&[
            txn("hera", "2023-01-10", 100.0),
            txn("hera", "2025-01-10", 100.0),
            txn("aruba", "2024-03-01", 20.0),
        ])
        .unwrap();
        for v in t.vendors() {
            let positive = t.dense_row(v).iter().filter(|x| **x > 0.0).count();
            assert_eq!(t.years_nonzero(v), positive);
            assert!(t.years_nonzero(v) <= t.years().len());
        }
        assert_eq!(t.years_nonzero("hera"), 2);
        assert_eq!(t.vendor_total("hera"), 200.0);
        assert_eq!(t.latest_year(), 2025);
    }

    #[test]
    fn test_year_slice() {
        let t = VendorYearTable::build(&[
            txn("hera", "2024-01-10", 100.0),
            txn("aruba", "2024-03-01", 20.0),
            txn("aruba", "2023-03-01", 20.0),
        ])
        .unwrap();
        let slice: Vec<_> = t.year_slice(2024).map(|(v, c)| (v.to_string(), c.sum_net)).collect();
        assert_eq!(slice, vec![("aruba".to_string(), 20.0), ("hera".to_string(), 100.0)]);
    }

    #[test]
    fn test_no_years_is_empty_result() {
        let err = VendorYearTable::build(&[txn("a", "bad", 1.0)]).unwrap_err();
        assert!(err.is_warning());
    }

    #[test]
    fn test_prepare_normalizes_and_categorizes() {
        let rows = vec![RawRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            amount: 10.0,
            vendor: Some("ARVAL  Service".to_string()),
            account: String::new(),
            text: String::new(),
        }];
        let txns = prepare(&rows, &Normalizer::default(), &Categorizer::default());
        assert_eq!(txns[0].vendor_norm, "arval service");
        assert_eq!(txns[0].category, Category::LeasingVehicle);
        assert_eq!(txns[0].year(), Some(2024));
    }
}
