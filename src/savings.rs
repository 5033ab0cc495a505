use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregator::VendorYearTable;
use crate::models::{Category, SavingsRow};
use crate::profiles::Profiles;

/// Conservative savings rate per category.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: BTreeMap<Category, f64>,
    fallback: f64,
}

impl RateTable {
    pub fn new(rates: BTreeMap<Category, f64>, fallback: f64) -> Self {
        Self { rates, fallback }
    }

    pub fn rate(&self, category: Category) -> f64 {
        self.rates.get(&category).copied().unwrap_or(self.fallback)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let rates = BTreeMap::from([
            (Category::LeasingVehicle, 0.05),
            (Category::Marketing, 0.15),
            (Category::Energy, 0.10),
            (Category::SoftwareIt, 0.20),
            (Category::FeesMandatory, 0.00),
            (Category::ConsultingServices, 0.05),
            (Category::Other, 0.10),
        ]);
        Self::new(rates, 0.10)
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsReport {
    pub year: i32,
    pub rows: Vec<SavingsRow>,
    pub relevant_cost: f64,
    pub potential_total: f64,
    pub potential_pct: f64,
}

/// Apply category rates to each vendor's spend in the dataset's latest year.
pub fn estimate_savings(table: &VendorYearTable, profiles: &Profiles, rates: &RateTable) -> SavingsReport {
    let year = table.latest_year();
    let mut rows: Vec<SavingsRow> = table
        .year_slice(year)
        .map(|(vendor, cell)| {
            let category = profiles.get(vendor).map_or(Category::Other, |p| p.category);
            let rate = rates.rate(category);
            SavingsRow {
                vendor: vendor.to_string(),
                category,
                cost: cell.sum_net,
                rate,
                potential: round2(cell.sum_net * rate),
                count: cell.count,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.potential.total_cmp(&a.potential));

    let relevant_cost: f64 = rows.iter().map(|r| r.cost).sum();
    let potential_total: f64 = rows.iter().map(|r| r.potential).sum();
    SavingsReport {
        year,
        rows,
        relevant_cost,
        potential_total,
        potential_pct: share_pct(potential_total, relevant_cost),
    }
}

/// `part / whole` as a percentage; 0.0 when `whole` is not positive.
pub fn share_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
