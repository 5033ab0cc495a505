use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Fixed set of spend categories. `Other` is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    LeasingVehicle,
    Marketing,
    Energy,
    SoftwareIt,
    FeesMandatory,
    ConsultingServices,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::LeasingVehicle,
        Self::Marketing,
        Self::Energy,
        Self::SoftwareIt,
        Self::FeesMandatory,
        Self::ConsultingServices,
        Self::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LeasingVehicle => "Leasing/Vehicle",
            Self::Marketing => "Marketing",
            Self::Energy => "Energy",
            Self::SoftwareIt => "Software/IT",
            Self::FeesMandatory => "Fees/Mandatory",
            Self::ConsultingServices => "Consulting/Services",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recurrence cadence inferred from the gaps between a vendor's bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    Monthly,
    BiMonthly,
    Quarterly,
    Yearly,
    Unclear,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::BiMonthly => "bi-monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
            Self::Unclear => "unclear",
        }
    }

    pub fn is_periodic(&self) -> bool {
        !matches!(self, Self::Unclear)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Intermediate representation from the CSV/XLSX reader, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub vendor: Option<String>,
    pub account: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub date: Option<NaiveDate>,
    pub amount_net: f64,
    pub vendor_raw: String,
    pub vendor_norm: String,
    pub account: String,
    pub text: String,
    pub category: Category,
}

impl Transaction {
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VendorYearAggregate {
    pub sum_net: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorProfile {
    pub vendor: String,
    pub category: Category,
    pub total: f64,
    pub years_nonzero: usize,
    /// Spend in the dataset's latest year, not the vendor's own last active year.
    pub latest_cost: f64,
    pub freq_guess: Frequency,
    pub recurring_flag: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlarmKind {
    New,
    Dropped,
    Changed,
}

impl AlarmKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Dropped => "DROPPED",
            Self::Changed => "CHANGED",
        }
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alarm {
    pub vendor: String,
    pub period: String,
    pub kind: AlarmKind,
    pub base: f64,
    pub new: f64,
    pub delta: f64,
    pub pct: Option<f64>,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsRow {
    pub vendor: String,
    pub category: Category,
    pub cost: f64,
    pub rate: f64,
    pub potential: f64,
    pub count: usize,
}
