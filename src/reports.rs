use serde::Serialize;

use crate::aggregator::{admit, prepare, VendorYearTable};
use crate::alarms::detect_alarms;
use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::fmt::{money, pct};
use crate::fuzzy::{FuzzyMatcher, FuzzyStatus};
use crate::models::{Alarm, RawRow, VendorProfile};
use crate::normalizer::Normalizer;
use crate::profiles::build_profiles;
use crate::savings::{estimate_savings, RateTable, SavingsReport};
use crate::settings::AnalysisConfig;

pub const REPORT_TITLE: &str = "Pilot report \u{2013} Cost Scanner";
pub const HEURISTICS_NOTE: &str = "Categories and savings rates are heuristics. \
     The savings potential is a conservative estimate, not a negotiated saving.";

/// One line of the trend table: the vendor profile plus its spend per dataset year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub profile: VendorProfile,
    pub by_year: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub config: AnalysisConfig,
    pub years: Vec<i32>,
    pub latest_year: i32,
    pub trend: Vec<TrendRow>,
    pub alarms: Vec<Alarm>,
    pub savings: SavingsReport,
    pub fuzzy: FuzzyStatus,
}

impl Report {
    /// Key figures for the PDF summary and the CLI footer.
    pub fn summary_rows(&self) -> Vec<(String, String)> {
        vec![
            ("Period".to_string(), self.config.period_label()),
            (
                format!("Relevant cost ({})", self.latest_year),
                money(self.savings.relevant_cost),
            ),
            (
                "Savings potential (conservative)".to_string(),
                money(self.savings.potential_total),
            ),
            ("Potential rate".to_string(), pct(self.savings.potential_pct)),
            ("Alarms".to_string(), self.alarms.len().to_string()),
        ]
    }

    pub fn recurring_count(&self) -> usize {
        self.trend.iter().filter(|r| r.profile.recurring_flag).count()
    }
}

/// Immutable rule data for a run: vendor normalization, category rules,
/// savings rates and the optional fuzzy capability.
pub struct Pipeline {
    pub normalizer: Normalizer,
    pub categorizer: Categorizer,
    pub rates: RateTable,
    pub fuzzy: Option<FuzzyMatcher>,
}

impl Pipeline {
    pub fn new(ampersand_word: &str) -> Self {
        Self {
            normalizer: Normalizer::new(ampersand_word),
            categorizer: Categorizer::default(),
            rates: RateTable::default(),
            fuzzy: FuzzyMatcher::probe(),
        }
    }

    /// Filter, aggregate, profile, then derive alarms and savings. All or nothing.
    pub fn run(&self, rows: &[RawRow], config: &AnalysisConfig) -> Result<Report> {
        config.validate()?;
        let txns = prepare(rows, &self.normalizer, &self.categorizer);
        let txns = admit(txns, config.year_min, config.year_max)?;
        let table = VendorYearTable::build(&txns)?;
        let profiles = build_profiles(&txns, &table);

        let mut trend: Vec<TrendRow> = profiles
            .values()
            .map(|p| TrendRow {
                by_year: table.dense_row(&p.vendor),
                profile: p.clone(),
            })
            .collect();
        trend.sort_by(|a, b| b.profile.total.total_cmp(&a.profile.total));

        let alarms = detect_alarms(
            &table,
            &profiles,
            f64::from(config.alarm_threshold_pct),
            config.alarm_min_base,
        );
        let savings = estimate_savings(&table, &profiles, &self.rates);
        let fuzzy = FuzzyMatcher::status(self.fuzzy.as_ref(), table.vendors());

        tracing::info!(
            admitted = txns.len(),
            vendors = table.vendors().len(),
            cells = table.cell_count(),
            years = table.years().len(),
            alarms = alarms.len(),
            "analysis complete"
        );

        Ok(Report {
            config: config.clone(),
            years: table.years().to_vec(),
            latest_year: table.latest_year(),
            trend,
            alarms,
            savings,
            fuzzy,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new("und")
    }
}
