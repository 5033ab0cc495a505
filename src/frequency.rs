use chrono::NaiveDate;

use crate::models::Frequency;

/// Classify a median booking gap (days). Bands are closed intervals.
pub fn classify_median_gap(median_days: f64) -> Frequency {
    match median_days {
        d if (25.0..=35.0).contains(&d) => Frequency::Monthly,
        d if (55.0..=75.0).contains(&d) => Frequency::BiMonthly,
        d if (80.0..=110.0).contains(&d) => Frequency::Quarterly,
        d if (330.0..=400.0).contains(&d) => Frequency::Yearly,
        _ => Frequency::Unclear,
    }
}

fn median(sorted: &[i64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2] as f64),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0),
    }
}

/// Guess a vendor's cadence from its booking dates (any order).
pub fn guess_frequency(dates: &[NaiveDate]) -> Frequency {
    if dates.len() < 3 {
        return Frequency::Unclear;
    }
    let mut dates = dates.to_vec();
    dates.sort_unstable();
    let mut gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    gaps.sort_unstable();
    median(&gaps).map_or(Frequency::Unclear, classify_median_gap)
}
