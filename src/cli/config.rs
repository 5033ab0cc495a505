use comfy_table::{Cell, CellAlignment, Table};

use crate::categorizer::Categorizer;
use crate::error::{CostscanError, Result};
use crate::fmt::pct;
use crate::models::Category;
use crate::savings::RateTable;
use crate::settings::{load_settings, save_settings, settings_path, Settings};

/// Built-in category rules and savings rates. Not configurable.
pub fn format_heuristics(categorizer: &Categorizer, rates: &RateTable) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Rules", "Savings rate"]);
    for category in Category::ALL {
        let rules = categorizer
            .rules()
            .iter()
            .filter(|r| r.category == category)
            .count();
        table.add_row(vec![
            Cell::new(category.label()),
            Cell::new(rules).set_alignment(CellAlignment::Right),
            Cell::new(pct(rates.rate(category) * 100.0)).set_alignment(CellAlignment::Right),
        ]);
    }
    format!("Heuristics\n{table}")
}

pub fn show() -> Result<()> {
    let settings = load_settings();
    let path = settings_path();
    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| CostscanError::Settings(e.to_string()))?;
    let origin = if path.exists() { "" } else { " (defaults, not saved)" };
    println!("Settings: {}{origin}", path.display());
    println!("{json}");
    println!();
    println!("{}", format_heuristics(&Categorizer::default(), &RateTable::default()));
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = settings_path();
    if path.exists() && !force {
        return Err(CostscanError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    save_settings(&Settings::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("Set {key}");
    Ok(())
}
