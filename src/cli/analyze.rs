use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{run_pipeline, RunArgs};
use crate::error::Result;
use crate::fmt::{amount, money, pct};
use crate::fuzzy::FuzzyStatus;
use crate::models::AlarmKind;
use crate::reports::{Report, HEURISTICS_NOTE};

fn num(val: f64) -> Cell {
    Cell::new(amount(val)).set_alignment(CellAlignment::Right)
}

fn limit(top: Option<usize>, len: usize) -> usize {
    top.map_or(len, |n| n.min(len))
}

fn more_line(shown: usize, total: usize) -> String {
    if shown < total {
        format!("\n({} more not shown)", total - shown)
    } else {
        String::new()
    }
}

pub fn format_trend(report: &Report, top: Option<usize>) -> String {
    let mut table = Table::new();
    let mut header = vec!["Vendor".to_string(), "Category".to_string()];
    header.extend(report.years.iter().map(|y| y.to_string()));
    header.extend(
        ["Total", "Years", "Latest", "Frequency", "Recurring"]
            .iter()
            .map(|s| s.to_string()),
    );
    table.set_header(header);

    let shown = limit(top, report.trend.len());
    for row in &report.trend[..shown] {
        let p = &row.profile;
        let mut cells = vec![Cell::new(&p.vendor), Cell::new(p.category.label())];
        cells.extend(row.by_year.iter().map(|v| num(*v)));
        cells.push(num(p.total));
        cells.push(Cell::new(p.years_nonzero).set_alignment(CellAlignment::Right));
        cells.push(num(p.latest_cost));
        cells.push(Cell::new(p.freq_guess.label()));
        cells.push(Cell::new(if p.recurring_flag { "yes" } else { "" }));
        table.add_row(cells);
    }

    format!(
        "Cost trend by vendor ({} recurring)\n{table}{}",
        report.recurring_count(),
        more_line(shown, report.trend.len())
    )
}

pub fn format_alarms(report: &Report, top: Option<usize>) -> String {
    if report.alarms.is_empty() {
        return format!(
            "Alarms\nNo alarms at {}% threshold and minimum base {}.",
            report.config.alarm_threshold_pct,
            money(report.config.alarm_min_base)
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Vendor", "Period", "Type", "Base", "New", "Delta", "%", "Category"]);
    let shown = limit(top, report.alarms.len());
    for a in &report.alarms[..shown] {
        let kind = match a.kind {
            AlarmKind::New => a.kind.label().yellow().bold(),
            AlarmKind::Dropped => a.kind.label().cyan().bold(),
            AlarmKind::Changed if a.delta > 0.0 => a.kind.label().red().bold(),
            AlarmKind::Changed => a.kind.label().green().bold(),
        };
        table.add_row(vec![
            Cell::new(&a.vendor),
            Cell::new(&a.period),
            Cell::new(kind),
            num(a.base),
            num(a.new),
            num(a.delta),
            Cell::new(a.pct.map(pct).unwrap_or_default()).set_alignment(CellAlignment::Right),
            Cell::new(a.category.label()),
        ]);
    }
    format!("Alarms\n{table}{}", more_line(shown, report.alarms.len()))
}

pub fn format_savings(report: &Report, top: Option<usize>) -> String {
    let savings = &report.savings;
    let mut table = Table::new();
    let cost_header = format!("Cost {}", savings.year);
    table.set_header(vec!["Vendor", "Category", cost_header.as_str(), "Rate", "Potential", "Count"]);
    let shown = limit(top, savings.rows.len());
    for s in &savings.rows[..shown] {
        table.add_row(vec![
            Cell::new(&s.vendor),
            Cell::new(s.category.label()),
            num(s.cost),
            Cell::new(pct(s.rate * 100.0)).set_alignment(CellAlignment::Right),
            num(s.potential),
            Cell::new(s.count).set_alignment(CellAlignment::Right),
        ]);
    }
    format!(
        "Savings potential ({})\n{table}{}",
        savings.year,
        more_line(shown, savings.rows.len())
    )
}

pub fn format_summary(report: &Report) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    for (key, value) in report.summary_rows() {
        table.add_row(vec![Cell::new(key.bold()), Cell::new(value)]);
    }

    let mut out = format!("Summary\n{table}\n{}\n{}", HEURISTICS_NOTE.dimmed(), report.fuzzy.footer());
    if let FuzzyStatus::Available { similar } = &report.fuzzy {
        for pair in similar {
            out.push_str(&format!(
                "\n  possible duplicate: \"{}\" ~ \"{}\" ({:.2})",
                pair.left, pair.right, pair.score
            ));
        }
    }
    out
}

pub fn run(file: &str, run: &RunArgs, top: Option<usize>) -> Result<()> {
    let (_, report) = run_pipeline(file, run)?;
    println!("{}\n", format_trend(&report, top));
    println!("{}\n", format_alarms(&report, top));
    println!("{}\n", format_savings(&report, top));
    println!("{}", format_summary(&report));
    Ok(())
}
