use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;
use crate::reports::Report;

pub const TRENDS_SHEET: &str = "trends";
pub const ALARMS_SHEET: &str = "alarms";
pub const SAVINGS_SHEET: &str = "savings";

fn write_header(sheet: &mut Worksheet, headers: &[String], bold: &Format) -> Result<()> {
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, h, bold)?;
    }
    Ok(())
}

fn trends_sheet(report: &Report, bold: &Format) -> Result<Worksheet> {
    let mut sheet = Worksheet::new();
    sheet.set_name(TRENDS_SHEET)?;

    let mut headers = vec!["vendor".to_string(), "category".to_string()];
    headers.extend(report.years.iter().map(|y| y.to_string()));
    headers.extend(
        ["total", "years_nonzero", "latest_cost", "freq_guess", "recurring_flag"]
            .iter()
            .map(|s| s.to_string()),
    );
    write_header(&mut sheet, &headers, bold)?;

    for (i, row) in report.trend.iter().enumerate() {
        let r = i as u32 + 1;
        let p = &row.profile;
        sheet.write_string(r, 0, &p.vendor)?;
        sheet.write_string(r, 1, p.category.label())?;
        let mut col: u16 = 2;
        for value in &row.by_year {
            sheet.write_number(r, col, *value)?;
            col += 1;
        }
        sheet.write_number(r, col, p.total)?;
        sheet.write_number(r, col + 1, p.years_nonzero as f64)?;
        sheet.write_number(r, col + 2, p.latest_cost)?;
        sheet.write_string(r, col + 3, p.freq_guess.label())?;
        sheet.write_boolean(r, col + 4, p.recurring_flag)?;
    }
    sheet.set_column_width(0, 32)?;
    Ok(sheet)
}

fn alarms_sheet(report: &Report, bold: &Format) -> Result<Worksheet> {
    let mut sheet = Worksheet::new();
    sheet.set_name(ALARMS_SHEET)?;
    let headers: Vec<String> = ["vendor", "period", "type", "base", "new", "delta", "pct", "category"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    write_header(&mut sheet, &headers, bold)?;

    for (i, a) in report.alarms.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &a.vendor)?;
        sheet.write_string(r, 1, &a.period)?;
        sheet.write_string(r, 2, a.kind.label())?;
        sheet.write_number(r, 3, a.base)?;
        sheet.write_number(r, 4, a.new)?;
        sheet.write_number(r, 5, a.delta)?;
        if let Some(pct) = a.pct {
            sheet.write_number(r, 6, pct)?;
        }
        sheet.write_string(r, 7, a.category.label())?;
    }
    sheet.set_column_width(0, 32)?;
    Ok(sheet)
}

fn savings_sheet(report: &Report, bold: &Format) -> Result<Worksheet> {
    let mut sheet = Worksheet::new();
    sheet.set_name(SAVINGS_SHEET)?;
    let headers = vec![
        "vendor".to_string(),
        "category".to_string(),
        format!("cost_{}", report.savings.year),
        "rate".to_string(),
        "potential".to_string(),
        "count".to_string(),
    ];
    write_header(&mut sheet, &headers, bold)?;

    for (i, s) in report.savings.rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &s.vendor)?;
        sheet.write_string(r, 1, s.category.label())?;
        sheet.write_number(r, 2, s.cost)?;
        sheet.write_number(r, 3, s.rate)?;
        sheet.write_number(r, 4, s.potential)?;
        sheet.write_number(r, 5, s.count as f64)?;
    }
    sheet.set_column_width(0, 32)?;
    Ok(sheet)
}

/// Three-sheet workbook: trends, alarms, savings. The alarms sheet is
/// written even when there are no alarms.
pub fn render_workbook(report: &Report) -> Result<Vec<u8>> {
    let bold = Format::new().set_bold();
    let mut workbook = Workbook::new();
    workbook.push_worksheet(trends_sheet(report, &bold)?);
    workbook.push_worksheet(alarms_sheet(report, &bold)?);
    workbook.push_worksheet(savings_sheet(report, &bold)?);
    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(bytes = bytes.len(), "rendered workbook");
    Ok(bytes)
}
