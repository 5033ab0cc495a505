use std::fmt;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{CostscanError, Result};
use crate::models::RawRow;

// ---------------------------------------------------------------------------
// Cell parsing helpers
// ---------------------------------------------------------------------------

/// Parse a net amount. Accepts decimal commas, currency symbols and
/// parenthesized negatives; anything unparseable reads as 0.0.
pub fn parse_amount(raw: &str) -> f64 {
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '€' | '$' | '\'' | ' ' | '\u{a0}'))
        .collect();
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -parse_amount(inner);
    }
    let s = match (s.rfind('.'), s.rfind(',')) {
        // 1.234,56
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) if s.matches(',').count() == 1 => s.replace(',', "."),
        (None, Some(_)) => s.replace(',', ""),
        _ => s.to_string(),
    };
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse a booking date, day-first for the dotted and slashed forms.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    // ISO datetime: keep the date part
    if raw.len() > 10 && raw.is_char_boundary(10) && matches!(raw.as_bytes()[10], b'T' | b' ') {
        return NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d").ok();
    }
    None
}

#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::try_days(serial.trunc() as i64)?)
}

/// Pick the most frequent candidate delimiter in the header line.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0usize);
    for d in [b',', b';', b'\t', b'|'] {
        let n = header_line.bytes().filter(|b| *b == d).count();
        if n > best.1 {
            best = (d, n);
        }
    }
    best.0
}

// ---------------------------------------------------------------------------
// Raw table (CSV or XLSX)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date(s),
            _ => None,
        }
    }

    fn as_amount(&self) -> f64 {
        match self {
            Cell::Number(n) if n.is_finite() => *n,
            Cell::Text(s) => parse_amount(s),
            _ => 0.0,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Legacy exports are usually Latin-1; every byte maps to one char
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

pub fn read_csv_str(content: &str) -> Result<RawTable> {
    let header_line = content.lines().next().unwrap_or("");
    let delimiter = sniff_delimiter(header_line);
    let shown = (delimiter as char).escape_default().to_string();
    tracing::debug!(delimiter = %shown, "sniffed delimiter");

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CostscanError::Ingestion("no header row found".to_string()));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|f| {
                    if f.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(f.to_string())
                    }
                })
                .collect(),
        );
    }
    if skipped > 0 {
        tracing::warn!(skipped, "skipped malformed CSV records");
    }
    Ok(RawTable { headers, rows })
}

#[cfg(feature = "xlsx")]
fn read_xlsx(file_path: &Path) -> Result<RawTable> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CostscanError::Ingestion("workbook has no sheets".to_string()))?;
    let range = workbook.worksheet_range(&sheet)?;

    let to_cell = |d: &Data| match d {
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(Cell::Empty, Cell::Date),
        Data::Bool(b) => Cell::Text(b.to_string()),
        _ => Cell::Empty,
    };

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| CostscanError::Ingestion(format!("sheet '{sheet}' is empty")))?
        .iter()
        .map(|d| match to_cell(d) {
            Cell::Text(s) => s.trim().to_string(),
            other => other.as_text().unwrap_or_default(),
        })
        .collect();
    let rows = rows_iter
        .map(|r| r.iter().map(to_cell).collect::<Vec<_>>())
        .filter(|r| r.iter().any(|c| *c != Cell::Empty))
        .collect();
    Ok(RawTable { headers, rows })
}

pub fn read_table(file_path: &Path) -> Result<RawTable> {
    let is_workbook = file_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm" | "xls" | "ods"));
    if is_workbook {
        #[cfg(feature = "xlsx")]
        return read_xlsx(file_path);
        #[cfg(not(feature = "xlsx"))]
        return Err(CostscanError::Ingestion(
            "spreadsheet input requires the `xlsx` feature".to_string(),
        ));
    }
    let bytes = std::fs::read(file_path)?;
    read_csv_str(&decode(&bytes))
}

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Date,
    Amount,
    Vendor,
    Account,
    Text,
}

impl Role {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Vendor => "vendor",
            Self::Account => "account",
            Self::Text => "text",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Date | Self::Amount | Self::Vendor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Header substrings per role, English and Italian.
#[derive(Debug, Clone)]
pub struct ColumnSynonyms {
    pub roles: Vec<(Role, Vec<&'static str>)>,
}

impl Default for ColumnSynonyms {
    fn default() -> Self {
        Self {
            roles: vec![
                (Role::Date, vec!["date", "data"]),
                (Role::Amount, vec!["amount", "importo"]),
                (Role::Vendor, vec!["vendor", "fornitore"]),
                (Role::Account, vec!["account", "conto"]),
                (Role::Text, vec!["text", "descrizione"]),
            ],
        }
    }
}

pub struct ColumnDetection {
    /// Resolved (role, column index) pairs, in synonym-list order.
    pub found: Vec<(Role, usize)>,
    pub missing: Vec<Role>,
}

impl ColumnDetection {
    pub fn index(&self, role: Role) -> Option<usize> {
        self.found.iter().find(|(r, _)| *r == role).map(|(_, i)| *i)
    }
}

/// Match headers against the synonym lists. A later matching column
/// overrides an earlier one.
pub fn detect_columns(headers: &[String], synonyms: &ColumnSynonyms) -> ColumnDetection {
    let mut found = Vec::new();
    let mut missing = Vec::new();
    for (role, words) in &synonyms.roles {
        let idx = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                let lc = h.trim().to_lowercase();
                words.iter().any(|w| lc.contains(w))
            })
            .map(|(i, _)| i)
            .last();
        match idx {
            Some(i) => found.push((*role, i)),
            None if role.is_required() => missing.push(*role),
            None => {}
        }
    }
    ColumnDetection { found, missing }
}

pub struct ColumnMapping {
    pub date: usize,
    pub amount: usize,
    pub vendor: usize,
    pub account: Option<usize>,
    pub text: Option<usize>,
}

pub fn resolve_columns(headers: &[String], synonyms: &ColumnSynonyms) -> Result<ColumnMapping> {
    let det = detect_columns(headers, synonyms);
    match (det.index(Role::Date), det.index(Role::Amount), det.index(Role::Vendor)) {
        (Some(date), Some(amount), Some(vendor)) => Ok(ColumnMapping {
            date,
            amount,
            vendor,
            account: det.index(Role::Account),
            text: det.index(Role::Text),
        }),
        _ => Err(CostscanError::MissingColumns {
            missing: det.missing.iter().map(|r| r.to_string()).collect(),
            detected: headers.to_vec(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Ledger loading
// ---------------------------------------------------------------------------

pub fn extract_rows(table: &RawTable, mapping: &ColumnMapping) -> Vec<RawRow> {
    let empty = Cell::Empty;
    table
        .rows
        .iter()
        .map(|row| {
            let cell = |i: usize| row.get(i).unwrap_or(&empty);
            let opt_text = |i: Option<usize>| {
                i.and_then(|i| cell(i).as_text())
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            };
            RawRow {
                date: cell(mapping.date).as_date(),
                amount: cell(mapping.amount).as_amount(),
                vendor: cell(mapping.vendor).as_text(),
                account: opt_text(mapping.account),
                text: opt_text(mapping.text),
            }
        })
        .collect()
}

pub fn load_ledger(file_path: &Path, synonyms: &ColumnSynonyms) -> Result<Vec<RawRow>> {
    let table = read_table(file_path)?;
    let mapping = resolve_columns(&table.headers, synonyms)?;
    let rows = extract_rows(&table, &mapping);
    tracing::info!(
        file = %file_path.display(),
        rows = rows.len(),
        "read ledger"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1234.56"), 1234.56);
        assert_eq!(parse_amount("\"500.00\""), 500.0);
        assert_eq!(parse_amount("  -42.50  "), -42.5);
        assert_eq!(parse_amount("0"), 0.0);
        assert_eq!(parse_amount("not_a_number"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn test_parse_amount_decimal_comma() {
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount("99,90 €"), 99.9);
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("1,234,567"), 1234567.0);
    }

    #[test]
    fn test_parse_amount_parenthesized_negatives() {
        assert_eq!(parse_amount("(500.00)"), -500.0);
        assert_eq!(parse_amount("(1.234,56)"), -1234.56);
    }

    #[test]
    fn test_parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("2024-03-05"), d);
        assert_eq!(parse_date("05.03.2024"), d);
        assert_eq!(parse_date("05/03/2024"), d);
        assert_eq!(parse_date("2024-03-05T10:15:00"), d);
        assert_eq!(parse_date("2024-03-05 10:15"), d);
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert_eq!(parse_date("31.02.2024"), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn test_excel_serial_out_of_range_is_none() {
        assert_eq!(excel_serial_to_date(1e20), None);
        assert_eq!(excel_serial_to_date(-1e20), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(f64::INFINITY), None);
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("date;amount;vendor"), b';');
        assert_eq!(sniff_delimiter("date\tamount\tvendor"), b'\t');
        assert_eq!(sniff_delimiter("date,amount,vendor"), b',');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn test_detect_bilingual_template_headers() {
        let h = headers(&[
            "date / data",
            "amount_net / importo_netto",
            "vendor_raw / fornitore_originale",
            "account / conto",
            "text / descrizione",
            "vat_rate / aliquota_iva",
        ]);
        let m = resolve_columns(&h, &ColumnSynonyms::default()).unwrap();
        assert_eq!((m.date, m.amount, m.vendor), (0, 1, 2));
        assert_eq!(m.account, Some(3));
        assert_eq!(m.text, Some(4));
    }

    #[test]
    fn test_detect_is_case_insensitive_and_last_match_wins() {
        let h = headers(&["Data", "Importo", "Fornitore", "Vendor Code"]);
        let det = detect_columns(&h, &ColumnSynonyms::default());
        assert_eq!(det.index(Role::Date), Some(0));
        assert_eq!(det.index(Role::Vendor), Some(3));
        assert!(det.missing.is_empty());
        assert_eq!(det.index(Role::Account), None);
    }

    #[test]
    fn test_missing_required_columns_reported() {
        let h = headers(&["Booking day", "Amount", "Notes"]);
        let err = resolve_columns(&h, &ColumnSynonyms::default()).err().unwrap();
        match err {
            CostscanError::MissingColumns { missing, detected } => {
                assert_eq!(missing, vec!["date", "vendor"]);
                assert_eq!(detected, h);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_csv_semicolon_with_bad_cells() {
        let content = "\
date;amount;vendor;text
2024-01-15;120,50;Hera Comm;Strom
not a date;80;Aruba;
2024-02-15;n/a;Aruba;Hosting
";
        let table = read_csv_str(content).unwrap();
        let mapping = resolve_columns(&table.headers, &ColumnSynonyms::default()).unwrap();
        let rows = extract_rows(&table, &mapping);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].amount, 120.5);
        assert_eq!(rows[0].vendor.as_deref(), Some("Hera Comm"));
        assert_eq!(rows[0].text, "Strom");
        assert_eq!(rows[1].date, None);
        assert_eq!(rows[1].text, "");
        assert_eq!(rows[2].amount, 0.0);
        assert_eq!(rows[2].account, "");
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let content = "date,amount,vendor,account\n2024-01-15,10\n";
        let table = read_csv_str(content).unwrap();
        let mapping = resolve_columns(&table.headers, &ColumnSynonyms::default()).unwrap();
        let rows = extract_rows(&table, &mapping);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vendor, None);
        assert_eq!(rows[0].account, "");
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = b"date,amount,vendor\n2024-01-15,10,M\xfcller\n";
        let table = read_csv_str(&decode(bytes)).unwrap();
        assert_eq!(table.rows[0][2], Cell::Text("Müller".to_string()));
    }

    #[test]
    fn test_load_ledger_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(&path, "date,amount,vendor\n2024-01-15,10,Aruba\n").unwrap();
        let rows = load_ledger(&path, &ColumnSynonyms::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(matches!(
            load_ledger(&dir.path().join("missing.csv"), &ColumnSynonyms::default()),
            Err(CostscanError::Io(_))
        ));
    }
}
