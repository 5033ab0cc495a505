use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::importer::{detect_columns, read_table, ColumnDetection, ColumnSynonyms};

pub fn format_detection(headers: &[String], detection: &ColumnDetection, synonyms: &ColumnSynonyms) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Role", "Column", "Required"]);
    for (role, _) in &synonyms.roles {
        let column = match detection.index(*role) {
            Some(i) => Cell::new(&headers[i]),
            None if role.is_required() => Cell::new("(missing)".red().bold()),
            None => Cell::new("(not found)".dimmed()),
        };
        table.add_row(vec![
            Cell::new(role),
            column,
            Cell::new(if role.is_required() { "yes" } else { "" }),
        ]);
    }

    let mut out = format!("Columns\n{table}\nDetected headers: {}", headers.join(", "));
    if !detection.missing.is_empty() {
        let missing: Vec<String> = detection.missing.iter().map(|r| r.to_string()).collect();
        out.push_str(&format!("\nMissing required roles: {}", missing.join(", ")));
    }
    out
}

pub fn run(file: &str) -> Result<()> {
    let table = read_table(Path::new(file))?;
    let synonyms = ColumnSynonyms::default();
    let detection = detect_columns(&table.headers, &synonyms);
    println!("{}", format_detection(&table.headers, &detection, &synonyms));
    println!("{} data rows", table.rows.len());
    Ok(())
}
