fn with_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Plain two-decimal amount for table cells: 1,234.56
pub fn amount(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let negative = val < 0.0 && cents != "0.00";
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if negative { "-" } else { "" };
    format!("{sign}{}.{dec_part}", with_thousands(int_part))
}

/// Format a float as a euro amount with thousands separators: 1,234.56 €
pub fn money(val: f64) -> String {
    format!("{} \u{20ac}", amount(val))
}

pub fn pct(val: f64) -> String {
    format!("{val:.1} %")
}
