/// Round to two decimal places for display. Accumulation never rounds.
pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let fixed = format!("{:.2}", round2(val).abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if round2(val) < 0.0 { "-" } else { "" };
    format!("{sign}${}.{dec_part}", group_thousands(int_part))
}

/// `money` for values that may be undefined (mean of an empty group).
pub fn money_opt(val: Option<f64>) -> String {
    val.map(money).unwrap_or_else(|| "\u{2014}".to_string())
}

pub fn pct(val: f64) -> String {
    format!("{:.2}%", round2(val))
}
