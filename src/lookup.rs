use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::models::{parse_month, Transaction};

/// Category argument of a lookup: one label, or every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChoice {
    All,
    Named(String),
}

impl CategoryChoice {
    pub fn parse(raw: &str) -> Self {
        if raw == "All" {
            Self::All
        } else {
            Self::Named(raw.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Named(name) => name,
        }
    }

    fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == category,
        }
    }
}

/// Rows in `month` for the chosen category, newest first. A search term
/// narrows by case-insensitive substring match on the description.
pub fn transactions_for(
    rows: &[Transaction],
    category: &CategoryChoice,
    month: &str,
    search: Option<&str>,
) -> Result<Vec<Transaction>> {
    parse_month(month)?;
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut out: Vec<Transaction> = rows
        .iter()
        .filter(|t| t.month == month && category.matches(&t.category))
        .filter(|t| {
            needle
                .as_ref()
                .map_or(true, |n| t.description.to_lowercase().contains(n))
        })
        .cloned()
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupStats {
    pub total: f64,
    /// Mean over rows that have an amount.
    pub mean: Option<f64>,
    pub count: usize,
}

pub fn lookup_stats(rows: &[Transaction]) -> LookupStats {
    let amounts: Vec<f64> = rows.iter().filter_map(|t| t.amount).collect();
    let total: f64 = amounts.iter().sum();
    LookupStats {
        total,
        mean: (!amounts.is_empty()).then(|| total / amounts.len() as f64),
        count: rows.len(),
    }
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

pub const EXPORT_COLUMNS: [&str; 5] = ["date", "description", "amount", "type", "category"];

pub fn export_file_name(category: &CategoryChoice, month: &str) -> String {
    let safe: String = category
        .label()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("transactions_{safe}_{month}.csv")
}

pub fn write_csv<W: Write>(rows: &[Transaction], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS)?;
    for t in rows {
        let amount = t.amount.map(|a| a.to_string()).unwrap_or_default();
        let date = t.date.format("%Y-%m-%d").to_string();
        wtr.write_record([
            date.as_str(),
            t.description.as_str(),
            amount.as_str(),
            t.txn_type.as_str(),
            t.category.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(rows: &[Transaction], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(rows, std::io::BufWriter::new(file))
}
