use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, SpendError};

/// Label given to rows whose category is missing.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TxnType {
    Deposit,
    Withdrawal,
    /// Anything else found in the `type` column (transfers, opening balances).
    /// Kept so exports reproduce the source, but never counted as income or expense.
    Other(String),
}

impl TxnType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Deposit" => Self::Deposit,
            "Withdrawal" => Self::Withdrawal,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
            Self::Other(s) => s,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized ledger row. `amount` is `None` when the source value was not numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub month: String,
    pub amount: Option<f64>,
    pub category: String,
    pub txn_type: TxnType,
    pub description: String,
}

impl Transaction {
    /// Build a row applying the load-time normalization: absolute amount,
    /// default category and the derived month bucket.
    pub fn new(
        date: NaiveDate,
        amount: Option<f64>,
        category: Option<&str>,
        txn_type: TxnType,
        description: &str,
    ) -> Self {
        let category = match category {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => UNCATEGORIZED.to_string(),
        };
        Self {
            date,
            month: month_bucket(date),
            amount: amount.map(f64::abs),
            category,
            txn_type,
            description: description.to_string(),
        }
    }
}

pub fn month_bucket(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parse a `YYYY-MM` bucket into (year, month).
pub fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || SpendError::InvalidMonth(raw.to_string());
    let (y, m) = raw.trim().split_once('-').ok_or_else(invalid)?;
    if y.len() != 4 || m.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Inclusive count of calendar months touched by `[start, end]`.
pub fn months_spanned(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() * 12 + end.month() as i32) - (start.year() * 12 + start.month() as i32) + 1
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub dropped_dates: usize,
    pub unparsed_amounts: usize,
    pub unrecognized_types: usize,
}

/// The normalized transaction table. Built once per load and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    rows: Vec<Transaction>,
    pub stats: LoadStats,
}

impl Ledger {
    pub fn new(rows: Vec<Transaction>, stats: LoadStats) -> Self {
        Self { rows, stats }
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Transaction>) -> Self {
        let stats = LoadStats {
            rows_read: rows.len(),
            unrecognized_types: rows.iter().filter(|t| !t.txn_type.is_recognized()).count(),
            ..Default::default()
        };
        Self { rows, stats }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.rows.iter().map(|t| t.category.as_str()).collect();
        set.into_iter().map(String::from).collect()
    }

    pub fn months(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.rows.iter().map(|t| t.month.as_str()).collect();
        set.into_iter().map(String::from).collect()
    }

    pub fn latest_month(&self) -> Option<String> {
        self.rows.iter().map(|t| &t.month).max().cloned()
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|t| t.date).min()?;
        let max = self.rows.iter().map(|t| t.date).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_transaction_normalizes_on_construction() {
        let t = Transaction::new(d(2024, 3, 9), Some(-42.5), None, TxnType::Withdrawal, "Coffee");
        assert_eq!(t.amount, Some(42.5));
        assert_eq!(t.category, UNCATEGORIZED);
        assert_eq!(t.month, "2024-03");

        let t = Transaction::new(d(2024, 3, 9), None, Some(""), TxnType::Deposit, "");
        assert_eq!(t.amount, None);
        assert_eq!(t.category, UNCATEGORIZED);
    }

    #[test]
    fn test_txn_type_parse() {
        assert_eq!(TxnType::parse("Deposit"), TxnType::Deposit);
        assert_eq!(TxnType::parse(" Withdrawal "), TxnType::Withdrawal);
        assert_eq!(TxnType::parse("Transfer"), TxnType::Other("Transfer".into()));
        assert!(!TxnType::parse("withdrawal").is_recognized());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-01").unwrap(), (2024, 1));
        assert_eq!(parse_month("1999-12").unwrap(), (1999, 12));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-1").is_err());
        assert!(parse_month("January").is_err());
    }

    #[test]
    fn test_months_spanned() {
        assert_eq!(months_spanned(d(2024, 1, 1), d(2024, 1, 31)), 1);
        assert_eq!(months_spanned(d(2024, 1, 31), d(2024, 2, 1)), 2);
        assert_eq!(months_spanned(d(2023, 11, 15), d(2024, 2, 3)), 4);
        assert_eq!(months_spanned(d(2024, 3, 1), d(2024, 1, 1)), -1);
    }

    #[test]
    fn test_ledger_catalogue() {
        let ledger = Ledger::from_rows(vec![
            Transaction::new(d(2024, 2, 1), Some(1.0), Some("Rent"), TxnType::Withdrawal, ""),
            Transaction::new(d(2024, 1, 5), Some(1.0), Some("Food"), TxnType::Withdrawal, ""),
            Transaction::new(d(2024, 1, 9), Some(1.0), Some("Food"), TxnType::parse("Transfer"), ""),
        ]);
        assert_eq!(ledger.categories(), vec!["Food", "Rent"]);
        assert_eq!(ledger.months(), vec!["2024-01", "2024-02"]);
        assert_eq!(ledger.latest_month().as_deref(), Some("2024-02"));
        assert_eq!(ledger.date_bounds(), Some((d(2024, 1, 5), d(2024, 2, 1))));
        assert_eq!(ledger.stats.unrecognized_types, 1);
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = Ledger::default();
        assert!(ledger.is_empty());
        assert!(ledger.date_bounds().is_none());
        assert!(ledger.latest_month().is_none());
    }
}
