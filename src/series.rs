use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Transaction, TxnType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

/// Income, expense and net per date present in `rows` within `[start, end]`,
/// ascending by date. Dates with no rows are not zero-filled.
pub fn daily_series(rows: &[Transaction], start: NaiveDate, end: NaiveDate) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for t in rows.iter().filter(|t| t.date >= start && t.date <= end) {
        let day = days.entry(t.date).or_default();
        let amount = t.amount.unwrap_or(0.0);
        match t.txn_type {
            TxnType::Deposit => day.0 += amount,
            TxnType::Withdrawal => day.1 += amount,
            TxnType::Other(_) => {}
        }
    }
    days.into_iter()
        .map(|(date, (income, expense))| DailyPoint {
            date,
            income,
            expense,
            net: income - expense,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::overview;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn txn(date: NaiveDate, amount: f64, txn_type: TxnType) -> Transaction {
        Transaction::new(date, Some(amount), Some("X"), txn_type, "")
    }

    fn rows() -> Vec<Transaction> {
        vec![
            txn(d(2024, 1, 10), 50.0, TxnType::Withdrawal),
            txn(d(2024, 1, 5), 100.0, TxnType::Withdrawal),
            txn(d(2024, 1, 5), 20.0, TxnType::Deposit),
            txn(d(2024, 1, 15), 500.0, TxnType::Deposit),
            txn(d(2024, 1, 20), 7.0, TxnType::parse("Transfer")),
            txn(d(2024, 3, 1), 1.0, TxnType::Deposit),
        ]
    }

    #[test]
    fn test_one_point_per_present_date_in_order() {
        let s = daily_series(&rows(), d(2024, 1, 1), d(2024, 1, 31));
        let dates: Vec<NaiveDate> = s.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 5), d(2024, 1, 10), d(2024, 1, 15), d(2024, 1, 20)]);
        assert_eq!(s[0].income, 20.0);
        assert_eq!(s[0].expense, 100.0);
        assert_eq!(s[0].net, -80.0);
        assert_eq!(s[3].income, 0.0);
        assert_eq!(s[3].expense, 0.0);
    }

    #[test]
    fn test_series_net_matches_overview() {
        let all = rows();
        let s = daily_series(&all, d(2024, 1, 1), d(2024, 12, 31));
        let income: f64 = s.iter().map(|p| p.income).sum();
        let expense: f64 = s.iter().map(|p| p.expense).sum();
        let net: f64 = s.iter().map(|p| p.net).sum();
        let o = overview(&all);
        assert_eq!(income, o.income);
        assert_eq!(expense, o.expense);
        assert_eq!(income - expense, net);
    }

    #[test]
    fn test_empty_input_is_empty_series() {
        assert!(daily_series(&[], d(2024, 1, 1), d(2024, 12, 31)).is_empty());
    }
}
