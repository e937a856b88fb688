use std::collections::BTreeMap;

use comfy_table::{Cell, Table};

use crate::cli::Session;
use crate::error::Result;
use crate::fmt::money;
use crate::models::{Transaction, TxnType};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryRow {
    pub name: String,
    pub count: usize,
    pub income: f64,
    pub expense: f64,
}

/// One row per category label, sorted by name.
pub fn category_rows(rows: &[Transaction]) -> Vec<CategoryRow> {
    let mut by_name: BTreeMap<&str, CategoryRow> = BTreeMap::new();
    for t in rows {
        let row = by_name.entry(t.category.as_str()).or_insert_with(|| CategoryRow {
            name: t.category.clone(),
            ..Default::default()
        });
        row.count += 1;
        let amount = t.amount.unwrap_or(0.0);
        match t.txn_type {
            TxnType::Deposit => row.income += amount,
            TxnType::Withdrawal => row.expense += amount,
            TxnType::Other(_) => {}
        }
    }
    by_name.into_values().collect()
}

pub fn list(session: &Session) -> Result<()> {
    let rows = category_rows(session.ledger.rows());
    if rows.is_empty() {
        println!("No categories found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Transactions", "Income", "Expenses"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.count),
            Cell::new(money(row.income)),
            Cell::new(money(row.expense)),
        ]);
    }
    println!("Categories ({})\n{table}", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_category_rows_sorted_with_totals() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = vec![
            Transaction::new(d, Some(10.0), Some("Food"), TxnType::Withdrawal, ""),
            Transaction::new(d, Some(500.0), Some("Salary"), TxnType::Deposit, ""),
            Transaction::new(d, Some(5.0), Some("Food"), TxnType::Withdrawal, ""),
            Transaction::new(d, Some(1.0), None, TxnType::parse("Transfer"), ""),
        ];
        let out = category_rows(&rows);
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Salary", "Uncategorized"]);
        assert_eq!(out[0].count, 2);
        assert_eq!(out[0].expense, 15.0);
        assert_eq!(out[1].income, 500.0);
        assert_eq!(out[2].income + out[2].expense, 0.0);
    }
}
