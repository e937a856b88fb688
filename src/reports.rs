use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{Result, SpendError};
use crate::models::{months_spanned, parse_month, Transaction, TxnType};

fn sum_amounts<'a>(rows: impl Iterator<Item = &'a Transaction>) -> f64 {
    rows.filter_map(|t| t.amount).sum()
}

fn of_type<'a>(
    rows: &'a [Transaction],
    txn_type: &'a TxnType,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    rows.iter().filter(move |t| t.txn_type == *txn_type)
}

/// Descending by amount, then category ascending.
fn by_total_desc(a_total: f64, a_cat: &str, b_total: f64, b_cat: &str) -> Ordering {
    b_total.total_cmp(&a_total).then_with(|| a_cat.cmp(b_cat))
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overview {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

pub fn overview(rows: &[Transaction]) -> Overview {
    let income = sum_amounts(of_type(rows, &TxnType::Deposit));
    let expense = sum_amounts(of_type(rows, &TxnType::Withdrawal));
    Overview {
        income,
        expense,
        net: income - expense,
    }
}

// ---------------------------------------------------------------------------
// Category totals and Top-N
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

pub fn group_by_category(rows: &[Transaction], txn_type: &TxnType) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for t in of_type(rows, txn_type) {
        *totals.entry(t.category.as_str()).or_default() += t.amount.unwrap_or(0.0);
    }
    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    out.sort_by(|a, b| by_total_desc(a.total, &a.category, b.total, &b.category));
    out
}

/// The `n` largest category totals for a type. Fewer than `n` categories
/// returns all of them.
pub fn top_n(rows: &[Transaction], txn_type: &TxnType, n: usize) -> Vec<CategoryTotal> {
    let mut totals = group_by_category(rows, txn_type);
    totals.truncate(n);
    totals
}

// ---------------------------------------------------------------------------
// Category summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryItem {
    pub category: String,
    pub total: f64,
    /// Mean per transaction; `None` when no row in the group has an amount.
    pub mean: Option<f64>,
    /// Rows with a numeric amount.
    pub count: usize,
    pub pct: f64,
    /// Total divided by the calendar months the date range spans.
    pub monthly_avg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub txn_type: TxnType,
    pub items: Vec<SummaryItem>,
    pub total: f64,
    pub months: i32,
}

pub fn category_summary(
    rows: &[Transaction],
    txn_type: &TxnType,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<CategorySummary> {
    if start > end {
        return Err(SpendError::InvalidRange { start, end });
    }
    let months = months_spanned(start, end);

    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for t in of_type(rows, txn_type) {
        let entry = groups.entry(t.category.as_str()).or_default();
        if let Some(amount) = t.amount {
            entry.0 += amount;
            entry.1 += 1;
        }
    }
    let total: f64 = groups.values().map(|(sum, _)| sum).sum();

    let mut items: Vec<SummaryItem> = groups
        .into_iter()
        .map(|(category, (sum, count))| SummaryItem {
            category: category.to_string(),
            total: sum,
            mean: (count > 0).then(|| sum / count as f64),
            count,
            pct: if total != 0.0 { sum / total * 100.0 } else { 0.0 },
            monthly_avg: sum / months as f64,
        })
        .collect();
    items.sort_by(|a, b| by_total_desc(a.total, &a.category, b.total, &b.category));

    Ok(CategorySummary {
        txn_type: txn_type.clone(),
        items,
        total,
        months,
    })
}

// ---------------------------------------------------------------------------
// Month x category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthCategoryTotal {
    pub month: String,
    pub category: String,
    pub total: f64,
}

#[derive(Debug)]
pub struct MonthlyBreakdown {
    /// Month ascending, category ascending.
    pub income: Vec<MonthCategoryTotal>,
    /// Month ascending, amount descending within each month.
    pub expenses: Vec<MonthCategoryTotal>,
}

pub fn group_by_month_category(rows: &[Transaction], txn_type: &TxnType) -> Vec<MonthCategoryTotal> {
    let mut totals: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for t in of_type(rows, txn_type) {
        *totals
            .entry((t.month.as_str(), t.category.as_str()))
            .or_default() += t.amount.unwrap_or(0.0);
    }
    totals
        .into_iter()
        .map(|((month, category), total)| MonthCategoryTotal {
            month: month.to_string(),
            category: category.to_string(),
            total,
        })
        .collect()
}

pub fn monthly_breakdown(rows: &[Transaction]) -> MonthlyBreakdown {
    let income = group_by_month_category(rows, &TxnType::Deposit);
    let mut expenses = group_by_month_category(rows, &TxnType::Withdrawal);
    expenses.sort_by(|a, b| {
        a.month
            .cmp(&b.month)
            .then_with(|| by_total_desc(a.total, &a.category, b.total, &b.category))
    });
    MonthlyBreakdown { income, expenses }
}

// ---------------------------------------------------------------------------
// Percentage breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownItem {
    pub category: String,
    pub total: f64,
    pub pct: f64,
}

#[derive(Debug)]
pub struct Breakdown {
    pub items: Vec<BreakdownItem>,
    pub total: f64,
    /// Categories dropped for falling below the threshold.
    pub excluded: Vec<BreakdownItem>,
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        return Err(SpendError::InvalidThreshold(threshold));
    }
    Ok(())
}

/// Category shares of the type's total, keeping those at or above
/// `threshold` percent. A zero total gives every category 0%.
pub fn percentage_breakdown(
    rows: &[Transaction],
    txn_type: &TxnType,
    threshold: f64,
) -> Result<Breakdown> {
    validate_threshold(threshold)?;
    let totals = group_by_category(rows, txn_type);
    let total: f64 = totals.iter().map(|c| c.total).sum();

    let (items, excluded): (Vec<BreakdownItem>, Vec<BreakdownItem>) = totals
        .into_iter()
        .map(|c| BreakdownItem {
            pct: if total != 0.0 { c.total / total * 100.0 } else { 0.0 },
            category: c.category,
            total: c.total,
        })
        .partition(|item| item.pct >= threshold);

    Ok(Breakdown {
        items,
        total,
        excluded,
    })
}

/// Expense distribution for one month bucket.
pub fn expense_distribution(rows: &[Transaction], month: &str, threshold: f64) -> Result<Breakdown> {
    parse_month(month)?;
    let in_month: Vec<Transaction> = rows.iter().filter(|t| t.month == month).cloned().collect();
    percentage_breakdown(&in_month, &TxnType::Withdrawal, threshold)
}
