use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{FilterArgs, Kind, Session};
use crate::error::Result;
use crate::filter::{self, FilterParams, Selection};
use crate::fmt::{money, money_opt, pct};
use crate::models::{Transaction, TxnType};
use crate::reports::{self, Breakdown, CategorySummary, CategoryTotal, MonthCategoryTotal, MonthlyBreakdown, Overview};
use crate::series::{daily_series, DailyPoint};

pub const NO_CATEGORIES: &str = "Please select at least one category.";

/// Filtered view for a report. `None` when the selection resolves to no categories.
fn selected_rows(
    session: &Session,
    args: &FilterArgs,
    fallback: Selection,
) -> Result<Option<(FilterParams, Vec<Transaction>)>> {
    let params = args.params(&session.ledger, fallback)?;
    if params.categories.is_empty() {
        return Ok(None);
    }
    let rows = filter::filter(session.ledger.rows(), &params);
    Ok(Some((params, rows)))
}

fn default_selection(session: &Session) -> Selection {
    Selection::Default(session.settings.default_category_count)
}

fn signed(val: f64) -> String {
    if val >= 0.0 {
        money(val).green().to_string()
    } else {
        money(val).red().to_string()
    }
}

// ---------------------------------------------------------------------------
// Data-fetching + formatting wrappers (used by dispatch)
// ---------------------------------------------------------------------------

pub fn overview(session: &Session, args: &FilterArgs) -> Result<String> {
    match selected_rows(session, args, Selection::All)? {
        Some((_, rows)) => Ok(format_overview(&reports::overview(&rows))),
        None => Ok(NO_CATEGORIES.to_string()),
    }
}

pub fn series(session: &Session, args: &FilterArgs) -> Result<String> {
    match selected_rows(session, args, Selection::All)? {
        Some((params, rows)) => Ok(format_series(&daily_series(&rows, params.start, params.end))),
        None => Ok(NO_CATEGORIES.to_string()),
    }
}

pub fn summary(session: &Session, args: &FilterArgs, kind: Kind) -> Result<String> {
    let Some((params, rows)) = selected_rows(session, args, default_selection(session))? else {
        return Ok(NO_CATEGORIES.to_string());
    };
    let data = reports::category_summary(&rows, &kind.txn_type(), params.start, params.end)?;
    Ok(format_summary(&data, kind))
}

pub fn monthly(session: &Session, args: &FilterArgs) -> Result<String> {
    match selected_rows(session, args, default_selection(session))? {
        Some((_, rows)) => Ok(format_monthly(&reports::monthly_breakdown(&rows))),
        None => Ok(NO_CATEGORIES.to_string()),
    }
}

pub fn breakdown(
    session: &Session,
    args: &FilterArgs,
    month: Option<&str>,
    threshold: Option<f64>,
) -> Result<String> {
    let Some(month) = month.map(str::to_string).or_else(|| session.ledger.latest_month()) else {
        return Ok("No transactions loaded.".to_string());
    };
    let Some((_, rows)) = selected_rows(session, args, default_selection(session))? else {
        return Ok(NO_CATEGORIES.to_string());
    };
    let threshold = threshold.unwrap_or(session.settings.pie_threshold);
    let data = reports::expense_distribution(&rows, &month, threshold)?;
    Ok(format_breakdown(&data, &month, threshold))
}

pub fn top(session: &Session, args: &FilterArgs, n: Option<usize>, kind: Option<Kind>) -> Result<String> {
    let Some((_, rows)) = selected_rows(session, args, default_selection(session))? else {
        return Ok(NO_CATEGORIES.to_string());
    };
    let n = n.unwrap_or(session.settings.default_top_n);
    let kinds = match kind {
        Some(k) => vec![k],
        None => vec![Kind::Income, Kind::Expenses],
    };
    let sections: Vec<String> = kinds
        .into_iter()
        .map(|k| format_top(&reports::top_n(&rows, &k.txn_type(), n), k, n))
        .collect();
    Ok(sections.join("\n\n"))
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

pub fn format_overview(o: &Overview) -> String {
    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![Cell::new("Total Income".green()), Cell::new(money(o.income))]);
    table.add_row(vec![Cell::new("Total Expenses".red()), Cell::new(money(o.expense))]);
    let net_label = if o.net >= 0.0 {
        "Net".green().bold()
    } else {
        "Net".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(money(o.net))]);
    format!("Financial Overview\n{table}")
}

pub fn format_series(points: &[DailyPoint]) -> String {
    if points.is_empty() {
        return "No transactions in the selected range.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Income", "Expenses", "Net"]);
    for p in points {
        table.add_row(vec![
            Cell::new(p.date.format("%Y-%m-%d")),
            Cell::new(money(p.income)),
            Cell::new(money(p.expense)),
            Cell::new(signed(p.net)),
        ]);
    }
    format!("Income vs Expenses Over Time ({} days)\n{table}", points.len())
}

pub fn format_summary(data: &CategorySummary, kind: Kind) -> String {
    if data.items.is_empty() {
        return format!("No {} in the selected range.", kind.label().to_lowercase());
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Total", "Average", "Count", "%", "Per Month"]);
    for item in &data.items {
        table.add_row(vec![
            Cell::new(&item.category),
            Cell::new(money(item.total)),
            Cell::new(money_opt(item.mean)),
            Cell::new(item.count),
            Cell::new(pct(item.pct)),
            Cell::new(money(item.monthly_avg)),
        ]);
    }
    let count: usize = data.items.iter().map(|i| i.count).sum();
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(data.total)),
        Cell::new(""),
        Cell::new(count),
        Cell::new(""),
        Cell::new(money(data.total / data.months as f64)),
    ]);
    let months = if data.months == 1 { "month" } else { "months" };
    format!("{} Summary ({} {months})\n{table}", kind.label(), data.months)
}

fn month_category_table(items: &[MonthCategoryTotal]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Category", "Amount"]);
    let mut last_month: Option<&str> = None;
    for item in items {
        // Month shown once per group.
        let month = if last_month == Some(item.month.as_str()) { "" } else { item.month.as_str() };
        last_month = Some(item.month.as_str());
        table.add_row(vec![
            Cell::new(month),
            Cell::new(&item.category),
            Cell::new(money(item.total)),
        ]);
    }
    table
}

pub fn format_monthly(data: &MonthlyBreakdown) -> String {
    if data.income.is_empty() && data.expenses.is_empty() {
        return "No income or expenses in the selected range.".to_string();
    }
    let mut parts = Vec::new();
    if !data.income.is_empty() {
        parts.push(format!("Monthly Income by Category\n{}", month_category_table(&data.income)));
    }
    if !data.expenses.is_empty() {
        parts.push(format!("Monthly Expenses by Category\n{}", month_category_table(&data.expenses)));
    }
    parts.join("\n\n")
}

pub fn format_breakdown(data: &Breakdown, month: &str, threshold: f64) -> String {
    if data.items.is_empty() && data.excluded.is_empty() {
        return format!("No expenses in {month}.");
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%"]);
    for item in &data.items {
        table.add_row(vec![
            Cell::new(&item.category),
            Cell::new(money(item.total)),
            Cell::new(pct(item.pct)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(data.total)),
        Cell::new(""),
    ]);
    let mut out = format!("Expense Distribution {month}\n{table}");
    if !data.excluded.is_empty() {
        let hidden: f64 = data.excluded.iter().map(|i| i.total).sum();
        out.push_str(&format!(
            "\n{}",
            format!(
                "{} categories under {threshold}% not shown ({})",
                data.excluded.len(),
                money(hidden)
            )
            .dimmed()
        ));
    }
    out
}

pub fn format_top(items: &[CategoryTotal], kind: Kind, n: usize) -> String {
    let title = format!("Top {n} {} Categories", kind.label());
    if items.is_empty() {
        return format!("{title}\nNo {} in the selected range.", kind.label().to_lowercase());
    }
    let mut table = Table::new();
    table.set_header(vec!["#", "Category", "Amount"]);
    for (rank, item) in items.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&item.category),
            Cell::new(money(item.total)),
        ]);
    }
    format!("{title}\n{table}")
}

pub fn format_amount(t: &Transaction) -> String {
    let amount = money_opt(t.amount);
    match t.txn_type {
        TxnType::Deposit => amount.green().to_string(),
        TxnType::Withdrawal => amount.red().to_string(),
        TxnType::Other(_) => amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{BreakdownItem, SummaryItem};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_format_overview() {
        let out = format_overview(&Overview {
            income: 500.0,
            expense: 1250.5,
            net: -750.5,
        });
        assert!(out.starts_with("Financial Overview"));
        assert!(out.contains("$500.00"));
        assert!(out.contains("$1,250.50"));
        assert!(out.contains("-$750.50"));
    }

    #[test]
    fn test_format_series() {
        assert_eq!(format_series(&[]), "No transactions in the selected range.");
        let out = format_series(&[DailyPoint {
            date: d(2024, 1, 5),
            income: 20.0,
            expense: 100.0,
            net: -80.0,
        }]);
        assert!(out.contains("(1 days)"));
        assert!(out.contains("2024-01-05"));
        assert!(out.contains("$100.00"));
    }

    #[test]
    fn test_format_summary() {
        let data = CategorySummary {
            txn_type: TxnType::Withdrawal,
            items: vec![SummaryItem {
                category: "Food".into(),
                total: 150.0,
                mean: Some(75.0),
                count: 2,
                pct: 100.0,
                monthly_avg: 50.0,
            }],
            total: 150.0,
            months: 3,
        };
        let out = format_summary(&data, Kind::Expenses);
        assert!(out.starts_with("Expenses Summary (3 months)"));
        assert!(out.contains("$75.00"));
        assert!(out.contains("100.00%"));
        assert!(out.contains("$50.00"));

        let empty = CategorySummary {
            items: vec![],
            total: 0.0,
            ..data
        };
        assert_eq!(format_summary(&empty, Kind::Income), "No income in the selected range.");
    }

    #[test]
    fn test_format_monthly_groups_months() {
        let item = |month: &str, category: &str, total: f64| MonthCategoryTotal {
            month: month.into(),
            category: category.into(),
            total,
        };
        let data = MonthlyBreakdown {
            income: vec![],
            expenses: vec![
                item("2024-01", "Rent", 900.0),
                item("2024-01", "Food", 100.0),
                item("2024-02", "Food", 80.0),
            ],
        };
        let out = format_monthly(&data);
        assert!(!out.contains("Monthly Income"));
        assert!(out.contains("Monthly Expenses by Category"));
        assert_eq!(out.matches("2024-01").count(), 1);
        assert_eq!(out.matches("2024-02").count(), 1);
        assert!(format_monthly(&MonthlyBreakdown {
            income: vec![],
            expenses: vec![]
        })
        .starts_with("No income or expenses"));
    }

    #[test]
    fn test_format_breakdown_notes_hidden_categories() {
        let item = |category: &str, total: f64, pct: f64| BreakdownItem {
            category: category.into(),
            total,
            pct,
        };
        let data = Breakdown {
            items: vec![item("Rent", 995.0, 99.5)],
            total: 1000.0,
            excluded: vec![item("Gum", 5.0, 0.5)],
        };
        let out = format_breakdown(&data, "2024-01", 1.0);
        assert!(out.starts_with("Expense Distribution 2024-01"));
        assert!(out.contains("99.50%"));
        assert!(!out.contains("Gum"));
        assert!(out.contains("1 categories under 1% not shown ($5.00)"));

        let none = Breakdown {
            items: vec![],
            total: 0.0,
            excluded: vec![],
        };
        assert_eq!(format_breakdown(&none, "2024-03", 0.5), "No expenses in 2024-03.");
    }

    #[test]
    fn test_format_top() {
        let items = vec![
            CategoryTotal {
                category: "Rent".into(),
                total: 900.0,
            },
            CategoryTotal {
                category: "Food".into(),
                total: 150.0,
            },
        ];
        let out = format_top(&items, Kind::Expenses, 2);
        assert!(out.starts_with("Top 2 Expenses Categories"));
        let rent = out.find("Rent").unwrap();
        let food = out.find("Food").unwrap();
        assert!(rent < food);
        assert!(format_top(&[], Kind::Income, 5).ends_with("No income in the selected range."));
    }

    #[test]
    fn test_format_amount_handles_missing() {
        let t = Transaction::new(d(2024, 1, 1), None, None, TxnType::parse("Transfer"), "");
        assert_eq!(format_amount(&t), "\u{2014}");
    }
}
