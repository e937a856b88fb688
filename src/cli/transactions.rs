use comfy_table::{Cell, Table};

use crate::cli::report::text::format_amount;
use crate::cli::{LookupArgs, Session};
use crate::error::Result;
use crate::fmt::{money, money_opt};
use crate::lookup::{lookup_stats, transactions_for, CategoryChoice, LookupStats};
use crate::models::Transaction;

/// Lookup result plus the resolved category and month.
pub struct Lookup {
    pub category: CategoryChoice,
    pub month: String,
    pub rows: Vec<Transaction>,
}

/// `None` when the ledger is empty and no month was given.
pub fn resolve(session: &Session, args: &LookupArgs) -> Result<Option<Lookup>> {
    let Some(month) = args.month.clone().or_else(|| session.ledger.latest_month()) else {
        return Ok(None);
    };
    let category = CategoryChoice::parse(&args.category);
    let rows = transactions_for(session.ledger.rows(), &category, &month, args.search.as_deref())?;
    Ok(Some(Lookup {
        category,
        month,
        rows,
    }))
}

pub fn run(session: &Session, args: &LookupArgs) -> Result<()> {
    match resolve(session, args)? {
        Some(lookup) => {
            let stats = lookup_stats(&lookup.rows);
            println!("{}", format_lookup(&lookup, &stats));
        }
        None => println!("No transactions found."),
    }
    Ok(())
}

pub fn format_lookup(lookup: &Lookup, stats: &LookupStats) -> String {
    let title = format!("Transactions: {} in {}", lookup.category.label(), lookup.month);
    if lookup.rows.is_empty() {
        return format!("{title}\nNo transactions found.");
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Type", "Category"]);
    for t in &lookup.rows {
        table.add_row(vec![
            Cell::new(t.date.format("%Y-%m-%d")),
            Cell::new(&t.description),
            Cell::new(format_amount(t)),
            Cell::new(t.txn_type.as_str()),
            Cell::new(&t.category),
        ]);
    }
    format!(
        "{title}\n{table}\nTotal: {}   Average: {}   Count: {}",
        money(stats.total),
        money_opt(stats.mean),
        stats.count
    )
}
