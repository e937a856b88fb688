use crate::cli::Session;
use crate::error::Result;

pub fn run(session: &Session) -> Result<()> {
    let ledger = &session.ledger;
    let stats = &ledger.stats;

    println!("Source:       {}", session.source.display());
    if let Ok(meta) = std::fs::metadata(&session.source) {
        println!("File size:    {} bytes", meta.len());
    }

    println!();
    println!("Rows read:          {}", stats.rows_read);
    println!("Transactions:       {}", ledger.len());
    println!("Unparseable dates:  {}", stats.dropped_dates);
    println!("Missing amounts:    {}", stats.unparsed_amounts);
    println!("Unrecognized types: {}", stats.unrecognized_types);

    println!();
    match ledger.date_bounds() {
        Some((start, end)) => {
            println!("Date range:   {start} to {end}");
            println!("Months:       {}", ledger.months().len());
            println!("Categories:   {}", ledger.categories().len());
        }
        None => println!("No transactions loaded."),
    }
    Ok(())
}
