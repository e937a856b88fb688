pub mod text;

use crate::cli::{DashboardArgs, Kind, Session};
use crate::error::Result;

use super::ReportCommands;

pub fn dispatch(cmd: &ReportCommands, session: &Session) -> Result<()> {
    let s = match cmd {
        ReportCommands::Dashboard(args) => return dashboard(session, args),
        ReportCommands::Overview { filter } => text::overview(session, filter)?,
        ReportCommands::Series { filter } => text::series(session, filter)?,
        ReportCommands::Summary { filter, kind } => text::summary(session, filter, *kind)?,
        ReportCommands::Monthly { filter } => text::monthly(session, filter)?,
        ReportCommands::Breakdown { filter, month, threshold } => {
            text::breakdown(session, filter, month.as_deref(), *threshold)?
        }
        ReportCommands::Top { filter, n, kind } => text::top(session, filter, *n, *kind)?,
    };
    println!("{s}");
    Ok(())
}

fn dashboard_sections(session: &Session, args: &DashboardArgs) -> Vec<String> {
    let f = &args.filter;
    let sections: Vec<(&str, Result<String>)> = vec![
        ("overview", text::overview(session, f)),
        ("series", text::series(session, f)),
        ("monthly", text::monthly(session, f)),
        ("breakdown", text::breakdown(session, f, args.month.as_deref(), args.threshold)),
        ("top", text::top(session, f, args.n, None)),
        ("income summary", text::summary(session, f, Kind::Income)),
        ("expense summary", text::summary(session, f, Kind::Expenses)),
    ];

    let mut out = Vec::new();
    for (name, result) in sections {
        match result {
            Ok(content) => out.push(content),
            Err(e) => eprintln!("Skipping {name}: {e}"),
        }
    }
    out
}

/// Every report section; a failing section is skipped, not fatal.
pub fn dashboard(session: &Session, args: &DashboardArgs) -> Result<()> {
    if session.ledger.is_empty() {
        println!("No transactions loaded from {}.", session.source.display());
        return Ok(());
    }
    for section in dashboard_sections(session, args) {
        println!("{section}\n");
    }
    Ok(())
}
