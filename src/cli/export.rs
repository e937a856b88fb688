use std::path::PathBuf;

use crate::cli::transactions::resolve;
use crate::cli::{LookupArgs, Session};
use crate::error::{Result, SpendError};
use crate::lookup::{export_csv, export_file_name};

pub fn run(session: &Session, args: &LookupArgs, output: Option<&str>) -> Result<()> {
    let lookup = resolve(session, args)?
        .ok_or_else(|| SpendError::Other("nothing to export: no transactions loaded".into()))?;
    let path = match output {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(&session.settings.export_dir)
            .join(export_file_name(&lookup.category, &lookup.month)),
    };
    export_csv(&lookup.rows, &path)?;
    println!("Wrote {} ({} transactions)", path.display(), lookup.rows.len());
    Ok(())
}
