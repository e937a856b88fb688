use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::error::{Result, SpendError};
use crate::models::{Ledger, LoadStats, Transaction, TxnType};

pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "amount", "category", "type", "description"];

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%z"];

// Month-first is tried before day-first, so 03/04/2024 is March 4th.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%m/%d/%y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Tolerant date parse. Time of day and any UTC offset are discarded; the
/// wall-clock date is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local().date());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local().date());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            if has_full_year(dt.date()) {
                return Some(dt.date());
            }
        }
    }
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(|date| has_full_year(*date))
}

// `%Y` accepts any digit count, so `01/05/24` would otherwise match
// `%Y/%m/%d` as year 1 before the `%y` formats are tried.
fn has_full_year(date: NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

/// Coerce an amount to a number. Returns `None` for anything non-numeric
/// (including NaN and infinities) so the row drops out of sums and means.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => -inner.trim().parse::<f64>().ok()?,
        None => s.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| SpendError::MissingColumn(name.to_string()))
}

/// Parse a ledger CSV from any reader. Rows with an unparseable date are
/// dropped; a malformed file fails the whole load.
pub fn read_ledger<R: Read>(reader: R) -> Result<Ledger> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let [idx_date, idx_amount, idx_category, idx_type, idx_desc] =
        REQUIRED_COLUMNS.map(|name| column_index(&headers, name));
    let (idx_date, idx_amount, idx_category, idx_type, idx_desc) =
        (idx_date?, idx_amount?, idx_category?, idx_type?, idx_desc?);

    let mut stats = LoadStats::default();
    let mut rows = Vec::new();

    for result in rdr.records() {
        let record = result?;
        stats.rows_read += 1;
        let field = |i: usize| record.get(i).unwrap_or("");

        let Some(date) = parse_date(field(idx_date)) else {
            debug!("dropping row {}: unparseable date {:?}", stats.rows_read, field(idx_date));
            stats.dropped_dates += 1;
            continue;
        };
        let amount = parse_amount(field(idx_amount));
        if amount.is_none() {
            stats.unparsed_amounts += 1;
        }
        let txn_type = TxnType::parse(field(idx_type));
        if !txn_type.is_recognized() {
            stats.unrecognized_types += 1;
        }
        rows.push(Transaction::new(
            date,
            amount,
            Some(field(idx_category)),
            txn_type,
            field(idx_desc),
        ));
    }

    if stats.unrecognized_types > 0 {
        warn!(
            "{} rows have a type other than Deposit/Withdrawal and are excluded from income and expense totals",
            stats.unrecognized_types
        );
    }
    debug!(
        "read {} rows, dropped {} with bad dates, {} without numeric amounts",
        stats.rows_read, stats.dropped_dates, stats.unparsed_amounts
    );

    Ok(Ledger::new(rows, stats))
}

#[cfg(test)]
pub fn load_ledger(path: &Path) -> Result<Ledger> {
    let data = std::fs::read(path)?;
    let ledger = read_ledger(data.as_slice())?;
    info!("loaded {} transactions from {}", ledger.len(), path.display());
    Ok(ledger)
}

fn checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// LedgerCache
// ---------------------------------------------------------------------------

struct CacheEntry {
    modified: Option<SystemTime>,
    len: u64,
    checksum: String,
    ledger: Arc<Ledger>,
}

/// Loaded ledgers keyed by canonical source path. An entry is reused while
/// the file's modification time and length are unchanged; otherwise the
/// content hash decides whether the file is parsed again.
#[derive(Default)]
pub struct LedgerCache {
    entries: HashMap<PathBuf, CacheEntry>,
    loads: usize,
}

impl LedgerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, path: &Path) -> Result<Arc<Ledger>> {
        let key = std::fs::canonicalize(path)?;
        let meta = std::fs::metadata(&key)?;
        let modified = meta.modified().ok();
        let len = meta.len();

        if let Some(entry) = self.entries.get(&key) {
            if modified.is_some() && entry.modified == modified && entry.len == len {
                debug!("cache hit for {}", key.display());
                return Ok(Arc::clone(&entry.ledger));
            }
        }

        let data = std::fs::read(&key)?;
        let sum = checksum(&data);
        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.checksum == sum {
                debug!("{} touched but unchanged, reusing cached table", key.display());
                entry.modified = modified;
                entry.len = len;
                return Ok(Arc::clone(&entry.ledger));
            }
        }

        let ledger = Arc::new(read_ledger(data.as_slice())?);
        self.loads += 1;
        info!(
            "loaded {} transactions from {} (parse {} this session)",
            ledger.len(),
            key.display(),
            self.loads
        );
        self.entries.insert(
            key,
            CacheEntry {
                modified,
                len,
                checksum: sum,
                ledger: Arc::clone(&ledger),
            },
        );
        Ok(ledger)
    }

    /// Number of times a file was actually parsed.
    #[cfg(test)]
    pub fn loads(&self) -> usize {
        self.loads
    }

    #[cfg(test)]
    pub fn invalidate(&mut self, path: &Path) {
        if let Ok(key) = std::fs::canonicalize(path) {
            self.entries.remove(&key);
        }
    }
}
