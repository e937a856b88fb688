pub mod categories;
pub mod config;
pub mod export;
pub mod report;
pub mod status;
pub mod transactions;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::error::{Result, SpendError};
use crate::filter::{FilterParams, Selection};
use crate::loader::LedgerCache;
use crate::models::{Ledger, TxnType};
use crate::settings::{load_settings, Settings};

pub(crate) fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| SpendError::InvalidDate(raw.to_string()))
}

/// Settings plus the ledger loaded for this invocation.
pub struct Session {
    pub settings: Settings,
    pub source: PathBuf,
    pub ledger: Arc<Ledger>,
}

impl Session {
    pub fn open(file: Option<&str>) -> Result<Self> {
        let settings = load_settings();
        let source = PathBuf::from(file.unwrap_or(&settings.source_path));
        let mut cache = LedgerCache::new();
        let ledger = cache.get(&source)?;
        Ok(Self {
            settings,
            source,
            ledger,
        })
    }
}

#[derive(Parser)]
#[command(
    name = "spendscope",
    version,
    about = "Income and expense analytics for ledger CSV exports."
)]
pub struct Cli {
    /// Ledger CSV (default: source_path from settings)
    #[arg(long, global = true)]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the loaded source file and data-quality counts.
    Status,
    /// List categories with transaction counts.
    Categories,
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show transactions for one category (or All) in a month.
    Transactions(LookupArgs),
    /// Export a transaction lookup to CSV.
    Export {
        #[command(flatten)]
        lookup: LookupArgs,
        /// Output file (default: <export_dir>/transactions_<category>_<month>.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// View or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    #[value(alias = "deposit")]
    Income,
    #[value(alias = "withdrawal", alias = "expense")]
    Expenses,
}

impl Kind {
    pub fn txn_type(self) -> TxnType {
        match self {
            Kind::Income => TxnType::Deposit,
            Kind::Expenses => TxnType::Withdrawal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expenses => "Expenses",
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Category to include (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,
    /// Include every category
    #[arg(long = "all-categories", conflicts_with = "categories")]
    pub all_categories: bool,
    /// Start date: YYYY-MM-DD (default: earliest transaction)
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD (default: latest transaction)
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Restrict to one transaction type
    #[arg(long = "type", value_enum)]
    pub txn_kind: Option<Kind>,
}

impl FilterArgs {
    /// `fallback` applies when neither `--category` nor `--all-categories` is given.
    pub fn selection(&self, fallback: Selection) -> Selection {
        if self.all_categories {
            Selection::All
        } else if !self.categories.is_empty() {
            Selection::Explicit(self.categories.iter().cloned().collect())
        } else {
            fallback
        }
    }

    /// Bounds default to the ledger's first and last dates. An inverted range
    /// is rejected here so every report fails the same way.
    pub fn date_range(&self, ledger: &Ledger) -> Result<(NaiveDate, NaiveDate)> {
        let (min, max) = ledger.date_bounds().unwrap_or_else(|| {
            let today = chrono::Local::now().date_naive();
            (today, today)
        });
        let start = self.from_date.as_deref().map(parse_date_arg).transpose()?;
        let end = self.to_date.as_deref().map(parse_date_arg).transpose()?;
        let (start, end) = (start.unwrap_or(min), end.unwrap_or(max));
        if start > end {
            return Err(SpendError::InvalidRange { start, end });
        }
        Ok((start, end))
    }

    pub fn params(&self, ledger: &Ledger, fallback: Selection) -> Result<FilterParams> {
        let (start, end) = self.date_range(ledger)?;
        let params = FilterParams::new(self.selection(fallback).resolve(ledger), start, end);
        Ok(match self.txn_kind {
            Some(kind) => params.with_type(kind.txn_type()),
            None => params,
        })
    }
}

#[derive(Args, Clone, Debug)]
pub struct LookupArgs {
    /// Category name, or All
    #[arg(long, default_value = "All")]
    pub category: String,
    /// Month: YYYY-MM (default: latest month in the ledger)
    #[arg(long)]
    pub month: Option<String>,
    /// Case-insensitive text to find in descriptions
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Total income, expenses and net.
    Overview {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Daily income, expenses and net.
    Series {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Per-category total, mean, count and monthly average.
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value_t = Kind::Expenses)]
        kind: Kind,
    },
    /// Income and expenses per category per month.
    Monthly {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Expense distribution for one month.
    Breakdown {
        #[command(flatten)]
        filter: FilterArgs,
        /// Month: YYYY-MM (default: latest month in the ledger)
        #[arg(long)]
        month: Option<String>,
        /// Minimum share in percent (default: pie_threshold setting)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Largest categories by total.
    Top {
        #[command(flatten)]
        filter: FilterArgs,
        /// Number of categories (default: default_top_n setting)
        #[arg(long = "top")]
        n: Option<usize>,
        /// Only one side (default: both)
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },
    /// Every report section at once.
    Dashboard(DashboardArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Month for the expense distribution: YYYY-MM
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long)]
    pub threshold: Option<f64>,
    #[arg(long = "top")]
    pub n: Option<usize>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Change one setting.
    Set { key: String, value: String },
}
