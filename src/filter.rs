use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::debug;

use crate::models::{Ledger, Transaction, TxnType};

/// The user-selected parameters every view is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub categories: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub txn_type: Option<TxnType>,
}

impl FilterParams {
    pub fn new(categories: BTreeSet<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            categories,
            start,
            end,
            txn_type: None,
        }
    }

    pub fn with_type(mut self, txn_type: TxnType) -> Self {
        self.txn_type = Some(txn_type);
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        self.categories.contains(&txn.category)
            && txn.date >= self.start
            && txn.date <= self.end
            && self.txn_type.as_ref().map_or(true, |t| *t == txn.txn_type)
    }
}

/// Rows passing category membership, the inclusive date range and the
/// optional type predicate. An empty category set yields an empty view.
pub fn filter(rows: &[Transaction], params: &FilterParams) -> Vec<Transaction> {
    if params.categories.is_empty() {
        debug!("no categories selected, filtered view is empty");
        return Vec::new();
    }
    rows.iter().filter(|t| params.matches(t)).cloned().collect()
}

/// Which categories the user has selected. "Select all" is just `All`.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    /// The first `n` categories in sorted order.
    Default(usize),
    Explicit(BTreeSet<String>),
}

impl Selection {
    pub fn resolve(&self, ledger: &Ledger) -> BTreeSet<String> {
        match self {
            Self::All => ledger.categories().into_iter().collect(),
            Self::Default(n) => ledger.categories().into_iter().take(*n).collect(),
            Self::Explicit(set) => set.clone(),
        }
    }
}
