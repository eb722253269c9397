use std::collections::{BTreeMap, BTreeSet};

use models::{OperationType, TransactionRecord, TypeStatusCount};

/// The currently loaded record set.
///
/// Immutable after construction: queries borrow the records and iterate
/// them as often as they need, always in arrival order. Replacing the
/// active dataset is the store's concern, not this type's.
#[derive(Debug)]
pub struct Dataset {
    filename: String,
    records: Vec<TransactionRecord>,
}

impl Dataset {
    pub fn new(filename: impl Into<String>, records: Vec<TransactionRecord>) -> Self {
        Self {
            filename: filename.into(),
            records,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Records matching the operation type's kind/status rule and, when
    /// given, an exact currency match.
    pub fn filtered<'a>(
        &'a self,
        op: OperationType,
        currency: Option<&'a str>,
    ) -> impl Iterator<Item = &'a TransactionRecord> {
        self.records
            .iter()
            .filter(move |r| op.matches(r))
            .filter(move |r| currency.is_none_or(|c| r.currency == c))
    }

    /// Distinct currency codes present in the dataset, sorted.
    pub fn distinct_currencies(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.currency.as_str()).collect();
        set.into_iter().map(str::to_owned).collect()
    }

    /// Record counts per (kind, status) pair, sorted by pair.
    pub fn type_status_breakdown(&self) -> Vec<TypeStatusCount> {
        let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        for r in &self.records {
            *counts
                .entry((r.kind.as_str(), r.status.as_str()))
                .or_default() += 1;
        }
        counts
            .into_iter()
            .map(|((kind, status), count)| TypeStatusCount {
                kind: kind.to_owned(),
                status: status.to_owned(),
                count,
            })
            .collect()
    }
}
