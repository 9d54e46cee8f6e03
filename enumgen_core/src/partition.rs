//! The run partitioner: groups a type's sorted values into maximal
//! contiguous runs and picks the emission strategy.

use crate::value::{EnumType, Value};
use tracing::debug;

/// A maximal contiguous arithmetic progression inside the sorted value
/// list. `start..end` indexes into [`Partition::values`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub lo: i64,
    pub hi: i64,
    pub stride: i64,
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Emission strategy for one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One contiguous run: a label buffer indexed by `v - lo`.
    OneRun,
    /// Up to ten runs: a branch per run over per-run label buffers.
    MultiRun,
    /// More than ten runs: a value-to-label map.
    Map,
}

/// The ordered run list for one type plus the chosen strategy.
///
/// `values` holds the non-signal values sorted by numeric, deduplicated
/// by numeric (first declaration wins) so the label tables stay
/// well-formed when aliases share a value.
#[derive(Debug, Clone)]
pub struct Partition {
    pub runs: Vec<Run>,
    pub strategy: Strategy,
    pub values: Vec<Value>,
}

/// Runs past this count switch emission from a branch chain to a map.
/// Below it, a linear scan over a handful of runs beats a hashed map and
/// emits smaller tables.
const MAP_THRESHOLD: usize = 10;

/// Partitions one type's non-signal values.
pub fn partition(ty: &EnumType) -> Partition {
    let mut values: Vec<Value> = ty.enumerated_values().cloned().collect();
    values.sort_by_key(|v| v.numeric);
    values.dedup_by_key(|v| v.numeric);

    let mut runs = Vec::new();
    let mut start = 0usize;
    for i in 0..values.len() {
        let closes = match values.get(i + 1) {
            Some(next) => next.numeric != values[i].numeric + 1,
            None => true,
        };
        if closes {
            runs.push(Run {
                lo: values[start].numeric,
                hi: values[i].numeric,
                stride: 1,
                start,
                end: i + 1,
            });
            start = i + 1;
        }
    }

    let strategy = match runs.len() {
        0 | 1 => Strategy::OneRun,
        2..=MAP_THRESHOLD => Strategy::MultiRun,
        _ => Strategy::Map,
    };
    debug!(
        type_name = %ty.name,
        runs = runs.len(),
        strategy = ?strategy,
        "Partitioned values"
    );

    Partition {
        runs,
        strategy,
        values,
    }
}
