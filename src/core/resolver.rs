use crate::types::{MonthIndex, MonthRange};
use std::collections::BTreeSet;

/// Determine which months of the expected range have no data.
///
/// Pure set difference: every month of `expected` not contained in
/// `present`, ascending. Present indices outside the expected range are
/// ignored - filtering those is the loader's job, not the resolver's.
pub fn resolve_missing(expected: &MonthRange, present: &BTreeSet<MonthIndex>) -> Vec<MonthIndex> {
    expected
        .iter()
        .filter(|index| !present.contains(index))
        .collect()
}

/// Collapse a sorted missing-index list into contiguous (first, last) runs.
///
/// Sensor outages span consecutive months, so audit output reads better as
/// runs than as individual entries.
pub fn missing_runs(missing: &[MonthIndex]) -> Vec<(MonthIndex, MonthIndex)> {
    let mut runs: Vec<(MonthIndex, MonthIndex)> = Vec::new();

    for &index in missing {
        match runs.last_mut() {
            Some((_, last)) if last.next() == index => *last = index,
            _ => runs.push((index, index)),
        }
    }

    runs
}
