use crate::io::{GridSink, GridSource};
use crate::types::{GapFillResult, Grid, MonthIndex, MonthRange};
use std::collections::BTreeMap;

/// In-memory grid source over a fixed study period
#[derive(Debug, Clone)]
pub struct MemorySource {
    range: MonthRange,
    grids: BTreeMap<MonthIndex, Grid>,
}

impl MemorySource {
    pub fn new(range: MonthRange) -> Self {
        Self {
            range,
            grids: BTreeMap::new(),
        }
    }

    /// Register a grid for one month, replacing any previous one
    pub fn insert(&mut self, index: MonthIndex, grid: Grid) {
        self.grids.insert(index, grid);
    }
}

impl GridSource for MemorySource {
    fn expected_range(&self) -> MonthRange {
        self.range
    }

    fn load(&self, index: MonthIndex) -> GapFillResult<Option<Grid>> {
        Ok(self.grids.get(&index).cloned())
    }
}

/// In-memory grid sink recording writes in order.
///
/// Labels follow the variable + month addressing scheme
/// (`twsa_2002-06`), the in-memory analogue of monthly raster filenames.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    written: Vec<(String, Grid)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels in write order
    pub fn labels(&self) -> Vec<&str> {
        self.written.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// All writes in order
    pub fn entries(&self) -> &[(String, Grid)] {
        &self.written
    }
}

impl GridSink for MemorySink {
    fn write(&mut self, variable: &str, index: MonthIndex, grid: &Grid) -> GapFillResult<()> {
        self.written.push((format!("{}_{}", variable, index), grid.clone()));
        Ok(())
    }
}
