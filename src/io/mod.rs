//! Collaborator seams for loading and persisting grid stacks.
//!
//! Concrete raster formats (GeoTIFF, NetCDF) live on the far side of these
//! traits; the core only ever sees in-memory grids. The in-memory
//! implementations here double as the reference collaborators for tests.

pub mod memory;
pub mod report;

pub use memory::{MemorySink, MemorySource};
pub use report::{GapReporter, LogReporter};

use crate::types::{GapFillError, GapFillResult, Grid, GridStack, MonthIndex, MonthRange};

/// Supplies monthly grids for stack assembly.
///
/// A source declares the full expected study period and answers `None` for
/// months it has no data for. Malformed upstream files are the source's
/// errors to raise, not the core's.
pub trait GridSource {
    /// Full expected month sequence of the study period
    fn expected_range(&self) -> MonthRange;

    /// Grid for one month, `None` when that month has no data
    fn load(&self, index: MonthIndex) -> GapFillResult<Option<Grid>>;
}

/// Persists grids of a completed stack, one per month.
///
/// The addressing scheme is variable name plus month; the sink decides file
/// naming and on-disk format.
pub trait GridSink {
    fn write(&mut self, variable: &str, index: MonthIndex, grid: &Grid) -> GapFillResult<()>;
}

/// Assemble a validated stack by draining a source over its expected range
pub fn load_stack(source: &dyn GridSource) -> GapFillResult<GridStack> {
    let range = source.expected_range();
    let mut grids = Vec::with_capacity(range.len());

    for index in range.iter() {
        if let Some(grid) = source.load(index)? {
            grids.push((index, grid));
        } else {
            log::debug!("Source has no grid for {}", index);
        }
    }

    let stack = GridStack::from_slices(range, grids)?;
    log::info!(
        "Loaded stack: {} of {} months present",
        stack.present_indices().len(),
        stack.len()
    );
    Ok(stack)
}

/// Persist a completed stack in time order.
///
/// Writing an incomplete stack is refused - gaps must be filled (or
/// explicitly resolved by the caller) before anything reaches storage.
pub fn write_stack(
    sink: &mut dyn GridSink,
    variable: &str,
    stack: &GridStack,
) -> GapFillResult<()> {
    for (index, slice) in stack.iter() {
        match slice {
            Some(grid) => sink.write(variable, index, grid)?,
            None => return Err(GapFillError::IncompleteReconstruction { index }),
        }
    }

    log::info!("Wrote {} grids for variable {}", stack.len(), variable);
    Ok(())
}
