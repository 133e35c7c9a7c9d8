use crate::types::{GapFillError, GapFillResult, Grid, GridStack, MonthIndex};
use std::collections::BTreeMap;

/// Merge original and interpolated grids into a new, complete stack.
///
/// For every month of the expected range the original grid is copied through
/// unchanged when present; otherwise the interpolated grid is taken. A month
/// covered by neither is an upstream logic defect and fails with
/// `IncompleteReconstruction` - it must never pass silently.
///
/// An already-complete stack is returned as an equal clone without touching
/// `interpolated` at all.
pub fn reassemble(
    original: &GridStack,
    interpolated: &BTreeMap<MonthIndex, Grid>,
) -> GapFillResult<GridStack> {
    if original.is_complete() {
        log::debug!("Stack already complete, nothing to reassemble");
        return Ok(original.clone());
    }

    let range = original.range();
    let mut grids = Vec::with_capacity(range.len());
    let mut reconstructed = 0usize;

    for (index, slice) in original.iter() {
        match slice {
            Some(grid) => grids.push((index, grid.clone())),
            None => match interpolated.get(&index) {
                Some(grid) => {
                    grids.push((index, grid.clone()));
                    reconstructed += 1;
                }
                None => return Err(GapFillError::IncompleteReconstruction { index }),
            },
        }
    }

    // Re-validates dimensions and spatial reference of the interpolated grids
    let output = GridStack::from_slices(range, grids)?;
    debug_assert!(output.is_complete());

    log::info!(
        "Reassembled stack: {} months, {} reconstructed",
        output.len(),
        reconstructed
    );
    Ok(output)
}
