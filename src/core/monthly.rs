//! Calendar-month regrouping of a filled stack.
//!
//! Downstream climatology work wants one series per calendar month across
//! all years (every January together, every February together, ...) rather
//! than one series per pixel.

use crate::types::{GapFillError, GapFillResult, Grid, GridData, GridStack};
use std::collections::BTreeMap;

/// Group the present grids of a stack by calendar month.
///
/// Returns month (1..=12) -> list of (year, grid), ascending by year.
/// Missing months simply do not contribute an entry.
pub fn partition_by_month(stack: &GridStack) -> BTreeMap<u32, Vec<(i32, Grid)>> {
    let mut partition: BTreeMap<u32, Vec<(i32, Grid)>> = BTreeMap::new();

    for (index, slice) in stack.iter() {
        if let Some(grid) = slice {
            partition
                .entry(index.month())
                .or_default()
                .push((index.year(), grid.clone()));
        }
    }

    partition
}

/// Per-cell mean of one calendar month across all years in the stack.
///
/// Non-finite cells are excluded from the mean; a cell with no finite sample
/// in any year stays NaN. Fails when `month` is not a calendar month or the
/// stack holds no data for it.
pub fn month_mean(stack: &GridStack, month: u32) -> GapFillResult<Grid> {
    if !(1..=12).contains(&month) {
        return Err(GapFillError::InvalidTimeIndex { year: 0, month });
    }

    let grids: Vec<&Grid> = stack
        .iter()
        .filter_map(|(index, slice)| slice.filter(|_| index.month() == month))
        .collect();

    if grids.is_empty() {
        return Err(GapFillError::EmptyStack);
    }

    let (width, height) = stack.dimensions();
    let mut mean = GridData::from_elem((height, width), f32::NAN);

    for row in 0..height {
        for col in 0..width {
            // f64 accumulation over the years that have a finite sample here
            let mut sum = 0.0f64;
            let mut count = 0usize;

            for grid in &grids {
                let value = grid.data()[[row, col]];
                if value.is_finite() {
                    sum += value as f64;
                    count += 1;
                }
            }

            if count > 0 {
                mean[[row, col]] = (sum / count as f64) as f32;
            }
        }
    }

    Ok(Grid::new(mean, stack.geo().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeoReference, GeoTransform, MonthIndex, MonthRange};
    use ndarray::Array2;

    fn geo() -> GeoReference {
        GeoReference {
            transform: GeoTransform {
                top_left_x: 0.0,
                pixel_width: 1.0,
                rotation_x: 0.0,
                top_left_y: 0.0,
                rotation_y: 0.0,
                pixel_height: -1.0,
            },
            projection: "EPSG:4326".to_string(),
        }
    }

    fn month(year: i32, m: u32) -> MonthIndex {
        MonthIndex::new(year, m).unwrap()
    }

    fn grid(values: Vec<f32>) -> Grid {
        Grid::new(Array2::from_shape_vec((1, 2), values).unwrap(), geo())
    }

    /// Two-year stack with February 2003 missing
    fn stack() -> GridStack {
        let range = MonthRange::new(month(2002, 1), month(2003, 12)).unwrap();
        let mut grids = Vec::new();
        for index in range.iter() {
            if index == month(2003, 2) {
                continue;
            }
            let base = index.year() as f32 - 2002.0;
            grids.push((index, grid(vec![base + index.month() as f32, f32::NAN])));
        }
        GridStack::from_slices(range, grids).unwrap()
    }

    #[test]
    fn test_partition_groups_by_calendar_month() {
        let partition = partition_by_month(&stack());

        assert_eq!(partition.len(), 12);
        let januaries = &partition[&1];
        assert_eq!(januaries.len(), 2);
        assert_eq!(januaries[0].0, 2002);
        assert_eq!(januaries[1].0, 2003);

        // February 2003 is missing, so only one February survives
        assert_eq!(partition[&2].len(), 1);
        assert_eq!(partition[&2][0].0, 2002);
    }

    #[test]
    fn test_month_mean_averages_across_years() {
        let mean = month_mean(&stack(), 1).unwrap();

        // (1.0 + 2.0) / 2 for January of 2002 and 2003
        assert_eq!(mean.data()[[0, 0]], 1.5);
        // the all-NaN column stays NaN rather than becoming zero
        assert!(mean.data()[[0, 1]].is_nan());
    }

    #[test]
    fn test_month_mean_rejects_bad_month() {
        assert!(matches!(
            month_mean(&stack(), 0),
            Err(GapFillError::InvalidTimeIndex { .. })
        ));
        assert!(matches!(
            month_mean(&stack(), 13),
            Err(GapFillError::InvalidTimeIndex { .. })
        ));
    }

    #[test]
    fn test_month_mean_with_no_data_is_an_error() {
        let range = MonthRange::new(month(2002, 1), month(2002, 6)).unwrap();
        let stack = GridStack::from_slices(
            range,
            vec![(month(2002, 1), grid(vec![1.0, 2.0]))],
        )
        .unwrap();

        // month 3 exists in the range but has no grid
        assert!(matches!(
            month_mean(&stack, 3),
            Err(GapFillError::EmptyStack)
        ));
    }
}
