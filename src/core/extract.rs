use crate::types::{GapFillError, GapFillResult, GridStack, PixelSeries};

/// Extract the valid time series at one (row, col) location.
///
/// Walks the stack in time order and keeps one (ordinal, value) pair per
/// present slice. Non-finite samples are dropped here so a NaN cell behaves
/// exactly like a missing month and never reaches a curve fit. Fails with
/// `InsufficientSamples` when fewer than `min_samples` valid points remain.
pub fn extract_series(
    stack: &GridStack,
    row: usize,
    col: usize,
    min_samples: usize,
) -> GapFillResult<PixelSeries> {
    let (width, height) = stack.dimensions();
    if row >= height || col >= width {
        return Err(GapFillError::IndexOutOfRange {
            row,
            col,
            width,
            height,
        });
    }

    let mut times = Vec::with_capacity(stack.len());
    let mut values = Vec::with_capacity(stack.len());

    for (index, slice) in stack.iter() {
        if let Some(grid) = slice {
            let value = grid.data()[[row, col]];
            if value.is_finite() {
                times.push(index.ordinal() as f64);
                values.push(value as f64);
            }
        }
    }

    if times.len() < min_samples {
        return Err(GapFillError::InsufficientSamples {
            row,
            col,
            available: times.len(),
            required: min_samples,
        });
    }

    Ok(PixelSeries::new(row, col, times, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeoReference, GeoTransform, Grid, GridStack, MonthIndex, MonthRange};
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

    /// Four-month stack over a 1x2 raster; month 2 missing, and pixel
    /// (0, 1) is NaN in month 3
    fn stack() -> GridStack {
        let range = MonthRange::new(
            MonthIndex::new(2002, 1).unwrap(),
            MonthIndex::new(2002, 4).unwrap(),
        )
        .unwrap();

        let slice = |a: f32, b: f32| Grid::new(Array2::from_shape_vec((1, 2), vec![a, b]).unwrap(), geo());

        GridStack::from_slices(
            range,
            vec![
                (MonthIndex::new(2002, 1).unwrap(), slice(10.0, 1.0)),
                (MonthIndex::new(2002, 3).unwrap(), slice(14.0, f32::NAN)),
                (MonthIndex::new(2002, 4).unwrap(), slice(16.0, 3.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_series_skips_missing_months() {
        let series = extract_series(&stack(), 0, 0, 2).unwrap();

        let base = MonthIndex::new(2002, 1).unwrap().ordinal() as f64;
        assert_eq!(series.times(), &[base, base + 2.0, base + 3.0]);
        assert_eq!(series.values(), &[10.0, 14.0, 16.0]);
    }

    #[test]
    fn test_nan_sample_treated_as_missing() {
        let series = extract_series(&stack(), 0, 1, 2).unwrap();

        // month 3's NaN is dropped alongside the genuinely missing month 2
        assert_eq!(series.len(), 2);
        assert_eq!(series.values(), &[1.0, 3.0]);
    }

    #[test]
    fn test_too_few_samples_is_an_error() {
        let result = extract_series(&stack(), 0, 1, 3);

        assert!(matches!(
            result,
            Err(GapFillError::InsufficientSamples {
                row: 0,
                col: 1,
                available: 2,
                required: 3
            })
        ));
    }

    #[test]
    fn test_out_of_bounds_pixel_is_an_error() {
        assert!(matches!(
            extract_series(&stack(), 1, 0, 2),
            Err(GapFillError::IndexOutOfRange { row: 1, .. })
        ));
        assert!(matches!(
            extract_series(&stack(), 0, 2, 2),
            Err(GapFillError::IndexOutOfRange { col: 2, .. })
        ));
    }
}
