use gracefill::{
    GapFillProcessor, GeoReference, GeoTransform, Grid, GridData, GridStack, MonthIndex,
    MonthRange, UnresolvedPixel,
};

fn geo() -> GeoReference {
    GeoReference {
        transform: GeoTransform {
            top_left_x: 68.0,
            pixel_width: 0.25,
            rotation_x: 0.0,
            top_left_y: 37.0,
            rotation_y: 0.0,
            pixel_height: -0.25,
        },
        projection: "EPSG:4326".to_string(),
    }
}

fn month(m: u32) -> MonthIndex {
    MonthIndex::new(2002, m).unwrap()
}

/// Twelve-month stack over 3x3 pixels with month 6 missing. Pixel (1, 1)
/// carries a single valid sample (a dead cell, NaN elsewhere); pixel (2, 0)
/// is NaN in every month.
fn stack_with_dead_cells() -> GridStack {
    let range = MonthRange::new(month(1), month(12)).unwrap();
    let origin = range.start().ordinal();

    let mut grids = Vec::new();
    for index in range.iter() {
        if index == month(6) {
            continue;
        }
        let t = (index.ordinal() - origin) as f32;
        let data = GridData::from_shape_fn((3, 3), |(row, col)| {
            if row == 1 && col == 1 {
                if index == month(1) { 42.0 } else { f32::NAN }
            } else if row == 2 && col == 0 {
                f32::NAN
            } else {
                (row + col) as f32 + 2.0 * t
            }
        });
        grids.push((index, Grid::new(data, geo())));
    }

    GridStack::from_slices(range, grids).unwrap()
}

#[test]
fn test_unreconstructable_pixels_are_reported_in_aggregate() {
    let stack = stack_with_dead_cells();
    let outcome = GapFillProcessor::standard(stack.range()).run(&stack).unwrap();

    // the run completes for the healthy pixels
    assert!(outcome.stack.is_complete());
    assert_eq!(outcome.report.pixels_filled, 7);

    // both dead cells show up, row-major, with their sample counts
    assert_eq!(
        outcome.report.unresolved,
        vec![
            UnresolvedPixel {
                row: 1,
                col: 1,
                available: 1,
                required: 4
            },
            UnresolvedPixel {
                row: 2,
                col: 0,
                available: 0,
                required: 4
            },
        ]
    );
}

#[test]
fn test_unresolved_cells_stay_nan_in_reconstructed_month() {
    let stack = stack_with_dead_cells();
    let outcome = GapFillProcessor::standard(stack.range()).run(&stack).unwrap();

    let filled = outcome.stack.get(month(6)).unwrap();
    assert!(filled.data()[[1, 1]].is_nan());
    assert!(filled.data()[[2, 0]].is_nan());

    // healthy neighbors are filled with the linear trend (t = 5)
    assert!((filled.data()[[0, 0]] - 10.0).abs() < 1e-3);
    assert!((filled.data()[[2, 2]] - 14.0).abs() < 1e-3);
}

#[test]
fn test_original_months_keep_their_nan_cells() {
    let stack = stack_with_dead_cells();
    let outcome = GapFillProcessor::standard(stack.range()).run(&stack).unwrap();

    // pass-through months are untouched, dead cells included
    let original = outcome.stack.get(month(3)).unwrap();
    assert!(original.data()[[1, 1]].is_nan());
    assert!(original.data()[[2, 0]].is_nan());
    assert_eq!(original.data()[[0, 0]], 4.0);
}
