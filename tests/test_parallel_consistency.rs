use gracefill::{
    GapFillConfig, GapFillProcessor, GeoReference, GeoTransform, Grid, GridData, GridStack,
    MonthIndex, MonthRange,
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

fn month(year: i32, m: u32) -> MonthIndex {
    MonthIndex::new(year, m).unwrap()
}

/// 36-month stack over a 16x16 raster with two separate gaps and a sprinkle
/// of NaN cells, to exercise the row fan-out on something non-trivial
fn test_stack() -> GridStack {
    let range = MonthRange::new(month(2002, 1), month(2004, 12)).unwrap();
    let origin = range.start().ordinal();

    let mut grids = Vec::new();
    for index in range.iter() {
        let t = (index.ordinal() - origin) as f64;
        if (5.0..=8.0).contains(&t) || t == 20.0 {
            continue;
        }

        let data = GridData::from_shape_fn((16, 16), |(row, col)| {
            // a NaN pocket that shifts with time
            if (row + col + t as usize) % 29 == 0 {
                f32::NAN
            } else {
                let trend = 0.2 + 0.01 * (row as f64) - 0.015 * (col as f64);
                (trend * t + ((row * 16 + col) as f64)) as f32
            }
        });
        grids.push((index, Grid::new(data, geo())));
    }

    GridStack::from_slices(range, grids).unwrap()
}

#[test]
fn test_parallel_and_sequential_runs_are_bit_identical() {
    let _ = env_logger::builder().is_test(true).try_init();

    let stack = test_stack();

    let mut sequential_config = GapFillConfig::new(stack.range());
    sequential_config.parallel = false;
    let sequential = GapFillProcessor::new(sequential_config)
        .unwrap()
        .run(&stack)
        .unwrap();

    let parallel_config = GapFillConfig::new(stack.range());
    assert!(parallel_config.parallel);
    let parallel = GapFillProcessor::new(parallel_config)
        .unwrap()
        .run(&stack)
        .unwrap();

    assert_eq!(sequential.report, parallel.report);

    for (index, slice) in sequential.stack.iter() {
        let a = slice.unwrap().data();
        let b = parallel.stack.get(index).unwrap().data();
        let identical = a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits());
        assert!(identical, "slice {} differs between execution modes", index);
    }
}
