use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Real-valued raster data, one time slice (row x col)
pub type GridData = Array2<f32>;

/// Ordinal position on the monthly time axis: one (year, month) pair per
/// calendar month of the study period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthIndex {
    year: i32,
    month: u32,
}

impl MonthIndex {
    /// Create a month index; `month` must be in 1..=12
    pub fn new(year: i32, month: u32) -> GapFillResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(GapFillError::InvalidTimeIndex { year, month });
        }
        Ok(Self { year, month })
    }

    /// Month of a calendar date (day-of-month is discarded)
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Months since year 0 - the strictly increasing scalar axis that
    /// per-pixel curves are fit over
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: (ordinal.rem_euclid(12) + 1) as u32,
        }
    }

    /// The following calendar month
    pub fn next(&self) -> Self {
        Self::from_ordinal(self.ordinal() + 1)
    }
}

impl std::fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Inclusive, contiguous range of calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    start: MonthIndex,
    end: MonthIndex,
}

impl MonthRange {
    pub fn new(start: MonthIndex, end: MonthIndex) -> GapFillResult<Self> {
        if end < start {
            return Err(GapFillError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> MonthIndex {
        self.start
    }

    pub fn end(&self) -> MonthIndex {
        self.end
    }

    /// Number of months covered, always >= 1
    pub fn len(&self) -> usize {
        (self.end.ordinal() - self.start.ordinal() + 1) as usize
    }

    pub fn contains(&self, index: MonthIndex) -> bool {
        self.start <= index && index <= self.end
    }

    /// Zero-based slot of `index` within the range
    pub fn position(&self, index: MonthIndex) -> Option<usize> {
        if self.contains(index) {
            Some((index.ordinal() - self.start.ordinal()) as usize)
        } else {
            None
        }
    }

    /// Month at zero-based slot `position`
    pub fn index_at(&self, position: usize) -> Option<MonthIndex> {
        if position < self.len() {
            Some(MonthIndex::from_ordinal(self.start.ordinal() + position as i64))
        } else {
            None
        }
    }

    /// Ascending iteration over every month in the range
    pub fn iter(&self) -> impl Iterator<Item = MonthIndex> + '_ {
        (self.start.ordinal()..=self.end.ordinal()).map(MonthIndex::from_ordinal)
    }
}

/// Geospatial affine transformation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

/// Spatial reference carried through the pipeline unchanged: affine
/// transform plus projection definition (WKT or EPSG text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    pub transform: GeoTransform,
    pub projection: String,
}

/// One monthly time slice: a 2D value array with its spatial reference
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    data: GridData,
    geo: GeoReference,
}

impl Grid {
    pub fn new(data: GridData, geo: GeoReference) -> Self {
        Self { data, geo }
    }

    pub fn data(&self) -> &GridData {
        &self.data
    }

    pub fn geo(&self) -> &GeoReference {
        &self.geo
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// (width, height) of the raster
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Sample at (row, col), None when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.data.get((row, col)).copied()
    }
}

/// Ordered stack of monthly grids over a fixed expected range, with an
/// explicit empty slot for every month whose data is missing.
///
/// All present grids share identical dimensions and spatial reference;
/// construction fails otherwise. The stack is a read-only view once built -
/// reconstruction produces a new stack rather than mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStack {
    range: MonthRange,
    slices: Vec<Option<Grid>>,
    geo: GeoReference,
    width: usize,
    height: usize,
}

impl GridStack {
    /// Build a stack from the expected range and whatever grids are present.
    ///
    /// Grids dated outside the expected range are ignored (a loader concern,
    /// not a stack concern). The first grid fixes the dimensions and spatial
    /// reference every other grid must agree with.
    pub fn from_slices(range: MonthRange, grids: Vec<(MonthIndex, Grid)>) -> GapFillResult<Self> {
        let mut first: Option<(usize, usize, GeoReference)> = None;
        let mut slices: Vec<Option<Grid>> = vec![None; range.len()];

        for (index, grid) in grids {
            let position = match range.position(index) {
                Some(p) => p,
                None => {
                    log::debug!("Ignoring grid at {} outside expected range", index);
                    continue;
                }
            };

            if let Some((width, height, geo)) = &first {
                if grid.dimensions() != (*width, *height) {
                    return Err(GapFillError::DimensionMismatch {
                        index,
                        expected: (*width, *height),
                        found: grid.dimensions(),
                    });
                }
                if grid.geo() != geo {
                    return Err(GapFillError::GeoReferenceMismatch { index });
                }
            } else {
                first = Some((grid.width(), grid.height(), grid.geo().clone()));
            }

            slices[position] = Some(grid);
        }

        let (width, height, geo) = first.ok_or(GapFillError::EmptyStack)?;
        Ok(Self {
            range,
            slices,
            geo,
            width,
            height,
        })
    }

    pub fn range(&self) -> MonthRange {
        self.range
    }

    pub fn geo(&self) -> &GeoReference {
        &self.geo
    }

    /// (width, height) shared by every slice
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of months in the expected range
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Grid for one month, None when that month is missing or out of range
    pub fn get(&self, index: MonthIndex) -> Option<&Grid> {
        let position = self.range.position(index)?;
        self.slices[position].as_ref()
    }

    /// True when every expected month has data
    pub fn is_complete(&self) -> bool {
        self.slices.iter().all(|slice| slice.is_some())
    }

    pub fn present_indices(&self) -> BTreeSet<MonthIndex> {
        self.iter()
            .filter_map(|(index, grid)| grid.map(|_| index))
            .collect()
    }

    pub fn missing_indices(&self) -> Vec<MonthIndex> {
        self.iter()
            .filter_map(|(index, grid)| if grid.is_none() { Some(index) } else { None })
            .collect()
    }

    /// Time-ordered iteration over every expected month and its slice
    pub fn iter(&self) -> impl Iterator<Item = (MonthIndex, Option<&Grid>)> + '_ {
        let start = self.range.start().ordinal();
        self.slices.iter().enumerate().map(move |(position, slice)| {
            (MonthIndex::from_ordinal(start + position as i64), slice.as_ref())
        })
    }
}

/// Time series of valid samples at one (row, col) location.
///
/// Ordinals are strictly increasing; values are finite (NaN samples are
/// dropped at extraction and treated as missing months).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSeries {
    row: usize,
    col: usize,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl PixelSeries {
    pub(crate) fn new(row: usize, col: usize, times: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(times.len(), values.len());
        debug_assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
        Self {
            row,
            col,
            times,
            values,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Month ordinals of the valid samples, strictly increasing
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sample values, same order as `times`
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Error types for gap-fill processing
#[derive(Debug, thiserror::Error)]
pub enum GapFillError {
    #[error("grid at {index} has dimensions {found:?}, expected {expected:?}")]
    DimensionMismatch {
        index: MonthIndex,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("grid at {index} does not share the stack's spatial reference")]
    GeoReferenceMismatch { index: MonthIndex },

    #[error("pixel ({row}, {col}) outside grid bounds {width}x{height}")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("pixel ({row}, {col}) has {available} valid samples, {required} required")]
    InsufficientSamples {
        row: usize,
        col: usize,
        available: usize,
        required: usize,
    },

    #[error("no grid available for {index} after reconstruction")]
    IncompleteReconstruction { index: MonthIndex },

    #[error("{year}-{month:02} is not a valid calendar month")]
    InvalidTimeIndex { year: i32, month: u32 },

    #[error("month range ends ({end}) before it starts ({start})")]
    EmptyRange { start: MonthIndex, end: MonthIndex },

    #[error("cannot build a grid stack with no present grids")]
    EmptyStack,

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for gap-fill operations
pub type GapFillResult<T> = Result<T, GapFillError>;
