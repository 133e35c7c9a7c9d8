use crate::core::extract::extract_series;
use crate::core::reassemble::reassemble;
use crate::core::resolver::{missing_runs, resolve_missing};
use crate::core::spline::{ExtrapolationPolicy, SplineInterpolator};
use crate::types::{
    GapFillError, GapFillResult, Grid, GridData, GridStack, MonthIndex, MonthRange,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gap-filling run parameters.
///
/// Replaces the hardcoded paths and year ranges of earlier processing
/// scripts with one explicit structure handed to the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapFillConfig {
    /// Full expected month sequence of the study period
    pub expected: MonthRange,
    /// Minimum valid samples per pixel; 4 engages the cubic fit, 2..=3 the
    /// linear fallback
    pub min_samples: usize,
    /// Edge behavior for missing months outside a pixel's observed span
    pub extrapolation: ExtrapolationPolicy,
    /// Fan pixel rows out across the rayon pool; sequential otherwise.
    /// Both orders produce bit-identical output.
    pub parallel: bool,
}

impl GapFillConfig {
    pub fn new(expected: MonthRange) -> Self {
        Self {
            expected,
            min_samples: 4,
            extrapolation: ExtrapolationPolicy::default(),
            parallel: true,
        }
    }
}

/// One pixel whose series was too short to fit, left NaN in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedPixel {
    pub row: usize,
    pub col: usize,
    pub available: usize,
    pub required: usize,
}

/// Audit record of one gap-filling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapFillReport {
    /// Months that had to be reconstructed, ascending
    pub missing: Vec<MonthIndex>,
    /// Pixels whose curve fit succeeded
    pub pixels_filled: usize,
    /// Pixels left NaN in every reconstructed month, row-major order
    pub unresolved: Vec<UnresolvedPixel>,
}

/// Complete output stack plus the run's audit report
#[derive(Debug, Clone)]
pub struct GapFillOutcome {
    pub stack: GridStack,
    pub report: GapFillReport,
}

/// Reconstructs missing monthly slices of a grid stack.
///
/// Every pixel is processed independently: extract the valid series, fit a
/// curve, evaluate it at the missing months. Pixels with too few samples are
/// collected into the report instead of aborting the run; structural errors
/// (dimension or reference mismatches, uncovered months) abort immediately.
pub struct GapFillProcessor {
    config: GapFillConfig,
    interpolator: SplineInterpolator,
}

impl GapFillProcessor {
    /// Create a processor, validating the configuration
    pub fn new(config: GapFillConfig) -> GapFillResult<Self> {
        let interpolator = SplineInterpolator::new(config.min_samples, config.extrapolation)?;
        Ok(Self {
            config,
            interpolator,
        })
    }

    /// Processor with standard parameters over the given study period
    pub fn standard(expected: MonthRange) -> Self {
        Self {
            config: GapFillConfig::new(expected),
            interpolator: SplineInterpolator::standard(),
        }
    }

    pub fn config(&self) -> &GapFillConfig {
        &self.config
    }

    /// Fill every missing month of the stack.
    ///
    /// Returns a complete output stack (unresolved pixels stay NaN in the
    /// reconstructed months) together with the run report. A stack with no
    /// missing months comes back as an equal clone with an empty report.
    pub fn run(&self, stack: &GridStack) -> GapFillResult<GapFillOutcome> {
        if stack.range() != self.config.expected {
            return Err(GapFillError::Config(format!(
                "stack covers {}..{} but the configured study period is {}..{}",
                stack.range().start(),
                stack.range().end(),
                self.config.expected.start(),
                self.config.expected.end()
            )));
        }

        let start_time = std::time::Instant::now();
        let (width, height) = stack.dimensions();

        let missing = resolve_missing(&self.config.expected, &stack.present_indices());
        if missing.is_empty() {
            log::info!("Stack is already complete, no interpolation required");
            return Ok(GapFillOutcome {
                stack: stack.clone(),
                report: GapFillReport {
                    missing,
                    pixels_filled: 0,
                    unresolved: Vec::new(),
                },
            });
        }

        for (first, last) in missing_runs(&missing) {
            if first == last {
                log::info!("Sensor gap: {}", first);
            } else {
                log::info!("Sensor gap: {} to {}", first, last);
            }
        }
        log::info!(
            "Reconstructing {} months over {}x{} pixels ({} threads)",
            missing.len(),
            width,
            height,
            if self.config.parallel {
                rayon::current_num_threads()
            } else {
                1
            }
        );

        let targets: Vec<f64> = missing.iter().map(|index| index.ordinal() as f64).collect();

        let row_results: Vec<GapFillResult<RowFill>> = if self.config.parallel {
            (0..height)
                .into_par_iter()
                .map(|row| self.fill_row(stack, row, &targets))
                .collect()
        } else {
            (0..height)
                .map(|row| self.fill_row(stack, row, &targets))
                .collect()
        };

        // Merge per-row buffers into one output grid per missing month
        let mut filled: Vec<GridData> = (0..missing.len())
            .map(|_| GridData::from_elem((height, width), f32::NAN))
            .collect();
        let mut unresolved = Vec::new();
        let mut pixels_filled = 0usize;

        for (row, result) in row_results.into_iter().enumerate() {
            let row_fill = result?;
            pixels_filled += width - row_fill.unresolved.len();
            unresolved.extend(row_fill.unresolved);

            for (slot, grid) in filled.iter_mut().enumerate() {
                for col in 0..width {
                    grid[[row, col]] = row_fill.values[slot * width + col];
                }
            }
        }

        let interpolated: BTreeMap<MonthIndex, Grid> = missing
            .iter()
            .copied()
            .zip(
                filled
                    .into_iter()
                    .map(|data| Grid::new(data, stack.geo().clone())),
            )
            .collect();

        let output = reassemble(stack, &interpolated)?;

        if !unresolved.is_empty() {
            log::warn!(
                "{} of {} pixels had too few valid samples and stay NaN in reconstructed months",
                unresolved.len(),
                width * height
            );
        }
        log::info!(
            "Gap filling completed in {:.2}s: {} pixels filled, {} unresolved",
            start_time.elapsed().as_secs_f64(),
            pixels_filled,
            unresolved.len()
        );

        Ok(GapFillOutcome {
            stack: output,
            report: GapFillReport {
                missing,
                pixels_filled,
                unresolved,
            },
        })
    }

    /// Fit and evaluate every pixel of one row.
    ///
    /// Each worker owns its row buffer outright, so the parallel fan-out
    /// needs no synchronization beyond collecting the results.
    fn fill_row(&self, stack: &GridStack, row: usize, targets: &[f64]) -> GapFillResult<RowFill> {
        let (width, _) = stack.dimensions();
        let mut values = vec![f32::NAN; targets.len() * width];
        let mut unresolved = Vec::new();

        for col in 0..width {
            match extract_series(stack, row, col, self.config.min_samples) {
                Ok(series) => {
                    let curve = self.interpolator.fit(&series)?;
                    for (slot, &target) in targets.iter().enumerate() {
                        values[slot * width + col] =
                            self.interpolator.evaluate(&curve, target) as f32;
                    }
                }
                Err(GapFillError::InsufficientSamples {
                    row,
                    col,
                    available,
                    required,
                }) => {
                    unresolved.push(UnresolvedPixel {
                        row,
                        col,
                        available,
                        required,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        Ok(RowFill { values, unresolved })
    }
}

/// Interpolated values for one raster row: `values[slot * width + col]`
/// holds the value of missing month `slot` at `col`
struct RowFill {
    values: Vec<f32>,
    unresolved: Vec<UnresolvedPixel>,
}
