use crate::core::pipeline::GapFillReport;
use crate::core::resolver::missing_runs;
use crate::types::MonthIndex;

/// Read-only observer of a gap-filling run, for audit trails.
///
/// Reporters consume what the resolver and pipeline produce; the
/// interpolation logic never depends on them.
pub trait GapReporter {
    /// Called once the missing months are known, before filling starts
    fn missing_resolved(&self, missing: &[MonthIndex]);

    /// Called with the final report after the run
    fn run_completed(&self, report: &GapFillReport);
}

/// Reporter that writes the audit trail to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl GapReporter for LogReporter {
    fn missing_resolved(&self, missing: &[MonthIndex]) {
        if missing.is_empty() {
            log::info!("Audit: no missing months");
            return;
        }

        for (first, last) in missing_runs(missing) {
            if first == last {
                log::info!("Audit: missing {}", first);
            } else {
                log::info!("Audit: missing {} to {}", first, last);
            }
        }
    }

    fn run_completed(&self, report: &GapFillReport) {
        log::info!(
            "Audit: {} months reconstructed, {} pixels filled",
            report.missing.len(),
            report.pixels_filled
        );
        for pixel in &report.unresolved {
            log::warn!(
                "Audit: pixel ({}, {}) unresolved ({} of {} samples)",
                pixel.row,
                pixel.col,
                pixel.available,
                pixel.required
            );
        }
    }
}
