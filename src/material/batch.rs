//! Sequential batch driver.
//!
//! Runs one synchronization per material and aggregates the outcome. A
//! failure on one material never rolls back or stops the others, except
//! for failures that invalidate the whole batch (the library vanishing).

use tracing::{info, warn};

use super::{AssetHost, MaterialId, MaterialSynchronizer, SyncRequest};
use crate::core::LibraryIndex;
use crate::util::{Error, Result};

/// Aggregated outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Materials replaced by a template.
    pub modified: usize,
    /// Linked materials left alone.
    pub skipped: usize,
    /// Modified materials whose remap only covered the selection.
    pub partial: usize,
    /// Failed materials with their reason.
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    /// Number of failed materials.
    pub fn failures(&self) -> usize {
        self.failed.len()
    }

    /// Whether nothing was modified.
    pub fn is_noop(&self) -> bool {
        self.modified == 0
    }

    /// One-line status message for the user.
    pub fn summary(&self) -> String {
        let mut msg = if self.modified == 0 && self.skipped == 0 && self.failed.is_empty() {
            return "Nothing modified, be sure you selected objects with existing materials!".to_string();
        } else if self.skipped > 0 {
            format!("Modified {} materials, skipped {} linked ones", self.modified, self.skipped)
        } else {
            format!("Modified {} materials", self.modified)
        };
        if !self.failed.is_empty() {
            msg.push_str(&format!(", {} failed", self.failed.len()));
        }
        if self.partial > 0 {
            msg.push_str(&format!(
                " ({} only remapped on selected objects)",
                self.partial
            ));
        }
        msg
    }
}

/// Synchronize `materials` one after another.
///
/// Linked materials are counted as skipped. `build` turns each remaining
/// material into a request; a build error counts as that material's failure.
pub fn run_batch<H, F>(
    host: &mut H,
    index: &mut LibraryIndex,
    synchronizer: &MaterialSynchronizer,
    materials: &[MaterialId],
    mut build: F,
) -> Result<BatchReport>
where
    H: AssetHost + ?Sized,
    F: FnMut(&H, MaterialId) -> Result<SyncRequest>,
{
    let mut report = BatchReport::default();

    for &id in materials {
        let Some(name) = host.material_name(id).map(str::to_string) else {
            continue;
        };
        if host.is_linked(id) {
            report.skipped += 1;
            continue;
        }

        let result = build(host, id).and_then(|request| synchronizer.synchronize(host, index, &request));
        match result {
            Ok(outcome) => {
                report.modified += 1;
                if outcome.is_partial() {
                    report.partial += 1;
                }
            }
            Err(e) if e.aborts_batch() => return Err(e),
            Err(e) => {
                warn!(material = %name, error = %e, "sync failed");
                report.failed.push((name, e));
            }
        }
    }

    info!(
        library = ?index.library_path(),
        modified = report.modified,
        skipped = report.skipped,
        failed = report.failures(),
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_messages() {
        let report = BatchReport::default();
        assert!(report.summary().starts_with("Nothing modified"));

        let report = BatchReport { modified: 3, ..Default::default() };
        assert_eq!(report.summary(), "Modified 3 materials");

        let report = BatchReport {
            modified: 1,
            skipped: 1,
            partial: 1,
            failed: vec![("glass".into(), Error::TemplateNotFound("x".into()))],
        };
        assert_eq!(
            report.summary(),
            "Modified 1 materials, skipped 1 linked ones, 1 failed (1 only remapped on selected objects)"
        );
    }
}
