// ABOUTME: Run report accumulated by the batch orchestrator.
// ABOUTME: Holds per-run totals and per-document failures; renders as text or JSON.

use std::fmt;

use serde::Serialize;

/// Which pipeline produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    #[default]
    Sanitize,
    Localize,
}

/// A document that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub path: String,
    pub error: String,
}

/// Aggregate counts for one orchestrator invocation. Never persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub pipeline: Pipeline,
    pub dry_run: bool,
    pub documents_scanned: usize,
    pub documents_modified: usize,
    pub documents_failed: usize,
    /// Net line count reduction across modified documents.
    pub lines_removed: usize,
    /// Lines suppressed by rules, before script injection.
    pub lines_dropped: usize,
    pub lines_replaced: usize,
    pub injections: usize,
    pub images_found: usize,
    pub assets_fetched: usize,
    pub assets_cached: usize,
    pub assets_failed: usize,
    pub failures: Vec<DocumentFailure>,
}

impl RunReport {
    pub fn new(pipeline: Pipeline, dry_run: bool) -> Self {
        Self {
            pipeline,
            dry_run,
            ..Default::default()
        }
    }

    /// Records a per-document failure.
    pub fn record_failure(&mut self, path: impl Into<String>, error: impl fmt::Display) {
        self.documents_failed += 1;
        self.failures.push(DocumentFailure {
            path: path.into(),
            error: error.to_string(),
        });
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        if self.dry_run {
            writeln!(f, "Done (dry run, nothing written)")?;
        } else {
            writeln!(f, "Done!")?;
        }
        match self.pipeline {
            Pipeline::Sanitize => {
                writeln!(
                    f,
                    "Modified: {}/{} files",
                    self.documents_modified, self.documents_scanned
                )?;
                writeln!(f, "Total lines removed: {}", self.lines_removed)?;
                if self.lines_replaced > 0 || self.injections > 0 {
                    writeln!(
                        f,
                        "Lines replaced: {}, scripts injected: {}",
                        self.lines_replaced, self.injections
                    )?;
                }
            }
            Pipeline::Localize => {
                writeln!(f, "Modified {} files", self.documents_modified)?;
                writeln!(
                    f,
                    "Images found: {}, fetched: {}, cached: {}, failed: {}",
                    self.images_found, self.assets_fetched, self.assets_cached, self.assets_failed
                )?;
            }
        }
        if self.documents_failed > 0 {
            writeln!(f, "Failed: {} files", self.documents_failed)?;
        }
        Ok(())
    }
}
