// ABOUTME: Batch orchestrator that runs the sanitize and localize pipelines over a site tree.
// ABOUTME: Discovers documents under an explicit root, isolates per-document failures, and accumulates a RunReport.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sitescrub_localize::{localize_document, read_text, AssetFetcher, Rewriter};
use sitescrub_sanitize::Sanitizer;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::report::{Pipeline, RunReport};

/// Options shared by both pipelines.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Extension (without dot) of the documents to process.
    pub extension: String,
    /// Compute everything but write nothing.
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extension: "html".to_string(),
            dry_run: false,
        }
    }
}

/// Recursively lists files under `root` whose extension matches, in sorted order.
///
/// Failing to read `root` itself is an error; unreadable entries below it are
/// logged and skipped.
pub fn discover_documents(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let meta = fs::metadata(root)
        .with_context(|| format!("cannot read root directory {}", root.display()))?;
    if !meta.is_dir() {
        bail!("root {} is not a directory", root.display());
    }

    let wanted = extension.trim_start_matches('.');
    let mut documents = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(err)
                    .with_context(|| format!("cannot read root directory {}", root.display()));
            }
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            .unwrap_or(false);
        if matches {
            documents.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), count = documents.len(), "documents discovered");
    Ok(documents)
}

/// Path shown to the user: relative to the root when possible.
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Sanitizes every document under `root`, printing one line per modified or failed file.
pub fn run_sanitize(
    root: &Path,
    sanitizer: &Sanitizer<'_>,
    opts: &BatchOptions,
    out: &mut dyn Write,
) -> Result<RunReport> {
    let documents = discover_documents(root, &opts.extension)?;
    let mut report = RunReport::new(Pipeline::Sanitize, opts.dry_run);

    writeln!(out, "Processing {} {} files...", documents.len(), opts.extension)?;

    for path in &documents {
        report.documents_scanned += 1;
        let shown = display_path(root, path);

        match sanitizer.sanitize_file(path, !opts.dry_run) {
            Ok(outcome) if outcome.modified => {
                report.documents_modified += 1;
                report.lines_removed += outcome.lines_removed();
                report.lines_dropped += outcome.lines_dropped;
                report.lines_replaced += outcome.lines_replaced;
                report.injections += outcome.injections;
                writeln!(
                    out,
                    "✓ {}: {} → {} lines ({} removed)",
                    shown,
                    outcome.lines_before,
                    outcome.lines_after,
                    outcome.lines_removed()
                )?;
            }
            Ok(_) => debug!(path = %shown, "nothing to remove"),
            Err(err) => {
                warn!(path = %shown, error = %err, "failed to sanitize document");
                writeln!(out, "✗ Error in {}: {}", shown, err)?;
                report.record_failure(shown, err);
            }
        }
    }

    Ok(report)
}

/// Localizes CDN images for every document under `root`.
///
/// In dry-run mode images are only counted, never fetched.
pub fn run_localize(
    root: &Path,
    fetcher: &mut AssetFetcher,
    rewriter: &Rewriter,
    opts: &BatchOptions,
    out: &mut dyn Write,
) -> Result<RunReport> {
    let documents = discover_documents(root, &opts.extension)?;
    let mut report = RunReport::new(Pipeline::Localize, opts.dry_run);

    writeln!(out, "Found {} {} files", documents.len(), opts.extension)?;

    for path in &documents {
        report.documents_scanned += 1;
        let shown = display_path(root, path);

        if opts.dry_run {
            match read_text(path) {
                Ok(text) => {
                    let found = rewriter.find_remote_images(&text).len();
                    report.images_found += found;
                    if found > 0 {
                        writeln!(out, "{}: {} external images", shown, found)?;
                    }
                }
                Err(err) => {
                    warn!(path = %shown, error = %err, "failed to read document");
                    writeln!(out, "✗ Error in {}: {}", shown, err)?;
                    report.record_failure(shown, err);
                }
            }
            continue;
        }

        match localize_document(fetcher, rewriter, path, true) {
            Ok(outcome) => {
                let stats = &outcome.stats;
                report.images_found += stats.found;
                report.assets_fetched += stats.fetched;
                report.assets_cached += stats.cached;
                report.assets_failed += stats.failed;
                if outcome.modified {
                    report.documents_modified += 1;
                }
                if stats.found > 0 {
                    writeln!(
                        out,
                        "{}: {} external images, {} localized, {} failed",
                        shown, stats.found, stats.localized, stats.failed
                    )?;
                }
            }
            Err(err) => {
                warn!(path = %shown, error = %err, "failed to localize document");
                writeln!(out, "✗ Error in {}: {}", shown, err)?;
                report.record_failure(shown, err);
            }
        }
    }

    Ok(report)
}
