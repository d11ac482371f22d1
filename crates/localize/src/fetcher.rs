// ABOUTME: Asset fetcher that downloads remote images to deterministic local paths.
// ABOUTME: Skips cached files, memoizes attempts per run, and stages downloads so failures leave no partial file.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::LocalizeError;
use crate::options::{FetcherBuilder, FetcherOptions};

/// Structured result of one successful HTTP retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRecord {
    pub url: String,
    pub status: u16,
    pub bytes: u64,
}

/// Outcome of resolving a remote URL to a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Downloaded during this call.
    Fetched { path: PathBuf, record: FetchRecord },
    /// A local copy already existed; no network call was made.
    Cached(PathBuf),
    /// The asset could not be localized. The caller should leave the reference as is.
    Failed { url: String, reason: String },
}

impl FetchOutcome {
    /// Local path of the asset, or `None` for a failed fetch.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            FetchOutcome::Fetched { path, .. } | FetchOutcome::Cached(path) => Some(path),
            FetchOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }
}

/// Downloads remote assets into a single images directory.
///
/// Fetches are sequential and blocking. A URL is retrieved at most once per
/// fetcher: later requests for it are answered from the local file or from the
/// remembered failure.
#[derive(Debug)]
pub struct AssetFetcher {
    client: reqwest::blocking::Client,
    opts: FetcherOptions,
    attempted: HashMap<String, FetchOutcome>,
    retrievals: usize,
}

impl AssetFetcher {
    /// Create a FetcherBuilder for configuring a fetcher.
    pub fn builder() -> FetcherBuilder {
        FetcherBuilder::new()
    }

    /// Create a new AssetFetcher with the given options.
    pub fn new(opts: FetcherOptions) -> Result<Self, LocalizeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&opts.user_agent)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| {
                LocalizeError::fetch(
                    "",
                    "BuildClient",
                    Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                )
            })?;

        Ok(Self {
            client,
            opts,
            attempted: HashMap::new(),
            retrievals: 0,
        })
    }

    pub fn images_dir(&self) -> &Path {
        &self.opts.images_dir
    }

    /// Number of network retrievals performed so far.
    pub fn fetch_count(&self) -> usize {
        self.retrievals
    }

    /// Resolves `url` to a file under the images directory, downloading it if needed.
    pub fn fetch(&mut self, url: &str) -> FetchOutcome {
        if let Some(previous) = self.attempted.get(url) {
            debug!(url, "asset already attempted this run");
            return match previous {
                FetchOutcome::Fetched { path, .. } => FetchOutcome::Cached(path.clone()),
                other => other.clone(),
            };
        }

        let outcome = self.resolve(url);
        self.attempted.insert(url.to_string(), outcome.clone());
        outcome
    }

    fn resolve(&mut self, url: &str) -> FetchOutcome {
        let Some(filename) = asset_filename(url) else {
            warn!(url, "cannot derive a filename from URL");
            return FetchOutcome::Failed {
                url: url.to_string(),
                reason: LocalizeError::invalid_url(url, "Fetch", None).to_string(),
            };
        };

        let path = self.opts.images_dir.join(&filename);
        if path.exists() {
            debug!(url, path = %path.display(), "cache hit");
            return FetchOutcome::Cached(path);
        }

        match self.download_to(url, &path) {
            Ok(record) => FetchOutcome::Fetched { path, record },
            Err(err) => {
                warn!(url, error = %err, "failed to fetch asset");
                FetchOutcome::Failed {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Downloads `url` to `dest`, replacing any existing file.
    ///
    /// The body is staged in a temporary file beside `dest` and only moved into
    /// place when the status is a success and the body is non-empty. On failure
    /// the staged file is discarded and an existing `dest` is left untouched.
    pub fn download_to(&mut self, url: &str, dest: &Path) -> Result<FetchRecord, LocalizeError> {
        let parsed = Url::parse(url).map_err(|e| {
            LocalizeError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(LocalizeError::invalid_url(
                url,
                "Fetch",
                Some(anyhow::anyhow!("scheme must be http or https")),
            ));
        }

        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .map_err(|e| LocalizeError::io(parent.display().to_string(), "CreateDir", e))?;

        self.retrievals += 1;
        let record = self.transfer(url, parent, dest)?;
        info!(url, path = %dest.display(), bytes = record.bytes, "saved asset");
        Ok(record)
    }

    // Dropping `staged` on any early return deletes it.
    fn transfer(&self, url: &str, dir: &Path, dest: &Path) -> Result<FetchRecord, LocalizeError> {
        let mut response = self.client.get(url).send().map_err(|e| {
            LocalizeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocalizeError::status(url, "Fetch", status.as_u16()));
        }

        let dest_str = dest.display().to_string();
        let mut staged =
            NamedTempFile::new_in(dir).map_err(|e| LocalizeError::io(&dest_str, "Write", e))?;
        response.copy_to(&mut staged).map_err(|e| {
            LocalizeError::fetch(url, "Fetch", Some(anyhow::anyhow!("failed to read body: {}", e)))
        })?;
        staged
            .flush()
            .map_err(|e| LocalizeError::io(&dest_str, "Write", e))?;

        let bytes = staged
            .as_file()
            .metadata()
            .map_err(|e| LocalizeError::io(&dest_str, "Stat", e))?
            .len();
        if bytes == 0 {
            return Err(LocalizeError::empty(url, "Fetch"));
        }

        staged
            .persist(dest)
            .map_err(|e| LocalizeError::io(&dest_str, "Write", e.error))?;

        Ok(FetchRecord {
            url: url.to_string(),
            status: status.as_u16(),
            bytes,
        })
    }
}

/// Final path segment of `url`, without query string or fragment, percent-decoded.
pub fn asset_filename(url: &str) -> Option<String> {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string)),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    }?;
    let name = decode_segment(&segment).unwrap_or(segment);
    Some(name).filter(|n| !n.is_empty() && n != "." && n != "..")
}

// None when decoding is not UTF-8 or would introduce a path separator.
fn decode_segment(segment: &str) -> Option<String> {
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    if decoded.contains(['/', '\\', '\0']) {
        return None;
    }
    Some(decoded.into_owned())
}
