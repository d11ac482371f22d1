// ABOUTME: Configuration options for the asset fetcher, including FetcherOptions and FetcherBuilder.
// ABOUTME: FetcherBuilder provides a fluent API for constructing AssetFetcher instances.

use std::path::PathBuf;

use crate::error::LocalizeError;
use crate::fetcher::AssetFetcher;

/// Directory, relative to the site root, that fetched images are stored in.
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Configuration options for the asset fetcher.
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    /// Directory fetched assets are written to.
    pub images_dir: PathBuf,
    pub user_agent: String,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            user_agent: format!("sitescrub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for constructing AssetFetcher instances with custom configuration.
#[derive(Debug, Clone)]
pub struct FetcherBuilder {
    opts: FetcherOptions,
}

impl FetcherBuilder {
    /// Create a new FetcherBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: FetcherOptions::default(),
        }
    }

    /// Set the directory fetched images are saved to.
    pub fn images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.opts.images_dir = dir.into();
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Build the AssetFetcher with the configured options.
    pub fn build(self) -> Result<AssetFetcher, LocalizeError> {
        AssetFetcher::new(self.opts)
    }
}

impl Default for FetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
