// ABOUTME: Main library entry point for image localization.
// ABOUTME: Re-exports the public API: AssetFetcher, FetcherBuilder, Rewriter, LocalizeError, ErrorCode.

//! Downloads images referenced from a remote CDN and rewrites documents to
//! point at the local copies.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sitescrub_localize::{localize_document, AssetFetcher, LocalizeError, Rewriter};
//!
//! fn main() -> Result<(), LocalizeError> {
//!     let mut fetcher = AssetFetcher::builder().images_dir("site/images").build()?;
//!     let outcome = localize_document(
//!         &mut fetcher,
//!         &Rewriter::default(),
//!         Path::new("site/about/index.html"),
//!         true,
//!     )?;
//!     println!("{} images localized", outcome.stats.localized);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fetcher;
pub mod options;
pub mod rewriter;

pub use crate::error::{ErrorCode, LocalizeError};
pub use crate::fetcher::{asset_filename, AssetFetcher, FetchOutcome, FetchRecord};
pub use crate::options::{FetcherBuilder, FetcherOptions, DEFAULT_IMAGES_DIR};
pub use crate::rewriter::{
    localize_document, read_text, relative_url, LocalizeOutcome, RewriteOutcome, RewriteStats, Rewriter,
    SQUARESPACE_IMAGE_HOST,
};
