// ABOUTME: Rewrites remote CDN image references in a document to locally cached copies.
// ABOUTME: Finds src attributes on the image CDN, fetches each once, and substitutes document-relative paths.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::LocalizeError;
use crate::fetcher::{AssetFetcher, FetchOutcome};

/// Host prefix of the image CDN whose references get localized.
pub const SQUARESPACE_IMAGE_HOST: &str = "https://images.squarespace-cdn.com";

static SQUARESPACE_IMAGE_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(&image_src_pattern(SQUARESPACE_IMAGE_HOST)).unwrap());

fn image_src_pattern(host_prefix: &str) -> String {
    format!(
        r#"src="({}/[^"]+)""#,
        regex::escape(host_prefix.trim_end_matches('/'))
    )
}

/// Per-document counters produced by a rewrite.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    /// Distinct remote URLs found in the document.
    pub found: usize,
    /// URLs whose references were replaced with a local path.
    pub localized: usize,
    /// Individual `src="..."` occurrences replaced.
    pub replacements: usize,
    pub fetched: usize,
    pub cached: usize,
    pub failed: usize,
}

/// Rewritten text plus counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    pub stats: RewriteStats,
}

/// Result of localizing one document on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizeOutcome {
    pub modified: bool,
    pub stats: RewriteStats,
}

/// Finds and replaces remote image references.
#[derive(Debug, Clone)]
pub struct Rewriter {
    pattern: Regex,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self {
            pattern: SQUARESPACE_IMAGE_SRC.clone(),
        }
    }
}

impl Rewriter {
    /// Matches `src="<host_prefix>/..."` instead of the Squarespace image CDN.
    pub fn with_host_prefix(host_prefix: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&image_src_pattern(host_prefix))?,
        })
    }

    /// Remote image URLs referenced by `text`, deduplicated in first-seen order.
    pub fn find_remote_images(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Fetches every remote image in `text` and points its references at the local copy.
    ///
    /// `doc_path` is the document's location; substituted paths are relative to
    /// its directory. URLs that fail to fetch are left untouched.
    pub fn rewrite(&self, fetcher: &mut AssetFetcher, doc_path: &Path, text: &str) -> RewriteOutcome {
        let urls = self.find_remote_images(text);
        let mut stats = RewriteStats {
            found: urls.len(),
            ..Default::default()
        };
        let mut content = text.to_string();
        let doc_dir = doc_path.parent().unwrap_or_else(|| Path::new(""));

        for url in &urls {
            let outcome = fetcher.fetch(url);
            match &outcome {
                FetchOutcome::Fetched { .. } => stats.fetched += 1,
                FetchOutcome::Cached(_) => stats.cached += 1,
                FetchOutcome::Failed { .. } => stats.failed += 1,
            }
            let Some(local) = outcome.local_path() else {
                continue;
            };

            let relative = relative_url(doc_dir, local);
            let needle = format!(r#"src="{}""#, url);
            let occurrences = content.matches(&needle).count();
            content = content.replace(&needle, &format!(r#"src="{}""#, relative));

            debug!(url = url.as_str(), local = relative.as_str(), occurrences, "reference localized");
            stats.localized += 1;
            stats.replacements += occurrences;
        }

        RewriteOutcome {
            text: content,
            stats,
        }
    }
}

/// Reads a document, localizes its images and writes it back when `persist` is
/// set and at least one reference was replaced.
pub fn localize_document(
    fetcher: &mut AssetFetcher,
    rewriter: &Rewriter,
    path: &Path,
    persist: bool,
) -> Result<LocalizeOutcome, LocalizeError> {
    let target = path.display().to_string();
    let text = read_text(path)?;

    let outcome = rewriter.rewrite(fetcher, path, &text);
    let modified = outcome.stats.localized > 0;
    if modified && persist {
        fs::write(path, &outcome.text).map_err(|e| LocalizeError::io(&target, "Write", e))?;
        info!(path = %path.display(), localized = outcome.stats.localized, "document rewritten");
    }

    Ok(LocalizeOutcome {
        modified,
        stats: outcome.stats,
    })
}

/// Reads a document as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, LocalizeError> {
    let target = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| LocalizeError::io(&target, "Read", e))?;
    String::from_utf8(bytes).map_err(|e| {
        LocalizeError::decode(&target, "Read", Some(anyhow::anyhow!("invalid UTF-8: {}", e.utf8_error())))
    })
}

/// Path of `target` relative to the directory `from_dir`, joined with `/`.
///
/// Two relative paths are taken against the same base. When exactly one is
/// absolute, both are first resolved against the current directory.
pub fn relative_url(from_dir: &Path, target: &Path) -> String {
    if from_dir.is_absolute() != target.is_absolute() {
        if let (Ok(from_abs), Ok(target_abs)) =
            (std::path::absolute(from_dir), std::path::absolute(target))
        {
            return relative_url(&from_abs, &target_abs);
        }
    }

    let from = normalized(from_dir);
    let to = normalized(target);

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

fn normalized(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(out.last(), Some(Component::Normal(_))) => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_url_nested_document() {
        assert_eq!(
            relative_url(Path::new("a/b"), Path::new("images/pic.jpg")),
            "../../images/pic.jpg"
        );
    }

    #[test]
    fn test_relative_url_root_document() {
        assert_eq!(relative_url(Path::new(""), Path::new("images/pic.jpg")), "images/pic.jpg");
        assert_eq!(relative_url(Path::new("."), Path::new("./images/pic.jpg")), "images/pic.jpg");
    }

    #[test]
    fn test_relative_url_shared_prefix() {
        assert_eq!(
            relative_url(Path::new("/srv/site/blog/2024"), Path::new("/srv/site/images/pic.jpg")),
            "../../images/pic.jpg"
        );
        assert_eq!(
            relative_url(Path::new("site/images"), Path::new("site/images/pic.jpg")),
            "pic.jpg"
        );
    }

    #[test]
    fn test_relative_url_mixed_relative_and_absolute() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            relative_url(Path::new("./about"), &cwd.join("images").join("pic.jpg")),
            "../images/pic.jpg"
        );
        assert_eq!(
            relative_url(&cwd.join("blog"), Path::new("images/pic.jpg")),
            "../images/pic.jpg"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_url_outside_tree_has_no_empty_segments() {
        let url = relative_url(Path::new("./about"), Path::new("/srv/imgs/pic.jpg"));
        assert!(url.starts_with("../"), "{}", url);
        assert!(url.ends_with("/srv/imgs/pic.jpg"), "{}", url);
        assert!(!url.contains("//"), "{}", url);
    }

    #[test]
    fn test_relative_url_collapses_parent_components() {
        assert_eq!(
            relative_url(Path::new("site/blog/../about"), Path::new("site/images/pic.jpg")),
            "../images/pic.jpg"
        );
    }

    #[test]
    fn test_find_remote_images_dedups_in_order() {
        let html = concat!(
            r#"<img src="https://images.squarespace-cdn.com/content/v1/a/one.jpg?format=500w">"#,
            r#"<img data-src="https://images.squarespace-cdn.com/content/v1/a/lazy.jpg">"#,
            r#"<img src="https://images.squarespace-cdn.com/content/v1/a/two.png">"#,
            r#"<img src="https://images.squarespace-cdn.com/content/v1/a/one.jpg?format=500w">"#,
            r#"<img src="https://example.com/other.jpg">"#,
        );
        let urls = Rewriter::default().find_remote_images(html);
        // data-src ends in src="..." too
        assert_eq!(
            urls,
            vec![
                "https://images.squarespace-cdn.com/content/v1/a/one.jpg?format=500w".to_string(),
                "https://images.squarespace-cdn.com/content/v1/a/lazy.jpg".to_string(),
                "https://images.squarespace-cdn.com/content/v1/a/two.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_find_remote_images_ignores_local_references() {
        let html = r#"<img src="../images/one.jpg"><img src="images/two.png">"#;
        assert!(Rewriter::default().find_remote_images(html).is_empty());
    }

    #[test]
    fn test_with_host_prefix_escapes_and_trims() {
        let rewriter = Rewriter::with_host_prefix("http://127.0.0.1:8080/").unwrap();
        let urls = rewriter.find_remote_images(r#"<img src="http://127.0.0.1:8080/a.jpg"><img src="http://127a0a0a1:8080/b.jpg">"#);
        assert_eq!(urls, vec!["http://127.0.0.1:8080/a.jpg".to_string()]);
    }
}
