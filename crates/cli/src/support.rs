// ABOUTME: Shared support files written before a clean run.
// ABOUTME: Generates the local mobile menu script and downloads the site stylesheet to fixed paths.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sitescrub_localize::AssetFetcher;
use tracing::warn;

/// Versioned stylesheet served by the original site.
pub const DEFAULT_STYLESHEET_URL: &str = "https://static1.squarespace.com/static/vta/5c5a519771c10ba3470d8101/versioned-assets/1763142521180-7KZ6ARD8802Y7ZJ2R6XP/static.css";

/// Stylesheet location, relative to the site root, referenced by cleaned documents.
pub const STYLESHEET_PATH: &str = "css/site.css";

/// Script location, relative to the site root, injected into cleaned documents.
pub const MOBILE_MENU_PATH: &str = "js/mobile-menu.js";

/// Replacement for the vendor's mobile navigation toggle.
pub const MOBILE_MENU_JS: &str = r#"/**
 * Mobile Menu Toggle
 */
(function() {
    'use strict';

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', init);
    } else {
        init();
    }

    function init() {
        const burger = document.querySelector('.header-burger');
        const mobileOverlay = document.querySelector('.header-menu');

        if (!burger || !mobileOverlay) return;

        function close() {
            mobileOverlay.classList.remove('header-menu--active');
            document.body.classList.remove('header-menu-open');
        }

        burger.addEventListener('click', function(e) {
            e.preventDefault();
            e.stopPropagation();
            mobileOverlay.classList.toggle('header-menu--active');
            document.body.classList.toggle('header-menu-open');
        });

        document.addEventListener('click', function(e) {
            if (mobileOverlay.classList.contains('header-menu--active')
                && !mobileOverlay.contains(e.target)
                && !burger.contains(e.target)) {
                close();
            }
        });

        document.addEventListener('keydown', function(e) {
            if (e.key === 'Escape' && mobileOverlay.classList.contains('header-menu--active')) {
                close();
            }
        });
    }
})();
"#;

/// Writes the mobile menu script under `root`, creating its directory.
pub fn write_mobile_menu_script(root: &Path) -> Result<PathBuf> {
    let path = root.join(MOBILE_MENU_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&path, MOBILE_MENU_JS).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Writes the script and downloads the stylesheet.
///
/// Failures are reported on `out` and logged; neither stops the batch.
pub fn prepare_support_files(
    root: &Path,
    fetcher: &mut AssetFetcher,
    stylesheet_url: &str,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "Downloading site stylesheet...")?;
    let stylesheet = root.join(STYLESHEET_PATH);
    match fetcher.download_to(stylesheet_url, &stylesheet) {
        Ok(record) => writeln!(out, "✓ {} ({} bytes)", STYLESHEET_PATH, record.bytes)?,
        Err(err) => {
            warn!(url = stylesheet_url, error = %err, "stylesheet download failed");
            writeln!(out, "✗ Failed to download stylesheet: {}", err)?;
        }
    }

    writeln!(out, "Creating mobile menu JavaScript...")?;
    match write_mobile_menu_script(root) {
        Ok(_) => writeln!(out, "✓ {}", MOBILE_MENU_PATH)?,
        Err(err) => {
            warn!(error = %err, "mobile menu script not written");
            writeln!(out, "✗ Failed to write {}: {:#}", MOBILE_MENU_PATH, err)?;
        }
    }

    Ok(())
}
