// ABOUTME: Line sanitizer for Squarespace-exported HTML documents.
// ABOUTME: Re-exports the public API: Sanitizer, the rule table, region tracking and document I/O.

//! Removes vendor scripts and metadata from exported pages one line at a time.
//!
//! Each line is classified by an ordered rule table. A matching rule either
//! drops the line, replaces it, or opens a multi-line region whose lines are
//! all dropped until its close condition holds. Unmatched lines are copied
//! through byte for byte.
//!
//! # Example
//!
//! ```
//! use sitescrub_sanitize::Sanitizer;
//!
//! let page = "<!-- This is Squarespace. -->\n<p>hello</p>\n</body>\n";
//! let outcome = Sanitizer::default().sanitize(page);
//!
//! assert!(outcome.modified);
//! assert_eq!(
//!     outcome.text,
//!     "<p>hello</p>\n<script src=\"js/mobile-menu.js\"></script>\n</body>\n"
//! );
//! ```

pub mod document;
pub mod error;
pub mod region;
pub mod rules;
pub mod sanitizer;

pub use document::{line_terminator, read_document, write_document, Document};
pub use error::SanitizeError;
pub use region::{brace_balance, Region};
pub use rules::{
    classify, RegionKind, Rule, RuleAction, BODY_CLOSE, LOCAL_STYLESHEET_LINK,
    MOBILE_MENU_SCRIPT, SCRIPT_CLOSE, SCRIPT_OPEN, SQUARESPACE_RULES,
};
pub use sanitizer::{SanitizeOutcome, Sanitizer};
