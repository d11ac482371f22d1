// ABOUTME: Ordered removal rules matching vendor-injected Squarespace markup.
// ABOUTME: Each rule is a pure line predicate paired with an action; the first match wins.

use std::fmt;

use serde::Serialize;

/// Opening marker of a script element.
pub const SCRIPT_OPEN: &str = "<script";
/// Closing marker that terminates script-block, context-block and inline-widget regions.
pub const SCRIPT_CLOSE: &str = "</script>";
/// Closing body marker; the mobile menu script is injected before it.
pub const BODY_CLOSE: &str = "</body>";

/// Replacement for the vendor's versioned stylesheet link.
pub const LOCAL_STYLESHEET_LINK: &str = r#"<link rel="stylesheet" href="css/site.css">"#;
/// Script line injected before every closing body tag.
pub const MOBILE_MENU_SCRIPT: &str = r#"<script src="js/mobile-menu.js"></script>"#;

const VENDOR_COMMENT: &str = "<!-- This is Squarespace. -->";
const ROLLUPS_MARKER: &str = "SQUARESPACE_ROLLUPS = {}";
const ROLLUPS_NAME: &str = "SQUARESPACE_ROLLUPS";
const ROLLUP_LOADER: &str = "(function(rollups, name)";
const POLYFILLER: &str = "@sqs/polyfiller";
const SCRIPTS_COMPRESSED: &str = "assets.squarespace.com/universal/scripts-compressed";
const STATIC_ASSIGNMENT: &str = "Static = window.Static";
const CONTEXT_NAME: &str = "SQUARESPACE_CONTEXT";
const COMPONENT_DEFINITIONS: &str = "definitions.sqspcdn.com";
const VERSIONED_CSS: &str = "static1.squarespace.com/static/versioned-site-css";
const SITE_CSS: &str = "site.css";
const COOKIE_GETTER: &str = r#"data-sqs-type="cookiepreferencesgetter""#;
const SITE_BUNDLE: &str = "site-bundle";
const BEYONDSPACE: &str = "beyondspace";
const JSDELIVR: &str = "cdn.jsdelivr.net";
const BEYONDSPACE_STUDIO: &str = "BeyondspaceStudio";

/// Kind of multi-line region a rule can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    /// A rollup loader `<script>` spanning several lines, closed by `</script>`.
    ScriptBlock,
    /// The `Static.SQUARESPACE_CONTEXT` assignment, closed by brace balance.
    ContextBlock,
    /// The cookie preferences widget, closed by the next `</script>`.
    InlineWidget,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegionKind::ScriptBlock => "script-block",
            RegionKind::ContextBlock => "context-block",
            RegionKind::InlineWidget => "inline-widget",
        };
        write!(f, "{}", s)
    }
}

/// What happens to a line matched by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Drop,
    OpenRegion(RegionKind),
    /// Replace the line with the literal, keeping the original terminator.
    Replace(&'static str),
    Keep,
}

/// A named line predicate with its action.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub action: RuleAction,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish()
    }
}

/// Removal rules in priority order.
pub static SQUARESPACE_RULES: &[Rule] = &[
    Rule {
        name: "vendor-comment",
        matches: is_vendor_comment,
        action: RuleAction::Drop,
    },
    Rule {
        name: "asset-loader",
        matches: is_asset_loader,
        action: RuleAction::Drop,
    },
    Rule {
        name: "rollup-loader",
        matches: is_rollup_loader,
        action: RuleAction::OpenRegion(RegionKind::ScriptBlock),
    },
    Rule {
        name: "context-block",
        matches: is_context_assignment,
        action: RuleAction::OpenRegion(RegionKind::ContextBlock),
    },
    Rule {
        name: "component-definitions",
        matches: is_component_definition,
        action: RuleAction::Drop,
    },
    Rule {
        name: "versioned-stylesheet",
        matches: is_versioned_stylesheet,
        action: RuleAction::Replace(LOCAL_STYLESHEET_LINK),
    },
    Rule {
        name: "cookie-preferences",
        matches: is_cookie_preferences,
        action: RuleAction::OpenRegion(RegionKind::InlineWidget),
    },
    Rule {
        name: "site-bundle",
        matches: is_site_bundle,
        action: RuleAction::Drop,
    },
    Rule {
        name: "beyondspace-embed",
        matches: is_beyondspace_embed,
        action: RuleAction::Drop,
    },
];

/// Returns the first rule in `rules` whose predicate matches `line`.
pub fn classify<'r>(rules: &'r [Rule], line: &str) -> Option<&'r Rule> {
    rules.iter().find(|rule| (rule.matches)(line))
}

/// The "This is Squarespace" comment, or a bare rollups initializer outside a script tag.
pub fn is_vendor_comment(line: &str) -> bool {
    line.contains(VENDOR_COMMENT) || (line.contains(ROLLUPS_MARKER) && !line.contains(SCRIPT_OPEN))
}

pub fn is_asset_loader(line: &str) -> bool {
    (line.contains(POLYFILLER) && line.contains(SCRIPT_OPEN)) || line.contains(SCRIPTS_COMPRESSED)
}

pub fn is_rollup_loader(line: &str) -> bool {
    line.contains(SCRIPT_OPEN) && (line.contains(ROLLUP_LOADER) || line.contains(ROLLUPS_NAME))
}

pub fn is_context_assignment(line: &str) -> bool {
    line.contains(STATIC_ASSIGNMENT) && line.contains(CONTEXT_NAME)
}

pub fn is_component_definition(line: &str) -> bool {
    line.contains(COMPONENT_DEFINITIONS)
}

pub fn is_versioned_stylesheet(line: &str) -> bool {
    line.contains(VERSIONED_CSS) && line.contains(SITE_CSS)
}

pub fn is_cookie_preferences(line: &str) -> bool {
    line.contains(COOKIE_GETTER)
}

pub fn is_site_bundle(line: &str) -> bool {
    line.contains(SITE_BUNDLE) && line.contains(".js")
}

pub fn is_beyondspace_embed(line: &str) -> bool {
    line.contains(BEYONDSPACE) && (line.contains(JSDELIVR) || line.contains(BEYONDSPACE_STUDIO))
}
