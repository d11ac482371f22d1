// ABOUTME: Line sanitizer that strips vendor markup using the rule table and region state machine.
// ABOUTME: Also injects the mobile menu script before closing body tags and decides persistence.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};

use crate::document::{line_terminator, read_document, write_document, Document};
use crate::error::SanitizeError;
use crate::region::Region;
use crate::rules::{classify, Rule, RuleAction, BODY_CLOSE, MOBILE_MENU_SCRIPT, SQUARESPACE_RULES};

/// Result of sanitizing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeOutcome {
    /// Candidate document text.
    #[serde(skip)]
    pub text: String,
    /// True when the candidate differs from the input.
    pub modified: bool,
    pub lines_before: usize,
    pub lines_after: usize,
    /// Lines suppressed by drop rules or open regions.
    pub lines_dropped: usize,
    /// Lines swapped for a fixed replacement.
    pub lines_replaced: usize,
    /// Script lines inserted before closing body tags.
    pub injections: usize,
}

/// Line-oriented sanitizer over an ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'r> {
    rules: &'r [Rule],
}

impl Default for Sanitizer<'static> {
    fn default() -> Self {
        Self {
            rules: SQUARESPACE_RULES,
        }
    }
}

impl<'r> Sanitizer<'r> {
    /// Creates a sanitizer evaluating `rules` in order.
    pub fn with_rules(rules: &'r [Rule]) -> Self {
        Self { rules }
    }

    /// Sanitizes document text.
    pub fn sanitize(&self, text: &str) -> SanitizeOutcome {
        let doc = Document::parse(text);
        let lines_before = doc.line_count();

        let mut region = Region::Normal;
        let mut kept: Vec<String> = Vec::with_capacity(lines_before);
        let mut lines_dropped = 0;
        let mut lines_replaced = 0;

        for (idx, line) in doc.lines().iter().enumerate() {
            if region.is_open() {
                region = region.advance(line);
                lines_dropped += 1;
                if !region.is_open() {
                    trace!(line = idx + 1, "region closed");
                }
                continue;
            }

            let Some(rule) = classify(self.rules, line) else {
                kept.push(line.clone());
                continue;
            };

            debug!(rule = rule.name, line = idx + 1, "rule matched");
            match rule.action {
                RuleAction::Keep => kept.push(line.clone()),
                RuleAction::Drop => lines_dropped += 1,
                RuleAction::Replace(literal) => {
                    kept.push(format!("{}{}", literal, line_terminator(line)));
                    lines_replaced += 1;
                }
                RuleAction::OpenRegion(kind) => {
                    region = Region::open(kind, line);
                    lines_dropped += 1;
                    if region.is_open() {
                        trace!(line = idx + 1, region = %kind, "region opened");
                    }
                }
            }
        }

        if let Some(kind) = region.kind() {
            debug!(region = %kind, "document ended inside an open region");
        }

        let (final_lines, injections) = inject_mobile_menu(kept);
        let output = Document::from_lines(final_lines);
        let text_out = output.to_text();

        SanitizeOutcome {
            modified: text_out != text,
            lines_before,
            lines_after: output.line_count(),
            lines_dropped,
            lines_replaced,
            injections,
            text: text_out,
        }
    }

    /// Reads, sanitizes and, when `persist` is set and the text changed, rewrites a file.
    pub fn sanitize_file(&self, path: &Path, persist: bool) -> Result<SanitizeOutcome, SanitizeError> {
        let text = read_document(path)?;
        let outcome = self.sanitize(&text);
        if outcome.modified && persist {
            write_document(path, &outcome.text)?;
            debug!(path = %path.display(), "document rewritten");
        }
        Ok(outcome)
    }
}

impl SanitizeOutcome {
    /// Net line delta, ignoring injected lines that exceed removals.
    pub fn lines_removed(&self) -> usize {
        self.lines_before.saturating_sub(self.lines_after)
    }
}

/// Inserts the mobile menu script before every line containing `</body>`.
///
/// Skips the insertion when the preceding line already is the script line.
fn inject_mobile_menu(lines: Vec<String>) -> (Vec<String>, usize) {
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);
    let mut injections = 0;

    for line in lines {
        if line.contains(BODY_CLOSE) {
            let already_present = out
                .last()
                .map(|prev| prev.trim() == MOBILE_MENU_SCRIPT)
                .unwrap_or(false);
            if !already_present {
                let terminator = match line_terminator(&line) {
                    "" => "\n",
                    t => t,
                };
                out.push(format!("{}{}", MOBILE_MENU_SCRIPT, terminator));
                injections += 1;
            }
        }
        out.push(line);
    }

    (out, injections)
}
