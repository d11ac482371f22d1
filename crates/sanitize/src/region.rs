// ABOUTME: Skip-region state machine for multi-line vendor blocks.
// ABOUTME: Tracks script blocks, brace-balanced context blocks and inline widgets, one at a time.

use crate::rules::{RegionKind, SCRIPT_CLOSE};

/// Scanner state. At most one region is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Normal,
    InScriptBlock,
    /// Running `{` minus `}` count since the trigger line.
    InContextBlock {
        depth: i64,
    },
    InInlineWidget,
}

/// Net brace balance of a line: number of `{` minus number of `}`.
pub fn brace_balance(line: &str) -> i64 {
    line.bytes().fold(0, |acc, b| match b {
        b'{' => acc + 1,
        b'}' => acc - 1,
        _ => acc,
    })
}

impl Region {
    /// State after a trigger line of `kind`.
    ///
    /// A script or context trigger that already satisfies its own close
    /// condition leaves the scanner in `Normal`. An inline widget always waits
    /// for a closing marker on a later line, so a one-line widget tag also
    /// swallows the next script block.
    pub fn open(kind: RegionKind, trigger: &str) -> Region {
        let opened = match kind {
            RegionKind::ScriptBlock => Region::InScriptBlock,
            RegionKind::InlineWidget => return Region::InInlineWidget,
            RegionKind::ContextBlock => Region::InContextBlock {
                depth: brace_balance(trigger),
            },
        };
        if opened.closes_on(trigger) {
            Region::Normal
        } else {
            opened
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Region::Normal)
    }

    pub fn kind(&self) -> Option<RegionKind> {
        match self {
            Region::Normal => None,
            Region::InScriptBlock => Some(RegionKind::ScriptBlock),
            Region::InContextBlock { .. } => Some(RegionKind::ContextBlock),
            Region::InInlineWidget => Some(RegionKind::InlineWidget),
        }
    }

    /// Consumes one line that lies inside this region and returns the next state.
    ///
    /// The line itself is always suppressed by the caller, including the one that
    /// closes the region.
    pub fn advance(self, line: &str) -> Region {
        let next = match self {
            Region::InContextBlock { depth } => Region::InContextBlock {
                depth: depth + brace_balance(line),
            },
            other => other,
        };
        if next.closes_on(line) {
            Region::Normal
        } else {
            next
        }
    }

    // Close condition given the depth already updated for `line`.
    fn closes_on(&self, line: &str) -> bool {
        match self {
            Region::Normal => false,
            Region::InScriptBlock | Region::InInlineWidget => line.contains(SCRIPT_CLOSE),
            Region::InContextBlock { depth } => *depth <= 0 && line.contains(SCRIPT_CLOSE),
        }
    }
}
