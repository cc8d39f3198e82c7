//! Start/end scaffolding line counts.

use serde::{Deserialize, Serialize};

use crate::classify::moves_with_xyz;
use crate::error::{Result, SessionError};

/// Number of source lines to repeat at a session boundary.
///
/// Serialized as an integer where any negative value means automatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum LineCount {
    /// Detect the count from the G-code.
    #[default]
    Auto,
    /// Repeat exactly this many lines.
    Fixed(usize),
}

impl From<i64> for LineCount {
    fn from(value: i64) -> Self {
        usize::try_from(value).map_or(LineCount::Auto, LineCount::Fixed)
    }
}

impl From<LineCount> for i64 {
    fn from(value: LineCount) -> Self {
        match value {
            LineCount::Auto => -1,
            LineCount::Fixed(n) => n as i64,
        }
    }
}

/// Resolved scaffolding line counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    /// Lines from the top of the file repeated at the start of each new session.
    pub start_lines: usize,
    /// Lines from the bottom of the file repeated at the end of each closed session.
    pub end_lines: usize,
}

/// Resolve automatic line counts.
///
/// Automatic start covers everything before the first move with X, Y and Z.
/// Automatic end covers everything from `draw_line_index` (one past the last
/// printed move) to the end of the file.
pub fn resolve<S: AsRef<str>>(
    start: LineCount,
    end: LineCount,
    lines: &[S],
    draw_line_index: usize,
) -> Result<Boundaries> {
    let start_lines = match start {
        LineCount::Auto => lines
            .iter()
            .position(|l| moves_with_xyz(l.as_ref()))
            .ok_or(SessionError::NoPrintableMoves)?,
        LineCount::Fixed(n) => n,
    };
    let end_lines = match end {
        LineCount::Auto => lines.len().saturating_sub(draw_line_index),
        LineCount::Fixed(n) => n,
    };

    if start_lines > lines.len() {
        return Err(SessionError::InvalidSettings(format!(
            "startCodeLines ({start_lines}) exceeds the {} lines in the file",
            lines.len()
        )));
    }
    if end_lines > lines.len() {
        return Err(SessionError::InvalidSettings(format!(
            "endCodeLines ({end_lines}) exceeds the {} lines in the file",
            lines.len()
        )));
    }

    Ok(Boundaries {
        start_lines,
        end_lines,
    })
}
