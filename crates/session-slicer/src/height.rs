//! Printed object height detection.
//!
//! A Z level counts as printed once more than two planar moves follow the
//! move that reached it. Z moves that only lift the nozzle away from the
//! finished print are never followed by that much drawing, so they are
//! ignored.

use crate::classify::{height_token, moves_with_xy, moves_with_xyz};

/// Minimum number of planar moves (exclusive) for a Z level to count as
/// printed.
const PRINTED_LEVEL_MOVES: usize = 2;

/// Result of scanning a print for its real height.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeightProfile {
    /// Z token of the last printed level, as written in the file.
    /// `None` when no printed object was detected.
    pub height: Option<String>,
    /// One past the index of the last planar move on that level.
    /// Zero when no printed object was detected.
    pub draw_line_index: usize,
}

impl HeightProfile {
    /// Whether any printed level was found.
    pub fn has_object(&self) -> bool {
        self.height.is_some()
    }
}

/// Scan `lines` for the last Z level that was actually printed.
pub fn analyze<S: AsRef<str>>(lines: &[S]) -> HeightProfile {
    let mut profile = HeightProfile::default();
    let mut height: &str = "";
    let mut last_draw = 0;
    let mut draws = 0;

    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if moves_with_xyz(line) {
            if draws > PRINTED_LEVEL_MOVES {
                profile.height = Some(height.to_string());
                profile.draw_line_index = last_draw + 1;
            }
            height = height_token(line).unwrap_or_default();
            draws = 0;
        } else if moves_with_xy(line) {
            last_draw = i;
            draws += 1;
        }
    }

    profile
}
