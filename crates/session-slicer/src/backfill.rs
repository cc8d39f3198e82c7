//! Lookback ring and backfill filtering.
//!
//! When a session starts mid-print, the lines that immediately preceded the
//! cut may have set the feed rate or carried slicer comments (layer markers,
//! feature types). The lookback ring remembers the last few raw lines so a
//! selection of them can be replayed at the top of the new session.

use serde::{Deserialize, Serialize};

use crate::classify::{has_feed_rate, is_comment};

/// Number of preceding lines kept for backfill.
pub const LOOKBACK_LEN: usize = 5;

/// Fixed-size FIFO of the most recent lines, borrowed from the input.
///
/// Always holds exactly [`LOOKBACK_LEN`] entries; unused slots are blank.
#[derive(Debug, Clone)]
pub struct Lookback<'a> {
    slots: [&'a str; LOOKBACK_LEN],
    /// Index of the oldest entry, which is also the next slot written.
    head: usize,
}

impl Default for Lookback<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Lookback<'a> {
    /// Create a ring of blank entries.
    pub fn new() -> Self {
        Self {
            slots: [""; LOOKBACK_LEN],
            head: 0,
        }
    }

    /// Evict the oldest entry and insert `line` as the newest.
    pub fn push(&mut self, line: &'a str) {
        self.slots[self.head] = line;
        self.head = (self.head + 1) % LOOKBACK_LEN;
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        (0..LOOKBACK_LEN).map(move |i| self.slots[(self.head + i) % LOOKBACK_LEN])
    }

    /// Take every entry (oldest first) and reset the ring to blanks.
    pub fn drain(&mut self) -> [&'a str; LOOKBACK_LEN] {
        let mut out = [""; LOOKBACK_LEN];
        for (slot, line) in out.iter_mut().zip(self.iter()) {
            *slot = line;
        }
        *self = Self::new();
        out
    }
}

/// Which lookback lines are replayed at the start of a new session.
///
/// Bit 1 selects comments, bit 2 selects linear moves that set a feed rate.
///
/// Deserialized as a raw integer; [`SessionConfig`](crate::SessionConfig)
/// rejects values above 3 when it is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackfillMode(u8);

impl BackfillMode {
    /// No backfill.
    pub const OFF: Self = Self(0);
    /// Replay comment lines.
    pub const COMMENTS: Self = Self(1);
    /// Replay G0/G1 moves carrying an F parameter.
    pub const FEED_MOVES: Self = Self(2);
    /// Replay both comments and feed moves.
    pub const ALL: Self = Self(3);

    /// Raw bitmask value.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `line` should be replayed under this mode.
    pub fn selects(self, line: &str) -> bool {
        (self.contains(Self::COMMENTS) && is_comment(line))
            || (self.contains(Self::FEED_MOVES) && has_feed_rate(line))
    }
}

impl Default for BackfillMode {
    fn default() -> Self {
        Self::ALL
    }
}

impl TryFrom<u8> for BackfillMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::ALL.0 {
            return Err(format!("backupMode must be between 0 and 3, got {value}"));
        }
        Ok(Self(value))
    }
}

impl From<BackfillMode> for u8 {
    fn from(mode: BackfillMode) -> Self {
        mode.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_keeps_last_five() {
        let lines: Vec<String> = (0..7).map(|i| format!("L{i}")).collect();
        let mut ring = Lookback::new();
        assert!(ring.iter().all(str::is_empty));

        for line in &lines {
            ring.push(line);
        }
        let kept: Vec<&str> = ring.iter().collect();
        assert_eq!(kept, ["L2", "L3", "L4", "L5", "L6"]);
    }

    #[test]
    fn test_partially_filled_ring() {
        let mut ring = Lookback::new();
        ring.push("a");
        ring.push("b");
        let kept: Vec<&str> = ring.iter().collect();
        assert_eq!(kept, ["", "", "", "a", "b"]);
    }

    #[test]
    fn test_drain_resets() {
        let mut ring = Lookback::new();
        for line in ["a", "b", "c", "d", "e", "f"] {
            ring.push(line);
        }
        assert_eq!(ring.drain(), ["b", "c", "d", "e", "f"]);
        assert!(ring.iter().all(str::is_empty));

        ring.push("g");
        assert_eq!(ring.iter().last(), Some("g"));
    }

    #[test]
    fn test_mode_selection() {
        let comment = ";TYPE:WALL-OUTER";
        let indented = "  ;LAYER:3";
        let feed = "G1 F1800";
        let plain = "G1 X1 Y1 E0.4";

        assert!(!BackfillMode::OFF.selects(comment));
        assert!(!BackfillMode::OFF.selects(feed));

        assert!(BackfillMode::COMMENTS.selects(comment));
        assert!(BackfillMode::COMMENTS.selects(indented));
        assert!(!BackfillMode::COMMENTS.selects(feed));

        assert!(!BackfillMode::FEED_MOVES.selects(comment));
        assert!(BackfillMode::FEED_MOVES.selects(feed));

        assert!(BackfillMode::ALL.selects(comment));
        assert!(BackfillMode::ALL.selects(feed));
        assert!(!BackfillMode::ALL.selects(plain));
        assert!(!BackfillMode::ALL.selects(""));
    }

    #[test]
    fn test_mode_range() {
        assert_eq!(BackfillMode::try_from(2u8), Ok(BackfillMode::FEED_MOVES));
        assert!(BackfillMode::try_from(4u8).is_err());
    }
}
