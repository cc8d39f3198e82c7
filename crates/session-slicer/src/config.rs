//! Session slicing configuration.
//!
//! Read from TOML with the same keys the tool has always used:
//!
//! ```toml
//! startCodeLines = -1   # -1 = up to the first XYZ move
//! endCodeLines = -1     # -1 = everything after the last printed move
//! startCode = "M117 Session {S}|G1 Z{H+} F3000"
//! endCode = "G1 Z{H+} F3000|M84"
//! backupMode = 3        # 0 off, 1 comments, 2 feed moves, 3 both
//! flavor = "marlin"     # default start/end code when not given
//! lineEnding = "lf"     # or "crlf"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backfill::BackfillMode;
use crate::boundary::LineCount;
use crate::error::{Result, SessionError};
use crate::flavor::GcodeFlavor;
use crate::template::ScaffoldTemplate;

/// Line terminator written after every session line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Terminator text.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Options controlling how sessions are scaffolded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Lines from the top of the source repeated at the start of each new session.
    pub start_code_lines: LineCount,
    /// Extra code after the start lines. Falls back to the flavor preset.
    pub start_code: Option<ScaffoldTemplate>,
    /// Lines from the bottom of the source repeated at the end of each closed session.
    pub end_code_lines: LineCount,
    /// Extra code after the end lines. Falls back to the flavor preset.
    pub end_code: Option<ScaffoldTemplate>,
    /// Which lookback lines are replayed after a session break.
    pub backup_mode: BackfillMode,
    /// Printer firmware, used for default start/end code.
    pub flavor: GcodeFlavor,
    /// Line terminator for session files.
    pub line_ending: LineEnding,
}

impl SessionConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        BackfillMode::try_from(self.backup_mode.bits()).map_err(SessionError::InvalidSettings)?;
        Ok(())
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SessionError::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Start code, from the config or the flavor preset.
    pub fn start_template(&self) -> ScaffoldTemplate {
        self.start_code
            .clone()
            .unwrap_or_else(|| self.flavor.start_code())
    }

    /// End code, from the config or the flavor preset.
    pub fn end_template(&self) -> ScaffoldTemplate {
        self.end_code.clone().unwrap_or_else(|| self.flavor.end_code())
    }
}
