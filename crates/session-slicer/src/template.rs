//! Start/end code templates.
//!
//! Placeholders:
//! - `{S}` session number, zero padded to two digits
//! - `{H}` current height
//! - `{H+}` current height plus [`HEIGHT_CLEARANCE`]
//! - `|` line break

use serde::{Deserialize, Serialize};

/// Offset added to the current height for `{H+}` (mm).
pub const HEIGHT_CLEARANCE: f64 = 5.0;

/// Caller-supplied scaffolding text with per-session placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaffoldTemplate(String);

impl ScaffoldTemplate {
    /// Wrap raw template text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Raw template text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute placeholders and split into output lines.
    ///
    /// An empty template renders as a single empty line.
    pub fn render(&self, session: usize, height: f64) -> Vec<String> {
        let text = self
            .0
            .replace("{S}", &format!("{session:02}"))
            .replace("{H+}", &(height + HEIGHT_CLEARANCE).to_string())
            .replace("{H}", &height.to_string());
        text.split('|').map(str::to_string).collect()
    }
}

impl From<&str> for ScaffoldTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let t = ScaffoldTemplate::new("M117 Session {S}|G1 Z{H+} F600|;at {H}");
        assert_eq!(
            t.render(3, 10.0),
            vec!["M117 Session 03", "G1 Z15 F600", ";at 10"]
        );
    }

    #[test]
    fn test_render_fractional_height() {
        let t = ScaffoldTemplate::new("{H}");
        assert_eq!(t.render(1, 5.25), vec!["5.25"]);
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(ScaffoldTemplate::default().render(2, 1.0), vec![""]);
    }

    #[test]
    fn test_two_digit_session() {
        let t = ScaffoldTemplate::from("{S}");
        assert_eq!(t.render(12, 0.0), vec!["12"]);
    }
}
