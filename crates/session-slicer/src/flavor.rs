//! Firmware flavor presets for session scaffolding.

use serde::{Deserialize, Serialize};

use crate::template::ScaffoldTemplate;

/// G-code flavor (dialect) of the target printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GcodeFlavor {
    /// Marlin firmware (Ender, Prusa).
    #[default]
    Marlin,
    /// Klipper firmware.
    Klipper,
    /// Bambu Lab printers.
    Bambu,
    /// RepRap firmware.
    RepRap,
}

impl GcodeFlavor {
    /// Default code appended after the end lines of a closed session.
    ///
    /// Lifts the nozzle clear of the print so the part can be inspected or
    /// loaded before the next session is started.
    pub fn end_code(&self) -> ScaffoldTemplate {
        ScaffoldTemplate::new(match self {
            GcodeFlavor::Marlin => {
                "M117 Session {S} done at Z{H}|G90|G1 Z{H+} F3000 ; Clear the print|M84 ; Disable motors"
            }
            GcodeFlavor::Klipper => {
                "RESPOND MSG=\"Session {S} done at Z{H}\"|G90|G1 Z{H+} F3000|TURN_OFF_HEATERS|M84"
            }
            GcodeFlavor::Bambu => {
                "M400 ; Wait for moves|G90|G1 Z{H+} F3000|M104 S0|M140 S0|M84"
            }
            GcodeFlavor::RepRap => "G90|G1 Z{H+} F3000|M104 S0|M140 S0|M84",
        })
    }

    /// Default code inserted after the start lines of a new session.
    ///
    /// The start lines have homed the printer; this restores absolute
    /// extrusion and approaches the resume height from above.
    pub fn start_code(&self) -> ScaffoldTemplate {
        ScaffoldTemplate::new(match self {
            GcodeFlavor::Marlin => {
                "M117 Session {S} from Z{H}|G90|G1 Z{H+} F3000 ; Approach from above|G92 E0"
            }
            GcodeFlavor::Klipper => {
                "RESPOND MSG=\"Session {S} from Z{H}\"|G90|G1 Z{H+} F3000|G92 E0"
            }
            GcodeFlavor::Bambu | GcodeFlavor::RepRap => "G90|G1 Z{H+} F3000|G92 E0",
        })
    }
}
