#![warn(missing_docs)]

//! Split a G-code print into height-bounded session files.
//!
//! A print is cut at one or more Z heights so it can be paused there, for a
//! filament swap, to embed an object, or to finish over several sittings.
//! Each session repeats the start code of the source file, adds
//! configurable pause/resume code, and replays recent comments and feed
//! rates so the machine resumes in the state it was left in.
//!
//! # Example
//!
//! ```no_run
//! use session_slicer::{split_file, SessionConfig, Thresholds};
//!
//! let config = SessionConfig::load("session-slicer.toml")?;
//! let report = split_file("benchy.gcode", Thresholds::parse(&["12.5", "30"])?, &config)?;
//! println!("wrote {} sessions", report.session_count());
//! # Ok::<(), session_slicer::SessionError>(())
//! ```

pub mod backfill;
pub mod boundary;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod flavor;
pub mod height;
pub mod sink;
pub mod template;

pub use backfill::{BackfillMode, Lookback, LOOKBACK_LEN};
pub use boundary::{resolve, Boundaries, LineCount};
pub use config::{LineEnding, SessionConfig};
pub use engine::{SessionBreak, SessionPlan, SliceReport, SlicingEngine, Thresholds};
pub use error::{Result, SessionError};
pub use flavor::GcodeFlavor;
pub use height::{analyze, HeightProfile};
pub use sink::{base_name, session_path, FileSink, MemorySink, SessionSink};
pub use template::ScaffoldTemplate;

use std::path::Path;

use tracing::{info, warn};

/// Read a G-code file into lines.
///
/// Invalid UTF-8 is replaced rather than rejected; only the command and
/// parameter letters matter for splitting.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| SessionError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Split `lines` into sessions written to `sink`.
///
/// This is the main entry point. It:
/// 1. Finds the printed object height and the last printed move
/// 2. Resolves automatic start/end line counts
/// 3. Runs the slicing engine over every line
pub fn split_sessions<L, K>(
    lines: &[L],
    thresholds: Thresholds,
    config: &SessionConfig,
    sink: &mut K,
) -> Result<SliceReport>
where
    L: AsRef<str>,
    K: SessionSink,
{
    let profile = analyze(lines);
    match &profile.height {
        Some(height) => info!(
            height = height.as_str(),
            last_draw_line = profile.draw_line_index,
            "detected object"
        ),
        None => warn!("no printed object detected"),
    }

    let boundaries = resolve(
        config.start_code_lines,
        config.end_code_lines,
        lines,
        profile.draw_line_index,
    )?;
    info!(
        start_lines = boundaries.start_lines,
        end_lines = boundaries.end_lines,
        "resolved scaffolding"
    );

    let plan = SessionPlan::new(boundaries, config);
    SlicingEngine::new(lines, thresholds, &plan, sink).run()
}

/// Split a G-code file into `<name>.SessionNN.gcode` files beside it.
pub fn split_file(
    path: impl AsRef<Path>,
    thresholds: Thresholds,
    config: &SessionConfig,
) -> Result<SliceReport> {
    let path = path.as_ref();
    let lines = read_lines(path)?;
    let mut sink = FileSink::new(base_name(path), config.line_ending);
    split_sessions(&lines, thresholds, config, &mut sink)
}
