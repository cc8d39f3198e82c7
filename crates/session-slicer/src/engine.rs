//! Session slicing state machine.
//!
//! The engine walks the G-code once. Until the first heat-wait command it
//! only copies lines into session 1, so homing and priming moves never end a
//! session. Afterwards every Z move is compared against the next session
//! height; when it is exceeded the current session is closed with the end
//! scaffolding and the new one is opened with the start scaffolding and a
//! backfill of recent lines. The Z move that crossed the height is the first
//! regular line of the new session.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::backfill::{BackfillMode, Lookback};
use crate::boundary::Boundaries;
use crate::classify::{is_heat_wait, moves_with_z, parse_height};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::sink::SessionSink;
use crate::template::ScaffoldTemplate;

/// Width of the marker comments, including the leading `; `.
const MARKER_WIDTH: usize = 82;

fn marker(label: &str) -> String {
    let head = format!("; ---{label}");
    let fill = MARKER_WIDTH.saturating_sub(head.len());
    head + &"-".repeat(fill)
}

fn rule() -> String {
    marker("")
}

/// Session end heights still ahead of the print head.
///
/// The final session has no end height: it is bounded by [`Thresholds::SENTINEL`],
/// which no real print reaches, so it absorbs every remaining line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thresholds {
    pending: VecDeque<f64>,
}

impl Thresholds {
    /// Height of the implicit final boundary (mm).
    pub const SENTINEL: f64 = 9999.0;

    /// Build from session end heights in print order.
    pub fn new(heights: impl IntoIterator<Item = f64>) -> Self {
        let pending: VecDeque<f64> = heights.into_iter().collect();
        if pending.iter().zip(pending.iter().skip(1)).any(|(a, b)| b < a) {
            warn!(?pending, "session heights are not ascending");
        }
        Self { pending }
    }

    /// Parse session end heights from text such as command line arguments.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let heights = args
            .iter()
            .map(|arg| {
                let arg = arg.as_ref();
                arg.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|h| h.is_finite())
                    .ok_or_else(|| SessionError::InvalidThreshold(arg.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(heights))
    }

    /// Number of sessions these heights produce.
    pub fn session_count(&self) -> usize {
        self.pending.len() + 1
    }

    /// Height the current session ends at.
    pub fn next(&self) -> f64 {
        self.pending.front().copied().unwrap_or(Self::SENTINEL)
    }

    /// Whether `height` ends the current session.
    pub fn crossed_by(&self, height: f64) -> bool {
        self.pending.front().is_some_and(|&limit| height > limit)
    }

    /// Consume the height that was just crossed.
    fn advance(&mut self) -> Option<f64> {
        self.pending.pop_front()
    }
}

/// Everything the engine writes around a session break.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    /// Resolved start/end line counts.
    pub boundaries: Boundaries,
    /// Code after the start lines of each new session.
    pub start_code: ScaffoldTemplate,
    /// Code after the end lines of each closed session.
    pub end_code: ScaffoldTemplate,
    /// Backfill selection.
    pub backfill: BackfillMode,
}

impl SessionPlan {
    /// Combine resolved boundaries with the configured templates.
    pub fn new(boundaries: Boundaries, config: &SessionConfig) -> Self {
        Self {
            boundaries,
            start_code: config.start_template(),
            end_code: config.end_template(),
            backfill: config.backup_mode,
        }
    }
}

/// A point where one session ended and the next began.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBreak {
    /// Number of the session that was opened.
    pub session: usize,
    /// Index of the source line that crossed the height.
    pub line: usize,
    /// Height of that line.
    pub height: f64,
    /// Session end height that was exceeded.
    pub threshold: f64,
}

/// Summary of a slicing run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceReport {
    /// Source lines copied into each session; index 0 is session 1.
    pub lines_per_session: Vec<usize>,
    /// Session breaks in print order.
    pub breaks: Vec<SessionBreak>,
}

impl SliceReport {
    /// Number of sessions written, including empty trailing ones.
    pub fn session_count(&self) -> usize {
        self.lines_per_session.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Before the first heat-wait command; Z moves are not checked.
    AwaitingHeat,
    /// Z moves are compared against the session heights.
    Active,
}

/// Single-pass splitter of a G-code line stream into sessions.
pub struct SlicingEngine<'a, L, K> {
    lines: &'a [L],
    plan: &'a SessionPlan,
    sink: &'a mut K,
    thresholds: Thresholds,
    lookback: Lookback<'a>,
    phase: Phase,
    session: usize,
    height: f64,
    report: SliceReport,
}

impl<'a, L: AsRef<str>, K: SessionSink> SlicingEngine<'a, L, K> {
    /// Create an engine over `lines` writing to `sink`.
    pub fn new(
        lines: &'a [L],
        thresholds: Thresholds,
        plan: &'a SessionPlan,
        sink: &'a mut K,
    ) -> Self {
        Self {
            lines,
            plan,
            sink,
            report: SliceReport {
                lines_per_session: vec![0; thresholds.session_count()],
                breaks: Vec::new(),
            },
            thresholds,
            lookback: Lookback::new(),
            phase: Phase::AwaitingHeat,
            session: 1,
            height: 0.0,
        }
    }

    /// Prepare the sink, split every line and flush.
    pub fn run(mut self) -> Result<SliceReport> {
        self.sink.prepare(self.thresholds.session_count())?;
        let lines = self.lines;
        for (index, line) in lines.iter().enumerate() {
            self.step(index, line.as_ref())?;
        }
        self.sink.finish()?;
        info!(
            sessions = self.report.session_count(),
            breaks = self.report.breaks.len(),
            "slicing complete"
        );
        Ok(self.report)
    }

    fn step(&mut self, index: usize, line: &'a str) -> Result<()> {
        if self.phase == Phase::AwaitingHeat && is_heat_wait(line) {
            debug!(line = index, "heat-wait seen, height checks enabled");
            self.phase = Phase::Active;
        }

        if self.phase == Phase::Active && moves_with_z(line) {
            self.height = parse_height(line, index)?;
            if self.thresholds.crossed_by(self.height) {
                self.start_next_session(index)?;
            }
            info!(
                session = self.session,
                height = self.height,
                next = self.thresholds.next(),
                "progress"
            );
        }

        self.lookback.push(line);
        self.emit(line)?;
        self.report.lines_per_session[self.session - 1] += 1;
        Ok(())
    }

    fn emit(&mut self, line: &str) -> Result<()> {
        self.sink.append(self.session, line)
    }

    fn emit_all<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.emit(line.as_ref())?;
        }
        Ok(())
    }

    fn start_next_session(&mut self, index: usize) -> Result<()> {
        let Boundaries {
            start_lines,
            end_lines,
        } = self.plan.boundaries;
        let lines = self.lines;
        let plan = self.plan;
        let height = self.height;

        // Close the current session.
        self.emit(&marker("END LINES"))?;
        self.emit_all(&lines[lines.len() - end_lines..])?;
        self.emit(&marker("END CODE"))?;
        self.emit_all(plan.end_code.render(self.session, height))?;
        self.emit(&rule())?;

        let threshold = self.thresholds.advance().unwrap_or(Thresholds::SENTINEL);
        self.session += 1;
        info!(
            session = self.session,
            line = index,
            height,
            threshold,
            "starting new session"
        );
        self.report.breaks.push(SessionBreak {
            session: self.session,
            line: index,
            height,
            threshold,
        });

        // Open the next one.
        self.emit(&marker("START LINES"))?;
        self.emit_all(&lines[..start_lines])?;
        self.emit(&marker("START CODE"))?;
        self.emit_all(plan.start_code.render(self.session, height))?;
        self.emit(&marker("BACK FILL"))?;
        for entry in self.lookback.drain() {
            if plan.backfill.selects(entry) {
                self.emit(entry)?;
            }
        }
        self.emit(&rule())
    }
}
