//! Session output targets.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::LineEnding;
use crate::error::{Result, SessionError};

/// Destination for session output.
///
/// Sessions are numbered from 1 and written in increasing order.
pub trait SessionSink {
    /// Create `count` empty sessions, discarding any previous content.
    fn prepare(&mut self, count: usize) -> Result<()>;

    /// Append one line to `session`.
    fn append(&mut self, session: usize, line: &str) -> Result<()>;

    /// Flush buffered output.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Comment block written at the top of every session.
pub fn session_header(session: usize) -> [String; 4] {
    [
        "; ************".to_string(),
        format!(";  Session {session:02}"),
        "; ***********".to_string(),
        ";".to_string(),
    ]
}

/// Output path of `session` for the given base name.
///
/// `print` becomes `print.Session01.gcode`.
pub fn session_path(base: &Path, session: usize) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".Session{session:02}.gcode"));
    PathBuf::from(name)
}

/// Base name for session files: the source path without its extension.
pub fn base_name(source: &Path) -> PathBuf {
    source.with_extension("")
}

/// Writes each session to `<base>.SessionNN.gcode`.
#[derive(Debug)]
pub struct FileSink {
    base: PathBuf,
    line_ending: LineEnding,
    current: Option<(usize, BufWriter<File>)>,
}

impl FileSink {
    /// Create a sink writing next to `base`.
    pub fn new(base: impl Into<PathBuf>, line_ending: LineEnding) -> Self {
        Self {
            base: base.into(),
            line_ending,
            current: None,
        }
    }

    /// Path of session file `session`.
    pub fn path(&self, session: usize) -> PathBuf {
        session_path(&self.base, session)
    }
}

impl SessionSink for FileSink {
    fn prepare(&mut self, count: usize) -> Result<()> {
        self.finish()?;
        let eol = self.line_ending.as_str();
        for session in 1..=count {
            let path = self.path(session);
            let mut header = String::new();
            for line in session_header(session) {
                header.push_str(&line);
                header.push_str(eol);
            }
            std::fs::write(&path, header).map_err(|e| SessionError::io(&path, e))?;
        }
        Ok(())
    }

    fn append(&mut self, session: usize, line: &str) -> Result<()> {
        let eol = self.line_ending.as_str();
        let path = self.path(session);
        let writer = match &mut self.current {
            Some((open, writer)) if *open == session => writer,
            _ => {
                self.finish()?;
                let file = OpenOptions::new()
                    .append(true)
                    .open(&path)
                    .map_err(|e| SessionError::io(&path, e))?;
                &mut self.current.insert((session, BufWriter::new(file))).1
            }
        };
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(eol.as_bytes()))
            .map_err(|e| SessionError::io(path, e))
    }

    fn finish(&mut self) -> Result<()> {
        if let Some((session, mut writer)) = self.current.take() {
            writer
                .flush()
                .map_err(|e| SessionError::io(self.path(session), e))?;
        }
        Ok(())
    }
}

/// Keeps sessions in memory, one line vector per session.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Lines of each session; index 0 is session 1.
    pub sessions: Vec<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of `session` (1-based), without the header.
    pub fn body(&self, session: usize) -> &[String] {
        &self.sessions[session - 1][session_header(session).len()..]
    }
}

impl SessionSink for MemorySink {
    fn prepare(&mut self, count: usize) -> Result<()> {
        self.sessions = (1..=count)
            .map(|session| session_header(session).to_vec())
            .collect();
        Ok(())
    }

    fn append(&mut self, session: usize, line: &str) -> Result<()> {
        let lines = session
            .checked_sub(1)
            .and_then(|i| self.sessions.get_mut(i))
            .ok_or_else(|| {
                SessionError::InvalidSettings(format!("session {session} was not prepared"))
            })?;
        lines.push(line.to_string());
        Ok(())
    }
}
