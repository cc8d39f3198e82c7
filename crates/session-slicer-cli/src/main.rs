//! session-slicer CLI - split a G-code print into pausable sessions
//!
//! `session-slicer part.gcode 12.5 30` writes `part.Session01.gcode` (up to
//! Z 12.5), `part.Session02.gcode` (up to Z 30) and `part.Session03.gcode`
//! (the rest) next to the input.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use session_slicer::{analyze, read_lines, split_file, SessionConfig, Thresholds};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "session-slicer.toml";

/// Exit code when no G-code file is given.
const EXIT_USAGE: u8 = 128;
/// Exit code when only the G-code file is given (height query).
const EXIT_HEIGHT_ONLY: u8 = 129;

#[derive(Parser)]
#[command(name = "session-slicer")]
#[command(about = "Split a G-code print into sessions at the given Z heights", long_about = None)]
struct Cli {
    /// G-code file to split
    gcode_file: Option<PathBuf>,

    /// Session end heights in mm, ascending
    heights: Vec<String>,

    /// Configuration file (default: ./session-slicer.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also log debug detail
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors (hides per-Z progress)
    #[arg(short, long)]
    quiet: bool,
}

/// What a parsed command line asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Invocation<'a> {
    /// No G-code file: print usage.
    Usage,
    /// File but no heights: print usage and the object height.
    HeightQuery(&'a Path),
    /// Split the file at the given heights.
    Split {
        gcode_file: &'a Path,
        heights: &'a [String],
    },
}

impl<'a> Invocation<'a> {
    fn from_cli(cli: &'a Cli) -> Self {
        match (&cli.gcode_file, cli.heights.as_slice()) {
            (None, _) => Invocation::Usage,
            (Some(file), []) => Invocation::HeightQuery(file),
            (Some(file), heights) => Invocation::Split {
                gcode_file: file,
                heights,
            },
        }
    }

    /// Process exit code when the invocation stops without splitting.
    fn exit_code(self) -> u8 {
        match self {
            Invocation::Usage => EXIT_USAGE,
            Invocation::HeightQuery(_) => EXIT_HEIGHT_ONLY,
            Invocation::Split { .. } => 0,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let invocation = Invocation::from_cli(&cli);
    let Invocation::Split {
        gcode_file,
        heights,
    } = invocation
    else {
        print_usage()?;
        if let Invocation::HeightQuery(gcode_file) = invocation {
            show_height(gcode_file)?;
        }
        return Ok(ExitCode::from(invocation.exit_code()));
    };

    let config = load_config(cli.config.as_deref())?;
    let thresholds = Thresholds::parse(heights)?;
    let report = split_file(gcode_file, thresholds, &config)
        .with_context(|| format!("failed to split {}", gcode_file.display()))?;

    for (i, lines) in report.lines_per_session.iter().enumerate() {
        println!("Session {:02}: {} lines", i + 1, lines);
    }
    for b in &report.breaks {
        println!(
            "Session {:02} starts at line {} (Z {} > {})",
            b.session,
            b.line + 1,
            b.height,
            b.threshold
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn print_usage() -> Result<()> {
    let mut cmd = Cli::command();
    cmd.print_help()?;
    println!();
    Ok(())
}

fn show_height(gcode_file: &Path) -> Result<()> {
    let lines = read_lines(gcode_file)?;
    let profile = analyze(&lines);
    match profile.height {
        Some(height) => println!(
            "Print '{}' has a maximum height of {}",
            gcode_file.display(),
            height
        ),
        None => println!("Print '{}' has no detectable printed layers", gcode_file.display()),
    }
    println!();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let config = match path {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => SessionConfig::load(DEFAULT_CONFIG)?,
        None => SessionConfig::default(),
    };
    Ok(config)
}
