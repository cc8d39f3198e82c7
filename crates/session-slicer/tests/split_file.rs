//! End-to-end splitting of G-code files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use session_slicer::{
    read_lines, session_path, split_file, BackfillMode, LineCount, SessionConfig, SessionError,
    ScaffoldTemplate, Thresholds,
};

/// A small print: start code, three printed layers, travel away, end code.
fn sample_gcode() -> String {
    let mut lines = vec![
        "; generated for tests".to_string(),
        "G28".to_string(),
        "G1 Z15 F3000".to_string(),
        "M109 S210".to_string(),
        "G92 E0".to_string(),
    ];
    for (layer, z) in ["0.2", "4.2", "8.2"].iter().enumerate() {
        lines.push(format!(";LAYER:{layer}"));
        lines.push(format!("G1 X10 Y10 Z{z} F1200"));
        for i in 0..4 {
            lines.push(format!("G1 X{} Y{} E{}", 20 + i, 20 + i, i));
        }
        lines.push("G1 F1800".to_string());
    }
    lines.push("G1 X0 Y200 Z20 F3000".to_string());
    lines.push("M104 S0".to_string());
    lines.push("M84".to_string());
    lines.join("\n") + "\n"
}

fn write_sample(dir: &Path) -> PathBuf {
    let path = dir.join("part.gcode");
    fs::write(&path, sample_gcode()).unwrap();
    path
}

fn config() -> SessionConfig {
    SessionConfig {
        start_code: Some(ScaffoldTemplate::new("M117 Resume {S}")),
        end_code: Some(ScaffoldTemplate::new("M117 Pause {S} at {H}")),
        ..Default::default()
    }
}

fn session_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.contains(".Session"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_one_file_per_threshold_plus_final() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());

    let report = split_file(&path, Thresholds::parse(&["3.0", "6.0"]).unwrap(), &config())
        .unwrap();

    assert_eq!(report.session_count(), 3);
    assert_eq!(
        session_files(dir.path()),
        vec![
            "part.Session01.gcode",
            "part.Session02.gcode",
            "part.Session03.gcode"
        ]
    );
    assert_eq!(report.breaks.len(), 2);

    let total: usize = report.lines_per_session.iter().sum();
    assert_eq!(total, read_lines(&path).unwrap().len());
}

#[test]
fn test_unused_thresholds_still_create_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());

    let report = split_file(
        &path,
        Thresholds::parse(&["50", "60", "70"]).unwrap(),
        &config(),
    )
    .unwrap();

    assert!(report.breaks.is_empty());
    assert_eq!(session_files(dir.path()).len(), 4);
    let last = fs::read_to_string(session_path(&dir.path().join("part"), 4)).unwrap();
    assert_eq!(last.lines().count(), 4);
}

#[test]
fn test_rerun_overwrites_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());
    let base = dir.path().join("part");

    let run = || {
        split_file(&path, Thresholds::parse(&["3.0"]).unwrap(), &config()).unwrap();
        (1..=2)
            .map(|s| fs::read_to_string(session_path(&base, s)).unwrap())
            .collect::<Vec<_>>()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn test_session_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());
    let base = dir.path().join("part");

    split_file(&path, Thresholds::parse(&["3.0"]).unwrap(), &config()).unwrap();

    let first = fs::read_to_string(session_path(&base, 1)).unwrap();
    let first: Vec<&str> = first.lines().collect();
    assert_eq!(first[1], ";  Session 01");
    // Pre-heat lift to Z15 stays in session 1 without ending it.
    assert!(first.contains(&"G1 Z15 F3000"));
    assert!(first.contains(&"M117 Pause 01 at 4.2"));
    assert!(!first.contains(&"G1 X10 Y10 Z4.2 F1200"));
    // Automatic end lines: everything after the last printed move.
    let end = first
        .iter()
        .position(|l| l.starts_with("; ---END LINES"))
        .unwrap();
    assert_eq!(
        first[end + 1..end + 5],
        ["G1 F1800", "G1 X0 Y200 Z20 F3000", "M104 S0", "M84"]
    );

    let second = fs::read_to_string(session_path(&base, 2)).unwrap();
    let second: Vec<&str> = second.lines().collect();
    // Automatic start lines: everything before the first XYZ move.
    let start = second
        .iter()
        .position(|l| l.starts_with("; ---START LINES"))
        .unwrap();
    assert_eq!(second[start + 1], "; generated for tests");
    assert_eq!(second[start + 6], ";LAYER:0");
    assert!(second[start + 7].starts_with("; ---START CODE"));
    assert!(second.contains(&"M117 Resume 02"));

    let fill = second
        .iter()
        .position(|l| l.starts_with("; ---BACK FILL"))
        .unwrap();
    assert_eq!(second[fill + 1..fill + 3], ["G1 F1800", ";LAYER:1"]);
    assert_eq!(second.last(), Some(&"M84"));
}

#[test]
fn test_backfill_comments_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample(dir.path());
    let base = dir.path().join("part");

    let config = SessionConfig {
        backup_mode: BackfillMode::COMMENTS,
        start_code_lines: LineCount::Fixed(0),
        end_code_lines: LineCount::Fixed(0),
        ..config()
    };
    split_file(&path, Thresholds::parse(&["3.0"]).unwrap(), &config).unwrap();

    let second = fs::read_to_string(session_path(&base, 2)).unwrap();
    let lines: Vec<&str> = second.lines().collect();
    let fill = lines
        .iter()
        .position(|l| l.starts_with("; ---BACK FILL"))
        .unwrap();
    assert_eq!(lines[fill + 1], ";LAYER:1");
    assert!(lines[fill + 2].starts_with("; -----"));
}

#[test]
fn test_bad_threshold() {
    let err = Thresholds::parse(&["3.0", "abc"]).unwrap_err();
    assert!(matches!(err, SessionError::InvalidThreshold(_)));

    let err = Thresholds::parse(&["nan", "3.0"]).unwrap_err();
    assert!(matches!(err, SessionError::InvalidThreshold(ref s) if s == "nan"));
}

#[test]
fn test_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let err = split_file(
        dir.path().join("missing.gcode"),
        Thresholds::default(),
        &config(),
    )
    .unwrap_err();
    assert!(matches!(err, SessionError::Io { .. }));
}
