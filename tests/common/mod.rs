#![allow(dead_code)]

use anyhow::Result;
use chrono::{Local, NaiveDate, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

/// RFC 3339 timestamp for a local wall-clock time on `date`
pub fn local_ts(date: NaiveDate, h: u32, m: u32, s: u32) -> String {
    Local
        .from_local_datetime(&date.and_hms_opt(h, m, s).unwrap())
        .earliest()
        .unwrap()
        .to_rfc3339()
}

/// Create `<root>/projects/<project>/<file>` with the given lines
pub fn write_log(root: &Path, project: &str, file: &str, lines: &[String]) -> Result<PathBuf> {
    let dir = root.join("projects").join(project);
    fs::create_dir_all(&dir)?;
    let path = dir.join(file);
    fs::write(&path, lines.join("\n"))?;
    Ok(path)
}

/// A temp dir laid out like `~/.claude`
pub fn setup_claude_root() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join(".claude");
    fs::create_dir_all(root.join("projects"))?;
    Ok((temp_dir, root))
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
