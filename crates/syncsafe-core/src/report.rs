use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Renamed,
    Unchanged,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "dir"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub date: String,
    pub time: String,
    pub action: Action,
    pub parent: String,
    pub old_name: String,
    pub new_name: String,
    pub kind: EntryKind,
}

impl Record {
    pub fn now(
        action: Action,
        parent: &Path,
        old_name: &str,
        new_name: &str,
        kind: EntryKind,
    ) -> Self {
        let now = Local::now();
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S%.3f").to_string(),
            action,
            parent: parent.display().to_string(),
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub records: Vec<Record>,
    pub files_processed: usize,
    pub dirs_processed: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        match record.action {
            Action::Renamed => self.renamed += 1,
            Action::Unchanged => self.unchanged += 1,
            Action::Failed => self.failed += 1,
        }
        self.records.push(record);
    }

    pub fn renamed_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.action == Action::Renamed)
    }

    pub fn failed_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.action == Action::Failed)
    }

    /// Serializes every record to `path` as CSV. When the primary path cannot
    /// be written (locked or otherwise occupied), retries once on a derived
    /// fallback name. Returns the path actually written.
    pub fn write_csv_with_fallback(&self, path: &Path) -> anyhow::Result<PathBuf> {
        match self.write_csv(path) {
            Ok(()) => Ok(path.to_path_buf()),
            Err(primary_err) => {
                let fallback = fallback_path(path);
                warn!(
                    "Could not write log to {:?} ({}), falling back to {:?}",
                    path, primary_err, fallback
                );
                self.write_csv(&fallback).map_err(|fallback_err| {
                    anyhow::anyhow!(
                        "failed to write log to {:?} ({}) and to fallback {:?} ({})",
                        path,
                        primary_err,
                        fallback,
                        fallback_err
                    )
                })?;
                Ok(fallback)
            }
        }
    }

    fn write_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn fallback_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("logfile");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.fallback.{}", stem, ext),
        None => format!("{}.fallback", stem),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_report() -> RunReport {
        let mut report = RunReport::new();
        report.push(Record::now(
            Action::Renamed,
            Path::new("/data"),
            "a:b.txt",
            "a-b.txt",
            EntryKind::File,
        ));
        report.push(Record::now(
            Action::Unchanged,
            Path::new("/data"),
            "ok.txt",
            "ok.txt",
            EntryKind::File,
        ));
        report
    }

    #[test]
    fn test_push_updates_counts() {
        let report = sample_report();
        assert_eq!(report.renamed, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.renamed_records().count(), 1);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logfile.csv");

        let written = sample_report().write_csv_with_fallback(&log).unwrap();
        assert_eq!(written, log);

        let contents = fs::read_to_string(&log).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,time,action,parent,old_name,new_name,kind"
        );
        assert!(contents.contains("renamed,/data,a:b.txt,a-b.txt,file"));
        assert!(contents.contains("unchanged,/data,ok.txt,ok.txt,file"));
    }

    #[test]
    fn test_csv_quotes_embedded_delimiters() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logfile.csv");

        let mut report = RunReport::new();
        report.push(Record::now(
            Action::Renamed,
            Path::new("/data"),
            "last, first.txt",
            "last, first.txt1",
            EntryKind::File,
        ));
        report.write_csv_with_fallback(&log).unwrap();

        let contents = fs::read_to_string(&log).unwrap();
        assert!(contents.contains("\"last, first.txt\""));
        assert!(contents.contains("\"last, first.txt1\""));
    }

    #[test]
    fn test_fallback_when_primary_is_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        // Occupy the primary path with a directory so it cannot be opened
        // as a file.
        let log = dir.path().join("logfile.csv");
        fs::create_dir(&log).unwrap();

        let written = sample_report().write_csv_with_fallback(&log).unwrap();
        assert_eq!(written, dir.path().join("logfile.fallback.csv"));
        assert!(fs::read_to_string(&written).unwrap().contains("renamed"));
    }

    #[test]
    fn test_fallback_path_without_extension() {
        assert_eq!(
            fallback_path(Path::new("/tmp/runlog")),
            PathBuf::from("/tmp/runlog.fallback")
        );
        assert_eq!(
            fallback_path(Path::new("logfile.csv")),
            PathBuf::from("logfile.fallback.csv")
        );
    }

    #[test]
    fn test_error_when_fallback_also_unwritable() {
        let result = sample_report()
            .write_csv_with_fallback(Path::new("/nonexistent-dir/logfile.csv"));
        assert!(result.is_err());
    }
}
