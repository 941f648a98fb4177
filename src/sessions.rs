//! Append-only CSV log of completed games.
//!
//! One row per game, `timestamp,score,duration_seconds`. The header is
//! written when the file is first created. Rows that fail to parse are
//! skipped on read, so a hand-edited or truncated log still loads.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCORE_COLUMN: &str = "score";
const DURATION_COLUMN: &str = "duration_seconds";
const TIMESTAMP_COLUMN: &str = "timestamp";

/// Column order of a freshly created log.
const COLUMNS: [&str; 3] = [TIMESTAMP_COLUMN, SCORE_COLUMN, DURATION_COLUMN];

/// One completed game.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Local time the game ended. `None` when a logged value was unreadable.
    pub timestamp: Option<NaiveDateTime>,
    pub score: u32,
    pub duration_seconds: f64,
}

impl SessionRecord {
    /// Record for a game that just ended, stamped with the local time.
    pub fn new(score: u32, duration: Duration) -> Self {
        Self::at(Local::now().naive_local(), score, duration)
    }

    pub fn at(timestamp: NaiveDateTime, score: u32, duration: Duration) -> Self {
        Self {
            timestamp: Some(timestamp),
            score,
            duration_seconds: round_centis(duration.as_secs_f64()),
        }
    }

    /// Value for one log column; unknown columns are blank.
    fn field(&self, column: &str) -> String {
        match column {
            TIMESTAMP_COLUMN => self
                .timestamp
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            SCORE_COLUMN => self.score.to_string(),
            DURATION_COLUMN => format_duration(self.duration_seconds),
            _ => String::new(),
        }
    }
}

/// Always keeps a decimal point, so `20` is written as `20.0`.
fn format_duration(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{secs:.1}")
    } else {
        secs.to_string()
    }
}

fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// A row as it appears on disk, before validation.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    timestamp: String,
    score: String,
    duration_seconds: String,
}

impl RawRow {
    fn into_record(self) -> std::result::Result<SessionRecord, String> {
        let score = parse_score(&self.score).ok_or_else(|| format!("bad score {:?}", self.score))?;
        let duration_seconds = parse_duration(&self.duration_seconds)
            .ok_or_else(|| format!("bad duration {:?}", self.duration_seconds))?;
        let timestamp =
            NaiveDateTime::parse_from_str(self.timestamp.trim(), TIMESTAMP_FORMAT).ok();
        Ok(SessionRecord {
            timestamp,
            score,
            duration_seconds,
        })
    }
}

/// Non-negative whole number; `"7.0"` is accepted, `"7.5"` is not.
fn parse_score(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX)).then_some(f as u32)
}

fn parse_duration(s: &str) -> Option<f64> {
    let f = s.trim().parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0).then_some(f)
}

/// Handle on the session log file.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the file is new or empty.
    ///
    /// An existing file keeps its own column order; columns the log does
    /// not know are left blank.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, file or row cannot be written, or
    /// the existing header lacks the `score` or `duration_seconds` column.
    pub fn append(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let existing = if file.metadata()?.len() == 0 {
            None
        } else {
            let headers = self.read_headers()?;
            if !self.ends_with_newline()? {
                file.write_all(b"\n")?;
            }
            headers
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        let columns = match existing {
            Some(headers) => headers,
            None => {
                let headers = csv::StringRecord::from(COLUMNS.to_vec());
                writer.write_record(&headers)?;
                headers
            }
        };
        writer.write_record(columns.iter().map(|column| record.field(column)))?;
        writer.flush()?;

        info!(
            score = record.score,
            duration_seconds = record.duration_seconds,
            path = %self.path.display(),
            "game logged"
        );
        Ok(())
    }

    /// Header of a non-empty log, checked for the required columns.
    /// `None` when the first line is blank.
    fn read_headers(&self) -> Result<Option<csv::StringRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(File::open(&self.path)?);
        let headers = reader.headers()?.clone();
        if headers.iter().all(str::is_empty) {
            return Ok(None);
        }
        self.check_columns(&headers)?;
        Ok(Some(headers))
    }

    fn ends_with_newline(&self) -> Result<bool> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }

    fn check_columns(&self, headers: &csv::StringRecord) -> Result<()> {
        for column in [SCORE_COLUMN, DURATION_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(Error::malformed_log(
                    &self.path,
                    format!("missing column `{column}`"),
                ));
            }
        }
        Ok(())
    }

    /// Read every valid record in file order.
    ///
    /// A missing or empty file yields no records. Rows with an unreadable
    /// score or duration are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its header lacks the
    /// `score` or `duration_seconds` column.
    pub fn read_all(&self) -> Result<Vec<SessionRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session log yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.iter().all(str::is_empty) {
            return Ok(Vec::new());
        }
        self.check_columns(&headers)?;

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<RawRow>().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line = i + 2;
            match row.map_err(|e| e.to_string()).and_then(RawRow::into_record) {
                Ok(record) => records.push(record),
                Err(reason) => warn!(line, %reason, "skipping session log row"),
            }
        }
        Ok(records)
    }

    /// [`read_all`](Self::read_all), treating any failure as an empty log.
    pub fn read_all_or_empty(&self) -> Vec<SessionRecord> {
        self.read_all().unwrap_or_else(|e| {
            warn!(error = %e, "could not load session log, showing empty statistics");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn duration_is_rounded_to_centiseconds() {
        let r = SessionRecord::at(at(14, 3, 11), 7, Duration::from_millis(12_437));
        assert_eq!(r.duration_seconds, 12.44);
    }

    #[test]
    fn first_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("data").join("game_log.csv"));

        log.append(&SessionRecord::at(at(14, 3, 11), 7, Duration::from_millis(12_430)))
            .unwrap();
        log.append(&SessionRecord::at(at(14, 5, 0), 12, Duration::from_secs(20)))
            .unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "timestamp,score,duration_seconds",
                "2025-06-01 14:03:11,7,12.43",
                "2025-06-01 14:05:00,12,20.0",
            ]
        );
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("absent.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(&path, "").unwrap();
        assert!(SessionLog::new(path).read_all().unwrap().is_empty());
    }

    #[test]
    fn header_only_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(&path, "timestamp,score,duration_seconds\n").unwrap();
        assert!(SessionLog::new(path).read_all().unwrap().is_empty());
    }

    #[test]
    fn bad_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(
            &path,
            "timestamp,score,duration_seconds\n\
             2025-06-01 14:03:11,7,12.43\n\
             2025-06-01 14:04:00,oops,3.0\n\
             2025-06-01 14:05:00,4,\n\
             2025-06-01 14:06:00,-3,2.0\n\
             2025-06-01 14:07:00,2.5,2.0\n\
             2025-06-01 14:08:00,5\n\
             not a date,9.0,8.5\n",
        )
        .unwrap();

        let records = SessionLog::new(path).read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].score, 7);
        assert_eq!(records[0].timestamp, Some(at(14, 3, 11)));
        assert_eq!(records[1].score, 9);
        assert_eq!(records[1].duration_seconds, 8.5);
        assert_eq!(records[1].timestamp, None);
    }

    #[test]
    fn columns_may_be_reordered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(&path, "score,duration_seconds\n3,1.5\n").unwrap();
        let records = SessionLog::new(path).read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 3);
        assert_eq!(records[0].timestamp, None);
    }

    #[test]
    fn append_follows_existing_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(&path, "score,duration_seconds\n3,1.5").unwrap();
        let log = SessionLog::new(&path);

        log.append(&SessionRecord::at(at(9, 0, 0), 7, Duration::from_secs(12)))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "score,duration_seconds\n3,1.5\n7,12.0\n");
        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].score, 7);
        assert_eq!(records[1].duration_seconds, 12.0);
    }

    #[test]
    fn append_fills_reordered_and_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(&path, "duration_seconds,note,timestamp,score\n").unwrap();
        let log = SessionLog::new(&path);

        log.append(&SessionRecord::at(at(14, 3, 11), 4, Duration::from_millis(2_500)))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("\n2.5,,2025-06-01 14:03:11,4\n"));
        let records = log.read_all().unwrap();
        assert_eq!(records, [SessionRecord::at(at(14, 3, 11), 4, Duration::from_millis(2_500))]);
    }

    #[test]
    fn append_refuses_a_foreign_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(&path, "when,points\n2025-06-01,3\n").unwrap();
        let log = SessionLog::new(&path);

        let err = log.append(&SessionRecord::new(1, Duration::from_secs(1)));
        assert!(matches!(err, Err(Error::MalformedLog { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "when,points\n2025-06-01,3\n");
    }

    #[test]
    fn missing_column_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_log.csv");
        fs::write(&path, "when,points\n2025-06-01,3\n").unwrap();
        let log = SessionLog::new(path);
        assert!(matches!(log.read_all(), Err(Error::MalformedLog { .. })));
        assert!(log.read_all_or_empty().is_empty());
    }

    #[test]
    fn parse_score_accepts_whole_floats() {
        assert_eq!(parse_score("7"), Some(7));
        assert_eq!(parse_score(" 7.0 "), Some(7));
        assert_eq!(parse_score("7.5"), None);
        assert_eq!(parse_score("-1"), None);
        assert_eq!(parse_score("NaN"), None);
    }
}
