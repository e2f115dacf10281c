//! Mock upload handling for video, fNIRS and EEG files
//!
//! Uploads are copied under `<root>/<kind dir>/` with a timestamped name.
//! Tabular kinds get a shape summary when the file is a CSV.

use crate::{DuetError, Result};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Longest original filename accepted
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Timestamp layout embedded in stored filenames
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Kind of uploaded recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Video,
    Fnirs,
    Eeg,
}

impl UploadKind {
    pub const ALL: [UploadKind; 3] = [UploadKind::Video, UploadKind::Fnirs, UploadKind::Eeg];

    /// Subdirectory of the upload root
    pub fn dir_name(&self) -> &'static str {
        match self {
            UploadKind::Video => "videos",
            UploadKind::Fnirs => "fnirs",
            UploadKind::Eeg => "eeg",
        }
    }

    /// Prefix of stored filenames
    pub fn prefix(&self) -> &'static str {
        match self {
            UploadKind::Video => "video",
            UploadKind::Fnirs => "fnirs",
            UploadKind::Eeg => "eeg",
        }
    }

    /// Human-readable name used in transcript turns
    pub fn label(&self) -> &'static str {
        match self {
            UploadKind::Video => "video",
            UploadKind::Fnirs => "fNIRS data",
            UploadKind::Eeg => "EEG data",
        }
    }

    /// Whether uploads of this kind are inspected as tables
    pub fn is_tabular(&self) -> bool {
        !matches!(self, UploadKind::Video)
    }

    /// Status shown when the form was submitted without a file
    pub fn missing_notice(&self) -> String {
        format!("No {} uploaded", self.label())
    }
}

impl FromStr for UploadKind {
    type Err = DuetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "video" | "videos" => Ok(UploadKind::Video),
            "fnirs" => Ok(UploadKind::Fnirs),
            "eeg" => Ok(UploadKind::Eeg),
            other => Err(DuetError::validation(format!(
                "Unknown upload kind '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Shape inspection result of a tabular upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSummary {
    /// Data rows (header excluded) by header columns
    Shape { rows: usize, columns: usize },
    /// CSV that failed to parse
    Unparseable,
    /// Not a CSV file
    NotTabular,
}

impl fmt::Display for DataSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSummary::Shape { rows, columns } => {
                write!(f, "Data shape: {} rows x {} columns", rows, columns)
            }
            DataSummary::Unparseable => f.write_str("Could not parse CSV data"),
            DataSummary::NotTabular => f.write_str("Uploaded non-CSV data"),
        }
    }
}

/// Inspect an uploaded file; parse failures never escape
pub fn summarize_tabular(file_name: &str, bytes: &[u8]) -> DataSummary {
    let is_csv = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return DataSummary::NotTabular;
    }

    let mut reader = csv::Reader::from_reader(bytes);
    let columns = match reader.headers() {
        Ok(headers) if !headers.is_empty() => headers.len(),
        _ => return DataSummary::Unparseable,
    };
    let mut rows = 0;
    for record in reader.records() {
        if record.is_err() {
            return DataSummary::Unparseable;
        }
        rows += 1;
    }
    DataSummary::Shape { rows, columns }
}

/// Strip path components and unusual characters from a client filename
pub fn sanitize_filename(filename: &str) -> Result<String> {
    if filename.trim().is_empty() {
        return Err(DuetError::validation("Filename cannot be empty"));
    }
    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(DuetError::validation(format!(
            "Filename too long (max {} characters)",
            MAX_FILENAME_LENGTH
        )));
    }

    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let sanitized: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect();
    let sanitized = sanitized.trim().to_string();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return Err(DuetError::validation("Invalid filename after sanitization"));
    }
    Ok(sanitized)
}

/// `<prefix>_<YYYYMMDD_HHMMSS><.ext>`; the original extension keeps its case
pub fn stored_file_name(kind: UploadKind, original_name: &str, at: &DateTime<Local>) -> String {
    let suffix = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}_{}{}", kind.prefix(), at.format(TIMESTAMP_FORMAT), suffix)
}

/// A file copied into the upload tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub kind: UploadKind,
    pub file_name: String,
    pub path: PathBuf,
    pub size: usize,
}

/// Upload tree rooted at one directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding uploads of `kind`
    pub fn dir(&self, kind: UploadKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Create every kind directory
    pub async fn ensure_dirs(&self) -> Result<()> {
        for kind in UploadKind::ALL {
            tokio::fs::create_dir_all(self.dir(kind)).await?;
        }
        Ok(())
    }

    /// Store `bytes` under a name stamped with the current local time
    pub async fn save(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload> {
        self.save_at(kind, original_name, bytes, &Local::now()).await
    }

    /// Store `bytes` under a name stamped with `at`; same-second uploads overwrite
    pub async fn save_at(
        &self,
        kind: UploadKind,
        original_name: &str,
        bytes: &[u8],
        at: &DateTime<Local>,
    ) -> Result<StoredUpload> {
        let original = sanitize_filename(original_name)?;
        let file_name = stored_file_name(kind, &original, at);
        let dir = self.dir(kind);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DuetError::upload(format!("Cannot create {}: {}", dir.display(), e))
        })?;
        let path = dir.join(&file_name);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            DuetError::upload(format!("Cannot write {}: {}", path.display(), e))
        })?;

        info!(
            "UPLOAD_SAVED kind={} file={} bytes={}",
            kind,
            file_name,
            bytes.len()
        );
        Ok(StoredUpload {
            kind,
            file_name,
            path,
            size: bytes.len(),
        })
    }
}
