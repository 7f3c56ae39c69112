//! Public and internal types for the photocat API and pipeline.

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::utils::config::{
    DEFAULT_BACKUP_STATUS, ExternalToolConsts, IMAGE_EXTENSIONS, PackagePaths, ThumbnailConsts,
    VIDEO_EXTENSIONS,
};

/// Kind of a catalog entry. Derived from the file extension at scan time and never changed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify an extension (without dot, any case). `None` when not in either allow-list.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

impl ToSql for MediaKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MediaKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// One catalog row, keyed uniquely by `path`.
///
/// `captured_at`, `location`, `thumbnail_path`, `duration_seconds` and `resolution` are best-effort:
/// `None` means the source did not supply them or extraction degraded.
/// `is_document`, `face_ids` and `backup_status` are reserved; ingestion writes their defaults.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaRecord {
    pub path: String,
    /// Hex content digest, or `None` if the file could not be read.
    pub content_hash: Option<String>,
    pub captured_at: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub is_document: bool,
    pub face_ids: Option<String>,
    /// Soft-delete flag; deleted rows are hidden from listings but kept in storage.
    pub deleted: bool,
    pub backup_status: String,
    pub thumbnail_path: Option<String>,
    pub file_size_bytes: u64,
    pub last_modified_at: Option<NaiveDateTime>,
    pub kind: MediaKind,
    /// Video only.
    pub duration_seconds: Option<f64>,
    /// `"WIDTHxHEIGHT"`.
    pub resolution: Option<String>,
}

impl MediaRecord {
    /// Empty record for `path` with reserved columns at their defaults.
    pub fn new(path: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            content_hash: None,
            captured_at: None,
            location: None,
            is_document: false,
            face_ids: None,
            deleted: false,
            backup_status: DEFAULT_BACKUP_STATUS.to_string(),
            thumbnail_path: None,
            file_size_bytes: 0,
            last_modified_at: None,
            kind,
            duration_seconds: None,
            resolution: None,
        }
    }

    /// Last path component, for display.
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }

    /// Duration as `MM:SS` (videos with a known duration only).
    pub fn duration_label(&self) -> Option<String> {
        self.duration_seconds.map(|d| {
            let total = d.max(0.0) as u64;
            format!("{:02}:{:02}", total / 60, total % 60)
        })
    }
}

/// Reserved for face tagging; stored for schema completeness only.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRecord {
    pub id: i64,
    pub person_name: Option<String>,
    pub encoding: Vec<u8>,
}

/// Sortable catalog columns. A closed set, so it can be interpolated into SQL safely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortColumn {
    #[default]
    Path,
    #[value(name = "captured")]
    CapturedAt,
    #[value(name = "size")]
    FileSize,
    #[value(name = "modified")]
    LastModified,
    Kind,
}

impl SortColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            SortColumn::Path => "path",
            SortColumn::CapturedAt => "captured_at",
            SortColumn::FileSize => "file_size",
            SortColumn::LastModified => "last_modified",
            SortColumn::Kind => "kind",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Non-deleted row counts per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub images: usize,
    pub videos: usize,
}

impl KindCounts {
    pub fn total(&self) -> usize {
        self.images + self.videos
    }

    /// Human summary, e.g. `"3 images and 1 video"`. `None` when both are zero.
    pub fn describe(&self) -> Option<String> {
        fn plural(n: usize, word: &str) -> String {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        }
        let mut parts = Vec::new();
        if self.images > 0 {
            parts.push(plural(self.images, "image"));
        }
        if self.videos > 0 {
            parts.push(plural(self.videos, "video"));
        }
        (!parts.is_empty()).then(|| parts.join(" and "))
    }
}

impl<'a> FromIterator<&'a MediaRecord> for KindCounts {
    fn from_iter<I: IntoIterator<Item = &'a MediaRecord>>(iter: I) -> Self {
        let mut counts = KindCounts::default();
        for r in iter {
            match r.kind {
                MediaKind::Image => counts.images += 1,
                MediaKind::Video => counts.videos += 1,
            }
        }
        counts
    }
}

/// Lib options for ingestion and catalog access.
#[derive(Clone, Debug)]
pub struct IngestOpts {
    /// Holds the catalog database and the thumbnail directory.
    pub data_dir: PathBuf,
    /// Probing program (ffprobe-compatible).
    pub ffprobe: PathBuf,
    /// Frame extraction program (ffmpeg-compatible).
    pub ffmpeg: PathBuf,
    /// Hard limit per external tool call.
    pub tool_timeout: Duration,
    /// Thumbnail bounding box edge in pixels.
    pub thumbnail_edge: u32,
    /// JPEG quality for lossy thumbnails.
    pub jpeg_quality: u8,
    /// Offset of the representative video frame, in seconds.
    pub frame_offset_secs: f64,
    /// Follow symbolic links while scanning.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, matched against names and full paths).
    pub exclude: Vec<String>,
}

impl Default for IngestOpts {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(PackagePaths::get().data_dir_name()),
            ffprobe: PathBuf::from(ExternalToolConsts::FFPROBE),
            ffmpeg: PathBuf::from(ExternalToolConsts::FFMPEG),
            tool_timeout: ExternalToolConsts::TIMEOUT,
            thumbnail_edge: ThumbnailConsts::EDGE,
            jpeg_quality: ThumbnailConsts::JPEG_QUALITY,
            frame_offset_secs: ExternalToolConsts::FRAME_OFFSET_SECS,
            follow_links: false,
            exclude: Vec::new(),
        }
    }
}

impl IngestOpts {
    /// Options rooted at `data_dir`, everything else default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(PackagePaths::DB_FILENAME)
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.data_dir.join(PackagePaths::THUMBNAIL_DIR_NAME)
    }
}

/// Full options (CLI). Use [`IngestOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    pub ingest: IngestOpts,
    /// Debug logging and per-file detail.
    pub verbose: bool,
}

impl From<&Opts> for IngestOpts {
    fn from(o: &Opts) -> Self {
        o.ingest.clone()
    }
}
