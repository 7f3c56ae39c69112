//! Application configuration constants.
//! Tuning, limits, and extension allow-lists in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    data_dir_name: String,
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Catalog database filename inside the data dir.
    pub const DB_FILENAME: &'static str = "catalog.db";
    /// Thumbnail directory name inside the data dir.
    pub const THUMBNAIL_DIR_NAME: &'static str = "thumbnails";

    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                data_dir_name: format!(".{pkg}"),
                config_filename: format!(".{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Default data dir name (relative to the working directory).
    pub fn data_dir_name(&self) -> &str {
        &self.data_dir_name
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Environment variable name for `key`, e.g. `PHOTOCAT_FFPROBE`.
    pub fn env_var(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix, key.to_uppercase())
    }
}

// ---- Media kinds ----

/// Still-image extensions (lower-case, no dot).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

/// Video container extensions (lower-case, no dot).
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "3gp",
];

// ---- Hashing ----

/// Hashing I/O buffer size.
pub struct HashingConsts;

impl HashingConsts {
    /// Block size for streaming file contents through the digest (bytes). 64 KiB.
    pub const HASH_READ_CHUNK_SIZE: usize = 64 * 1024;
}

// ---- Thumbnails ----

/// Thumbnail rendering defaults.
pub struct ThumbnailConsts;

impl ThumbnailConsts {
    /// Bounding box edge (pixels); output fits within EDGE x EDGE.
    pub const EDGE: u32 = 300;
    /// JPEG quality for lossy thumbnails.
    pub const JPEG_QUALITY: u8 = 95;
    /// Prefix for every generated thumbnail filename.
    pub const PREFIX: &'static str = "thumb_";
    /// Extension used for video stills.
    pub const VIDEO_STILL_EXTENSION: &'static str = "jpg";
    /// Hex chars of the path fingerprint embedded in thumbnail names.
    pub const PATH_TAG_LEN: usize = 8;
}

// ---- External tools ----

/// External probing / frame extraction defaults.
pub struct ExternalToolConsts;

impl ExternalToolConsts {
    pub const FFPROBE: &'static str = "ffprobe";
    pub const FFMPEG: &'static str = "ffmpeg";
    /// Hard limit for one tool invocation.
    pub const TIMEOUT: Duration = Duration::from_secs(30);
    /// Offset into the video for the representative frame (seconds).
    pub const FRAME_OFFSET_SECS: f64 = 1.0;
    /// Extra time allowed for stdout to arrive after the child has exited.
    pub const OUTPUT_GRACE: Duration = Duration::from_millis(25);
}

// ---- Catalog ----

/// Default `backup_status` for new rows.
pub const DEFAULT_BACKUP_STATUS: &str = "not_backed";
