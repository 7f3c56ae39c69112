//! Load `.photocat.toml` from a directory (CLI only). The lib takes everything through `IngestOpts`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PhotocatToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    data_dir: Option<String>,
    ffprobe: Option<String>,
    ffmpeg: Option<String>,
    tool_timeout: Option<u64>,
    thumbnail_size: Option<u32>,
    jpeg_quality: Option<u8>,
    frame_offset: Option<f64>,
    follow_links: Option<bool>,
    exclude: Option<Vec<String>>,
    verbose: Option<bool>,
}

/// Load the config file from `dir` if present. Returns None if missing or unreadable; a parse
/// error is logged and ignored.
pub(crate) fn load_photocat_toml(dir: &Path) -> Option<PhotocatToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_photocat_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_photocat_toml(s: &str) -> Result<PhotocatToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
pub(crate) fn apply_file_to_opts(file: &PhotocatToml, opts: &mut Opts) {
    let sec = &file.settings;
    let ingest = &mut opts.ingest;
    if let Some(ref p) = sec.data_dir {
        ingest.data_dir = PathBuf::from(p);
    }
    if let Some(ref p) = sec.ffprobe {
        ingest.ffprobe = PathBuf::from(p);
    }
    if let Some(ref p) = sec.ffmpeg {
        ingest.ffmpeg = PathBuf::from(p);
    }
    if let Some(secs) = sec.tool_timeout {
        ingest.tool_timeout = Duration::from_secs(secs.max(1));
    }
    apply_file_opt!(sec, ingest, thumbnail_size => thumbnail_edge);
    apply_file_opt!(sec, ingest, jpeg_quality => jpeg_quality);
    apply_file_opt!(sec, ingest, frame_offset => frame_offset_secs);
    apply_file_opt!(sec, ingest, follow_links => follow_links);
    if let Some(ref v) = sec.exclude {
        ingest.exclude = v.clone();
    }
    apply_file_opt!(sec, opts, verbose => verbose);
}
