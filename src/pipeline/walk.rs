//! Directory scanner: one serial walkdir pass filtered down to allow-listed media files.

use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::MediaKind;
use crate::engine::tools::should_include_in_walk;
use crate::error::{IngestError, IngestResult};

use super::context::ScanOpts;
use super::error_handler::report_skipped_paths;

/// A candidate file and the kind its extension maps to. The kind is fixed from here on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// One result from a directory walk: either a regular file to classify or an error with optional path.
pub enum WalkOutcome {
    File(PathBuf),
    Other,
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => {
            // Symlinks to files count when not following links too.
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if is_file {
                WalkOutcome::File(entry.into_path())
            } else {
                WalkOutcome::Other
            }
        }
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Consume `iter`, keep files whose extension is allow-listed, and collect walk errors as
/// `(path, message)` pairs. Errors without a path are recorded against the last path seen.
pub fn run_walk_loop<I>(iter: I) -> (Vec<ScannedFile>, Vec<(PathBuf, String)>)
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut last_path: Option<PathBuf> = None;
    for outcome in iter {
        match outcome {
            WalkOutcome::File(path) => {
                if let Some(kind) = MediaKind::from_path(&path) {
                    last_path = Some(path.clone());
                    files.push(ScannedFile { path, kind });
                }
            }
            WalkOutcome::Other => {}
            WalkOutcome::Err { msg, path } => {
                let to_push = path.unwrap_or_else(|| {
                    PathBuf::from(format!(
                        "<no-path, last was {}>",
                        last_path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<none>".to_string())
                    ))
                });
                skipped.push((to_push, msg));
            }
        }
    }
    (files, skipped)
}

/// Recursively list media files under `root` in file-name order per directory.
///
/// The root is canonicalized, so returned paths are absolute. Entries matching an exclude glob or
/// listed in `skip_dirs` are dropped and excluded directories are not descended into. Hidden and
/// OS-generated names get no special treatment. A missing root is [`IngestError::NotFound`];
/// unreadable entries below it are skipped with one warning.
pub fn scan_directory(root: &Path, opts: &ScanOpts) -> IngestResult<Vec<ScannedFile>> {
    let root = root
        .canonicalize()
        .map_err(|_| IngestError::NotFound(root.to_path_buf()))?;
    if !root.is_dir() {
        return Err(IngestError::NotFound(root));
    }

    let iter = WalkDir::new(&root)
        .follow_links(opts.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || should_include_in_walk(e.path(), &root, &opts.skip_dirs, &opts.exclude)
        })
        .map(to_outcome_walkdir);

    let (files, skipped) = run_walk_loop(iter);
    report_skipped_paths(&skipped);
    debug!("scan of {}: {} media files", root.display(), files.len());
    Ok(files)
}
