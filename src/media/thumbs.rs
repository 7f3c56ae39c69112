//! Thumbnail file naming and location.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::MediaKind;
use crate::engine::hashing::short_tag;
use crate::engine::tools::path_to_db_string;
use crate::utils::config::ThumbnailConsts;

/// Directory of generated thumbnails. Names are a pure function of the source path, so re-ingesting
/// a file overwrites its previous thumbnail instead of adding a new one.
#[derive(Clone, Debug)]
pub struct ThumbnailStore {
    dir: PathBuf,
}

impl ThumbnailStore {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create thumbnail dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `thumb_<stem>_<tag>.<ext>`: `tag` comes from the full source path so same-named files in
    /// different folders never collide. Videos always get a JPEG still; images keep their own format.
    pub fn path_for(&self, src: &Path, kind: MediaKind) -> PathBuf {
        let stem = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tag = short_tag(&path_to_db_string(src), ThumbnailConsts::PATH_TAG_LEN);
        let ext = match kind {
            MediaKind::Video => ThumbnailConsts::VIDEO_STILL_EXTENSION.to_string(),
            MediaKind::Image => src
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
                .unwrap_or_else(|| ThumbnailConsts::VIDEO_STILL_EXTENSION.to_string()),
        };
        self.dir.join(format!(
            "{}{stem}_{tag}.{ext}",
            ThumbnailConsts::PREFIX
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThumbnailStore::new(dir.path().join("thumbs")).unwrap();
        assert!(store.dir().is_dir());

        let src = Path::new("/photos/2024/a.JPG");
        let first = store.path_for(src, MediaKind::Image);
        assert_eq!(first, store.path_for(src, MediaKind::Image));

        let name = first.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("thumb_a_"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), "thumb_a_".len() + 8 + ".jpg".len());
    }

    #[test]
    fn same_name_in_different_folders_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThumbnailStore::new(dir.path()).unwrap();
        let a = store.path_for(Path::new("/x/a.png"), MediaKind::Image);
        let b = store.path_for(Path::new("/y/a.png"), MediaKind::Image);
        assert_ne!(a, b);
    }

    #[test]
    fn video_stills_are_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let store = ThumbnailStore::new(dir.path()).unwrap();
        let p = store.path_for(Path::new("/v/clip.mov"), MediaKind::Video);
        assert_eq!(p.extension().unwrap(), "jpg");
        assert!(p.starts_with(dir.path()));
    }
}
