//! Per-kind metadata extraction and thumbnail rendering.
//!
//! Each [`MediaKind`] has one [`MediaHandler`]. Handlers never fail a file: problems come back as
//! [`Extraction::Degraded`] (metadata) or a [`DegradeReason`] (thumbnail), and the caller leaves the
//! affected fields empty.

pub mod external;
pub mod photo;
pub mod thumbs;
pub mod video;

use chrono::NaiveDateTime;
use std::path::Path;

use crate::error::DegradeReason;
use crate::{IngestOpts, MediaKind};

pub use photo::ImageHandler;
pub use thumbs::ThumbnailStore;
pub use video::VideoHandler;

/// Best-effort metadata for one file. Every field may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaFields {
    pub captured_at: Option<NaiveDateTime>,
    pub location: Option<String>,
    /// `"WIDTHxHEIGHT"`.
    pub resolution: Option<String>,
    pub duration_seconds: Option<f64>,
}

/// Outcome of a best-effort extraction: either everything that was attempted worked, or some part
/// degraded and `partial` holds whatever was recovered.
#[derive(Clone, Debug, PartialEq)]
pub enum Extraction<T> {
    Complete(T),
    Degraded { partial: T, reason: DegradeReason },
}

impl<T> Extraction<T> {
    pub fn value(&self) -> &T {
        match self {
            Extraction::Complete(v) => v,
            Extraction::Degraded { partial, .. } => partial,
        }
    }

    pub fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Extraction::Complete(_) => None,
            Extraction::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Extraction::Complete(_))
    }

    pub fn into_parts(self) -> (T, Option<DegradeReason>) {
        match self {
            Extraction::Complete(v) => (v, None),
            Extraction::Degraded { partial, reason } => (partial, Some(reason)),
        }
    }
}

/// Metadata and thumbnail operations for one media kind.
pub trait MediaHandler: Send + Sync {
    fn kind(&self) -> MediaKind;

    /// Read capture time, location, resolution and duration where the format supplies them.
    fn extract_metadata(&self, path: &Path) -> Extraction<MediaFields>;

    /// Render a still thumbnail of `src` at `dest`, overwriting any previous file.
    fn generate_thumbnail(&self, src: &Path, dest: &Path) -> Result<(), DegradeReason>;
}

/// One handler per kind, chosen once per file from its scanned [`MediaKind`].
pub struct MediaHandlers {
    image: ImageHandler,
    video: VideoHandler,
}

impl MediaHandlers {
    pub fn new(image: ImageHandler, video: VideoHandler) -> Self {
        Self { image, video }
    }

    pub fn from_opts(opts: &IngestOpts) -> Self {
        Self::new(ImageHandler::from_opts(opts), VideoHandler::from_opts(opts))
    }

    pub fn for_kind(&self, kind: MediaKind) -> &dyn MediaHandler {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
        }
    }
}
