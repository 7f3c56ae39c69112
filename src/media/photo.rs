//! Still images: dimensions and EXIF (capture time, GPS block), resized thumbnails.

use chrono::NaiveDateTime;
use exif::{Context, Exif, In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use log::debug;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::DegradeReason;
use crate::{IngestOpts, MediaKind};

use super::{Extraction, MediaFields, MediaHandler};

/// EXIF `DateTimeOriginal` layout.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Clone, Debug)]
pub struct ImageHandler {
    edge: u32,
    jpeg_quality: u8,
}

impl ImageHandler {
    pub fn new(edge: u32, jpeg_quality: u8) -> Self {
        Self {
            edge: edge.max(1),
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_opts(opts: &IngestOpts) -> Self {
        Self::new(opts.thumbnail_edge, opts.jpeg_quality)
    }
}

/// kamadak-exif's message for containers it cannot carry EXIF in (BMP, GIF, ...).
const EXIF_UNKNOWN_CONTAINER: &str = "Unknown image format";

/// Read the EXIF container. `Ok(None)` when the file has no EXIF or its format cannot hold any.
fn read_exif(path: &Path) -> Result<Option<Exif>, DegradeReason> {
    let file = File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(Some(exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(exif::Error::InvalidFormat(msg)) if msg == EXIF_UNKNOWN_CONTAINER => Ok(None),
        Err(e) => Err(DegradeReason::Decode(format!("exif: {e}"))),
    }
}

/// Parse an EXIF date-time string (`YYYY:MM:DD HH:MM:SS`).
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(s, EXIF_DATETIME_FORMAT).ok()
}

/// `DateTimeOriginal` of the primary image, if present and well-formed.
fn exif_capture_time(exif: &Exif) -> Option<NaiveDateTime> {
    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => {
            let raw = parts.first()?;
            parse_exif_datetime(std::str::from_utf8(raw).ok()?)
        }
        _ => None,
    }
}

/// Raw GPS block of the primary image as `Tag=value` pairs, or `None` when it has no GPS fields.
fn exif_gps_block(exif: &Exif) -> Option<String> {
    let parts: Vec<String> = exif
        .fields()
        .filter(|f| f.ifd_num == In::PRIMARY && f.tag.context() == Context::Gps)
        .map(|f| format!("{}={}", f.tag, f.display_value().with_unit(exif)))
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Shrink to fit within `edge` x `edge`, preserving aspect ratio. Never upscales.
pub fn fit_within(img: &DynamicImage, edge: u32) -> DynamicImage {
    if img.width() <= edge && img.height() <= edge {
        return img.clone();
    }
    img.resize(edge, edge, FilterType::Lanczos3)
}

/// Encode `img` to `dest`; format follows the extension of `dest`. JPEG uses `quality`.
pub fn save_thumbnail(img: &DynamicImage, dest: &Path, quality: u8) -> Result<(), DegradeReason> {
    let ext = dest
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => {
            let writer = BufWriter::new(File::create(dest)?);
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        }
        _ => img.save(dest)?,
    }
    Ok(())
}

impl MediaHandler for ImageHandler {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn extract_metadata(&self, path: &Path) -> Extraction<MediaFields> {
        let mut fields = MediaFields::default();
        let mut first_problem: Option<DegradeReason> = None;

        match image::image_dimensions(path) {
            Ok((w, h)) => fields.resolution = Some(format!("{w}x{h}")),
            Err(e) => first_problem = Some(e.into()),
        }

        match read_exif(path) {
            Ok(Some(exif)) => {
                fields.captured_at = exif_capture_time(&exif);
                fields.location = exif_gps_block(&exif);
            }
            Ok(None) => {}
            Err(reason) => {
                debug!("{}: {}", path.display(), reason);
                first_problem.get_or_insert(reason);
            }
        }

        match first_problem {
            None => Extraction::Complete(fields),
            Some(reason) => Extraction::Degraded {
                partial: fields,
                reason,
            },
        }
    }

    fn generate_thumbnail(&self, src: &Path, dest: &Path) -> Result<(), DegradeReason> {
        let _ = std::fs::remove_file(dest);
        let img = image::open(src)?;
        let thumb = fit_within(&img, self.edge);
        save_thumbnail(&thumb, dest, self.jpeg_quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn parses_exif_datetime() {
        let dt = parse_exif_datetime("2024:01:01 12:00:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-01 12:00:00");
        assert!(parse_exif_datetime("2024:01:01 12:00:00\0").is_some());
    }

    #[test]
    fn rejects_malformed_exif_datetime() {
        assert!(parse_exif_datetime("2024-01-01T12:00:00").is_none());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("").is_none());
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1920, 1080, Rgb([10, 20, 30])));
        let t = fit_within(&img, 300);
        assert_eq!(t.width(), 300);
        assert!((168..=169).contains(&t.height()));

        let tall = DynamicImage::ImageRgb8(RgbImage::new(400, 1200));
        let t = fit_within(&tall, 300);
        assert_eq!((t.width(), t.height()), (100, 300));
    }

    #[test]
    fn fit_within_never_upscales() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(64, 32));
        let t = fit_within(&img, 300);
        assert_eq!((t.width(), t.height()), (64, 32));
    }

    #[test]
    fn zero_byte_image_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.jpg");
        File::create(&path).unwrap();
        let handler = ImageHandler::new(300, 95);

        let extraction = handler.extract_metadata(&path);
        assert!(!extraction.is_complete());
        assert_eq!(extraction.value(), &MediaFields::default());

        let dest = dir.path().join("thumb.jpg");
        assert!(handler.generate_thumbnail(&path, &dest).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn corrupt_source_drops_stale_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.png");
        RgbImage::new(20, 20).save(&src).unwrap();
        let dest = dir.path().join("thumb_a.png");
        let handler = ImageHandler::new(300, 95);
        handler.generate_thumbnail(&src, &dest).unwrap();
        assert!(dest.is_file());

        std::fs::write(&src, b"no longer a png").unwrap();
        assert!(handler.generate_thumbnail(&src, &dest).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn bmp_and_gif_without_exif_are_complete() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["p.bmp", "p.gif"] {
            let path = dir.path().join(name);
            RgbImage::from_pixel(12, 9, Rgb([200, 10, 10])).save(&path).unwrap();

            let extraction = ImageHandler::new(300, 95).extract_metadata(&path);
            assert!(extraction.is_complete(), "{name}: {:?}", extraction.reason());
            assert_eq!(extraction.value().resolution.as_deref(), Some("12x9"));
        }
    }

    #[test]
    fn png_without_exif_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.png");
        RgbImage::new(40, 30).save(&path).unwrap();

        let extraction = ImageHandler::new(300, 95).extract_metadata(&path);
        assert!(extraction.is_complete());
        assert_eq!(extraction.value().resolution.as_deref(), Some("40x30"));
        assert_eq!(extraction.value().captured_at, None);
        assert_eq!(extraction.value().location, None);
    }
}
