//! Videos: container/stream probing and single-frame stills via external ffprobe/ffmpeg.

use chrono::{DateTime, NaiveDateTime};
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::error::DegradeReason;
use crate::{IngestOpts, MediaKind};

use super::external::{run_with_timeout, tool_name};
use super::{Extraction, MediaFields, MediaHandler};

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    /// ffprobe prints this as a string ("10.500000"); accept numbers too.
    #[serde(default)]
    duration: Option<serde_json::Value>,
    #[serde(default)]
    tags: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    tags: HashMap<String, serde_json::Value>,
}

fn value_as_f64(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn creation_tag(tags: &HashMap<String, serde_json::Value>) -> Option<&str> {
    tags.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("creation_time"))
        .and_then(|(_, v)| v.as_str())
}

/// Parse a container creation time. RFC 3339 (a trailing `Z` is UTC) is converted to UTC;
/// offset-less ISO-8601 is taken as-is.
pub fn parse_creation_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Map ffprobe JSON (`-show_format -show_streams`) to media fields.
pub fn parse_probe_output(bytes: &[u8]) -> Result<MediaFields, DegradeReason> {
    let probe: ProbeOutput =
        serde_json::from_slice(bytes).map_err(|e| DegradeReason::MalformedOutput {
            tool: "ffprobe".to_string(),
            detail: e.to_string(),
        })?;

    let mut fields = MediaFields::default();
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    if let Some(format) = &probe.format {
        fields.duration_seconds = format
            .duration
            .as_ref()
            .and_then(value_as_f64)
            .filter(|d| d.is_finite() && *d >= 0.0);
        fields.captured_at = creation_tag(&format.tags).and_then(parse_creation_time);
    }
    if let Some(stream) = video_stream {
        if let (Some(w), Some(h)) = (stream.width, stream.height) {
            fields.resolution = Some(format!("{w}x{h}"));
        }
        if fields.captured_at.is_none() {
            fields.captured_at = creation_tag(&stream.tags).and_then(parse_creation_time);
        }
    }
    Ok(fields)
}

#[derive(Clone, Debug)]
pub struct VideoHandler {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
    timeout: Duration,
    edge: u32,
    frame_offset_secs: f64,
}

impl VideoHandler {
    pub fn new(
        ffprobe: impl Into<PathBuf>,
        ffmpeg: impl Into<PathBuf>,
        timeout: Duration,
        edge: u32,
        frame_offset_secs: f64,
    ) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
            timeout,
            edge: edge.max(1),
            frame_offset_secs: frame_offset_secs.max(0.0),
        }
    }

    pub fn from_opts(opts: &IngestOpts) -> Self {
        Self::new(
            &opts.ffprobe,
            &opts.ffmpeg,
            opts.tool_timeout,
            opts.thumbnail_edge,
            opts.frame_offset_secs,
        )
    }

    fn probe(&self, path: &Path) -> Result<MediaFields, DegradeReason> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path);
        let stdout = run_with_timeout(cmd, &tool_name(&self.ffprobe), self.timeout)?;
        parse_probe_output(&stdout)
    }

    fn extract_frame(
        &self,
        src: &Path,
        dest: &Path,
        offset_secs: f64,
    ) -> Result<(), DegradeReason> {
        let _ = std::fs::remove_file(dest);
        let scale = format!(
            "scale={e}:{e}:force_original_aspect_ratio=decrease",
            e = self.edge
        );
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-loglevel", "error", "-ss"])
            .arg(format!("{offset_secs:.3}"))
            .arg("-i")
            .arg(src)
            .args(["-vframes", "1", "-vf"])
            .arg(scale)
            .arg(dest);
        let tool = tool_name(&self.ffmpeg);
        run_with_timeout(cmd, &tool, self.timeout)?;
        if dest.is_file() {
            Ok(())
        } else {
            Err(DegradeReason::NoOutput { tool })
        }
    }
}

impl MediaHandler for VideoHandler {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn extract_metadata(&self, path: &Path) -> Extraction<MediaFields> {
        match self.probe(path) {
            Ok(fields) => Extraction::Complete(fields),
            Err(reason) => Extraction::Degraded {
                partial: MediaFields::default(),
                reason,
            },
        }
    }

    fn generate_thumbnail(&self, src: &Path, dest: &Path) -> Result<(), DegradeReason> {
        match self.extract_frame(src, dest, self.frame_offset_secs) {
            // Clips shorter than the offset have no frame there; take the first one instead.
            Err(DegradeReason::NoOutput { .. }) if self.frame_offset_secs > 0.0 => {
                debug!("{}: no frame at offset, retrying at 0s", src.display());
                self.extract_frame(src, dest, 0.0)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "audio", "codec_name": "aac"},
            {"index": 1, "codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720,
             "tags": {"creation_time": "2023-05-06T07:08:09.000000Z"}}
        ],
        "format": {
            "filename": "b.mp4",
            "duration": "10.500000",
            "tags": {"creation_time": "2024-02-03T04:05:06.000000Z"}
        }
    }"#;

    #[test]
    fn parses_duration_resolution_and_creation_time() {
        let fields = parse_probe_output(SAMPLE.as_bytes()).unwrap();
        assert_eq!(fields.duration_seconds, Some(10.5));
        assert_eq!(fields.resolution.as_deref(), Some("1280x720"));
        assert_eq!(
            fields.captured_at.unwrap().to_string(),
            "2024-02-03 04:05:06"
        );
        assert_eq!(fields.location, None);
    }

    #[test]
    fn falls_back_to_stream_creation_time() {
        let json = r#"{"streams":[{"codec_type":"video","width":640,"height":480,
            "tags":{"creation_time":"2023-05-06T07:08:09Z"}}],"format":{"duration":3}}"#;
        let fields = parse_probe_output(json.as_bytes()).unwrap();
        assert_eq!(fields.duration_seconds, Some(3.0));
        assert_eq!(
            fields.captured_at.unwrap().to_string(),
            "2023-05-06 07:08:09"
        );
    }

    #[test]
    fn offset_creation_time_is_normalised_to_utc() {
        let dt = parse_creation_time("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-01 10:00:00");
        let naive = parse_creation_time("2024-01-01 12:00:00").unwrap();
        assert_eq!(naive.to_string(), "2024-01-01 12:00:00");
        assert!(parse_creation_time("yesterday").is_none());
    }

    #[test]
    fn audio_only_has_no_resolution() {
        let json = r#"{"streams":[{"codec_type":"audio"}],"format":{"duration":"1.0"}}"#;
        let fields = parse_probe_output(json.as_bytes()).unwrap();
        assert_eq!(fields.resolution, None);
        assert_eq!(fields.duration_seconds, Some(1.0));
    }

    #[test]
    fn malformed_output_is_reported() {
        let err = parse_probe_output(b"not json").unwrap_err();
        assert!(matches!(err, DegradeReason::MalformedOutput { .. }));
        let err = parse_probe_output(b"").unwrap_err();
        assert!(matches!(err, DegradeReason::MalformedOutput { .. }));
    }

    #[test]
    fn missing_tools_degrade_silently() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("b.mp4");
        std::fs::write(&src, b"not really a video").unwrap();
        let handler = VideoHandler::new(
            "/nonexistent/ffprobe",
            "/nonexistent/ffmpeg",
            Duration::from_secs(5),
            300,
            1.0,
        );

        let extraction = handler.extract_metadata(&src);
        assert_eq!(extraction.value(), &MediaFields::default());
        assert!(matches!(
            extraction.reason(),
            Some(DegradeReason::ToolMissing { .. })
        ));

        let dest = dir.path().join("thumb_b.jpg");
        let err = handler.generate_thumbnail(&src, &dest).unwrap_err();
        assert!(err.is_tool_condition());
        assert!(!dest.exists());
    }
}
