//! `PHOTOCAT_*` environment overrides, with `.env` support.

use std::path::PathBuf;

use crate::Opts;
use crate::utils::config::PackagePaths;

/// Load `.env` from the working directory (or a parent). Existing variables win.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("loaded {}", path.display());
    }
}

/// Apply environment overrides using `lookup` for variable values.
pub fn apply_env_with<F>(opts: &mut Opts, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let paths = PackagePaths::get();
    let get = |key: &str| {
        lookup(&paths.env_var(key))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    if let Some(v) = get("FFPROBE") {
        opts.ingest.ffprobe = PathBuf::from(v);
    }
    if let Some(v) = get("FFMPEG") {
        opts.ingest.ffmpeg = PathBuf::from(v);
    }
    if let Some(v) = get("DATA_DIR") {
        opts.ingest.data_dir = PathBuf::from(v);
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_to_opts(opts: &mut Opts) {
    apply_env_with(opts, |k| std::env::var(k).ok());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_tool_paths_and_data_dir() {
        let vars: HashMap<&str, &str> = [
            ("PHOTOCAT_FFPROBE", "/usr/local/bin/ffprobe"),
            ("PHOTOCAT_DATA_DIR", " /srv/catalog "),
            ("PHOTOCAT_FFMPEG", ""),
        ]
        .into_iter()
        .collect();
        let mut opts = Opts::default();
        apply_env_with(&mut opts, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(opts.ingest.ffprobe, PathBuf::from("/usr/local/bin/ffprobe"));
        assert_eq!(opts.ingest.data_dir, PathBuf::from("/srv/catalog"));
        assert_eq!(opts.ingest.ffmpeg, PathBuf::from("ffmpeg"));
    }
}
