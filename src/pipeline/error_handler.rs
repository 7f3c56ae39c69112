use log::{debug, warn};
use std::path::PathBuf;

/// Summarise walk entries that could not be read. Never fatal: the scan continues without them.
pub fn report_skipped_paths(skipped: &[(PathBuf, String)]) {
    if skipped.is_empty() {
        return;
    }
    warn!(
        "Skipped {} paths due to permission errors or access issues",
        skipped.len()
    );
    for (path, msg) in skipped {
        debug!("  skipped: {} ({})", path.display(), msg);
    }
}
