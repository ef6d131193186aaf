//! Progress reporting for matching passes, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for a row progress bar
pub const DEFAULT_ROW_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create a progress bar over `length` rows
///
/// Returns a hidden bar when `enabled` is false, so callers can tick it unconditionally.
#[must_use]
pub fn create_row_progress_bar(length: u64, description: Option<&str>, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(length);
    let style = ProgressStyle::with_template(DEFAULT_ROW_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}

/// Finish a progress bar with an optional completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}

/// Whether row `index` (zero based) is due a progress log line
#[must_use]
pub const fn is_progress_row(index: usize, interval: usize) -> bool {
    interval != 0 && index % interval == 0
}
