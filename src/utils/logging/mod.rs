//! Utilities for logging and progress tracking

pub mod log;
pub mod progress;

pub use self::log::{log_operation_complete, log_operation_start, log_warning};
pub use self::progress::{create_row_progress_bar, finish_progress_bar, is_progress_row};
