//! Progress indicator for interactive runs

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner tracking leaf requests, or a hidden bar when `visible` is false
pub fn request_spinner(visible: bool) -> ProgressBar {
    if visible {
        create_spinner("Fetching leaf categories")
    } else {
        ProgressBar::hidden()
    }
}

/// Show the running request total
pub fn report_attempt(pb: &ProgressBar, total: u64) {
    pb.set_message(format!("{} leaf requests", total));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_spinner() {
        let pb = request_spinner(false);
        assert!(pb.is_hidden());
        report_attempt(&pb, 3);
        assert_eq!(pb.message(), "3 leaf requests");
    }

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Working");
        assert!(!pb.is_finished());
        pb.finish_and_clear();
        assert!(pb.is_finished());
    }
}
