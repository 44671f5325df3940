//! Terminal progress display for solve cycles and block passes

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Single progress bar that can be silenced
///
/// The bar length is an upper bound: a solve needs at most one cycle per cell,
/// a chunked solve exactly one step per block.
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a bar of `total` steps; `quiet` hides it entirely
    pub fn new(label: &str, total: usize, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(total as u64)
        };
        bar.set_style(PROGRESS_STYLE.clone());
        bar.set_prefix(label.to_owned());
        Self { bar }
    }

    /// Advance by one step
    pub fn tick(&self) {
        self.bar.inc(1);
    }

    /// Show a short status next to the bar
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_owned());
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Fill the bar and leave `message` on screen
    pub fn finish(&self, message: &str) {
        if let Some(length) = self.bar.length() {
            self.bar.set_position(length);
        }
        self.bar.finish_with_message(message.to_owned());
    }
}
