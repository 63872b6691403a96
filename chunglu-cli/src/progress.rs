//! Terminal progress reporting for generation runs.

use std::sync::Arc;

use chunglu_core::{GenerationStats, ProgressObserver};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {pos}/{len} pairs ({percent}%) {elapsed}";

/// Progress bar advanced once per processed class pair.
pub struct PairProgress {
    bar: ProgressBar,
}

impl PairProgress {
    /// Creates a bar over `total` class pairs, or `None` when `quiet`.
    ///
    /// # Examples
    /// ```
    /// use chunglu_cli::progress::PairProgress;
    ///
    /// assert!(PairProgress::new(121, true).is_none());
    /// ```
    #[must_use]
    pub fn new(total: u64, quiet: bool) -> Option<Arc<Self>> {
        if quiet {
            return None;
        }
        Some(Arc::new(Self::with_bar(ProgressBar::new(total))))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message("generating");
        Self { bar }
    }

    /// Returns the number of pairs reported so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressObserver for PairProgress {
    fn pair_completed(&self, completed: u64, _total: u64) {
        self.bar.set_position(completed);
    }

    fn finished(&self, stats: &GenerationStats) {
        self.bar
            .finish_with_message(format!("{} edges", stats.edges_emitted));
    }
}
