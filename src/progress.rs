use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress bar over the project list of a run.
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    pub fn new(total: u64, visible: bool) -> Self {
        let bar = ProgressBar::new(total);
        if !visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:30.cyan/dark_gray} {pos}/{len} projects | {elapsed_precise} | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░")
        );
        bar.enable_steady_tick(Duration::from_millis(200));
        Self { bar }
    }

    pub fn set_project(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Print a line above the bar without tearing it.
    pub fn println(&self, msg: &str) {
        self.bar.println(msg);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }

    pub fn abandon(&self) {
        self.bar.abandon_with_message(style("aborted").red().to_string());
    }
}
