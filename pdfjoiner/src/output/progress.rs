//! Per-file progress display for merges.
//!
//! The bar is drawn on stderr and only when stderr is a terminal, so piped
//! output and `--json` stay clean.
//!
//! # Examples
//!
//! ```
//! use pdfjoiner::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(3, ProgressStyle::Bar);
//! for name in ["a.pdf", "b.pdf", "c.pdf"] {
//!     progress.set_message(name);
//!     progress.increment();
//! }
//! progress.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::merge::MergeProgress;

const BAR_WIDTH: usize = 30;
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Classic progress bar: `[=====>    ]`
    Bar,
    /// Spinner, for an unknown total.
    Spinner,
    /// Simple counter: `2/5`
    Counter,
}

/// Progress bar for visual feedback during a merge.
#[derive(Debug)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    enabled: bool,
    spinner_frame: usize,
}

impl ProgressBar {
    /// Create a new progress bar, enabled when stderr is a terminal.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            enabled: io::stderr().is_terminal(),
            spinner_frame: 0,
        }
    }

    /// Bar style for a known total, spinner otherwise.
    pub fn auto(total: usize) -> Self {
        let style = if total > 0 {
            ProgressStyle::Bar
        } else {
            ProgressStyle::Spinner
        };
        Self::new(total, style)
    }

    /// Create a progress bar that never draws.
    pub fn disabled() -> Self {
        let mut pb = Self::new(0, ProgressStyle::Counter);
        pb.enabled = false;
        pb
    }

    /// Whether anything will be drawn.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the message shown next to the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Set the progress to `current` and redraw.
    pub fn update(&mut self, current: usize) {
        self.current = current;
        self.draw();
    }

    /// Advance by one and redraw.
    pub fn increment(&mut self) {
        self.update(self.current + 1);
    }

    /// Record a merge progress event.
    pub fn record(&mut self, event: &MergeProgress<'_>) {
        self.total = event.total;
        self.set_message(event.name);
        self.update(event.index + 1);
    }

    /// Mark the bar as finished and move to a new line.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.draw();
            eprintln!();
        }
    }

    /// Finish with a final message.
    pub fn finish_with_message(&mut self, message: impl Into<String>) {
        self.set_message(message);
        self.finish();
    }

    /// Erase the bar, e.g. before printing an error.
    pub fn clear(&self) {
        if self.enabled {
            eprint!("\r\x1b[K");
            io::stderr().flush().ok();
        }
    }

    /// Completed fraction as a percentage.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    fn draw(&mut self) {
        if !self.enabled {
            return;
        }
        let line = self.render_line();
        eprint!("\r\x1b[K{line}");
        io::stderr().flush().ok();
    }

    /// The line the bar would draw right now.
    pub fn render_line(&mut self) -> String {
        let elapsed = format_duration(self.start_time.elapsed());
        let counter = format!("{}/{}", self.current, self.total);

        let mut parts = match self.style {
            ProgressStyle::Bar => {
                let filled = (BAR_WIDTH * self.current / self.total.max(1)).min(BAR_WIDTH);
                let head = if filled > 0 { ">" } else { "" };
                let bar = format!(
                    "[{}{head}{}]",
                    "=".repeat(filled.saturating_sub(1)),
                    " ".repeat(BAR_WIDTH - filled)
                );
                vec![bar, format!("{:.0}%", self.percent()), counter, elapsed]
            }
            ProgressStyle::Spinner => {
                let frame = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
                self.spinner_frame += 1;
                vec![frame.to_string(), elapsed]
            }
            ProgressStyle::Counter => vec![counter, elapsed],
        };

        if let Some(msg) = &self.message {
            parts.push(msg.clone());
        }

        parts.join(" ")
    }
}

/// Format a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
