//! End-of-build reporting from the retained log window.
//!
//! On failure the whole window is dumped verbatim. On success only the final
//! reactor summary block is shown, with the `[INFO] ` prefix removed:
//!
//! ```text
//! [INFO] ------------------------------------------------------------------------   <- start
//! [INFO] Reactor Summary for Parent 1.0:
//! [INFO]
//! [INFO] core ............................................... SUCCESS [  1.2 s]
//! [INFO] ------------------------------------------------------------------------
//! [INFO] BUILD SUCCESS
//! [INFO] ------------------------------------------------------------------------   <- end - 1
//! ```

use crate::window::LogWindow;
use std::io::{self, Write};
use std::sync::LazyLock;

pub const SUMMARY_MARKER: &str = "[INFO] Reactor Summary";
pub const INFO_PREFIX: &str = "[INFO] ";

static SEPARATOR_MARKER: LazyLock<String> =
    LazyLock::new(|| format!("{}{}", INFO_PREFIX, "-".repeat(70)));

/// Half-open range `[start, end)` of the window that holds the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRange {
    pub start: usize,
    pub end: usize,
}

impl SummaryRange {
    /// Locate the last summary block in a single forward scan.
    ///
    /// `start` is the line before the last summary marker (the separator that
    /// opens the block), or 0 if there is none. `end` is one past the last
    /// separator, or the window length if there is none or if that separator
    /// comes before `start`.
    pub fn scan(window: &LogWindow) -> Self {
        let mut start = 0;
        let mut end = window.len();

        for (i, line) in window.iter().enumerate() {
            if line.starts_with(SUMMARY_MARKER) {
                start = i.saturating_sub(1);
            } else if line.starts_with(SEPARATOR_MARKER.as_str()) {
                end = i + 1;
            }
        }

        if end <= start {
            end = window.len();
        }

        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Blank line, then every retained line unmodified.
pub fn write_failure(window: &LogWindow, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    for line in window.iter() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Blank line, then the final summary block with `[INFO] ` stripped.
pub fn write_success(window: &LogWindow, out: &mut impl Write) -> io::Result<()> {
    let range = SummaryRange::scan(window);
    tracing::debug!(start = range.start, end = range.end, "reactor summary range");

    writeln!(out)?;
    for line in window.slice(range.start, range.end) {
        writeln!(out, "{}", line.strip_prefix(INFO_PREFIX).unwrap_or(line))?;
    }
    Ok(())
}

/// Dump the window to stdout after a failed build.
pub fn print_failure(window: &LogWindow) {
    if let Err(e) = write_failure(window, &mut io::stdout().lock()) {
        tracing::warn!(error = %e, "failed to print build log tail");
    }
}

/// Print the reactor summary to stdout after a successful build.
pub fn print_success(window: &LogWindow) {
    if let Err(e) = write_success(window, &mut io::stdout().lock()) {
        tracing::warn!(error = %e, "failed to print build summary");
    }
}
