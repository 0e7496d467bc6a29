//! Live progress extraction from reactor build output.
//!
//! Recognizes the line a multi-module build prints when it starts a module:
//! `[INFO] Building <name> [<index>/<size>]`, and renders it as a compact,
//! right-aligned `index/size| name` indicator.

use regex::Regex;
use std::sync::LazyLock;

static BUILDING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[INFO\] Building (?<name>.+) \[(?<index>\d+)/(?<size>\d+)\]$").unwrap()
});

/// One parsed module-start line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMatch<'a> {
    pub name: &'a str,
    pub index: &'a str,
    pub size: &'a str,
}

impl<'a> ProgressMatch<'a> {
    /// Match a whole line; substrings do not count.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = BUILDING_REGEX.captures(line)?;
        Some(Self {
            name: caps.name("name")?.as_str(),
            index: caps.name("index")?.as_str(),
            size: caps.name("size")?.as_str(),
        })
    }

    /// Render as `index/size| name`, left-padded so `index` lines up under `size`.
    pub fn render(&self) -> String {
        let padding = self.size.len().saturating_sub(self.index.len());
        format!(
            "{}{}/{}| {}",
            " ".repeat(padding),
            self.index,
            self.size,
            self.name
        )
    }
}

/// Progress display for `line`, or `None` if it is not a module-start line.
pub fn progress_line(line: &str) -> Option<String> {
    ProgressMatch::parse(line).map(|m| m.render())
}
