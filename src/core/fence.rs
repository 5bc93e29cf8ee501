//! Scanner for filename-annotated code fences.
//!
//! A chat message can carry several files for the sandbox preview, each
//! written as a fence whose info string names the file:
//!
//! ````text
//! ```js=index.js
//! console.log(1)
//! ```
//! ````
//!
//! Fences without the `=filename` annotation, or without a closing marker,
//! never match and are skipped.

use regex::{CaptureMatches, Captures, Regex};
use std::sync::OnceLock;

const FENCE_PATTERN: &str = r"```([A-Za-z0-9_]+)\s*=\s*([A-Za-z0-9_./]+)\s*\n([\s\S]+?)\n```";

fn fence_regex() -> &'static Regex {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    FENCE_RE.get_or_init(|| Regex::new(FENCE_PATTERN).expect("fence pattern is valid"))
}

/// One annotated fence found in a message, borrowed from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceMatch<'t> {
    pub language_tag: &'t str,
    pub filename: &'t str,
    pub body: &'t str,
}

impl<'t> FenceMatch<'t> {
    fn from_captures(caps: &Captures<'t>) -> Option<Self> {
        Some(Self {
            language_tag: caps.get(1)?.as_str(),
            filename: caps.get(2)?.as_str(),
            body: caps.get(3)?.as_str(),
        })
    }
}

/// Scans one message for annotated fences.
///
/// The scanner holds no cursor of its own; every call to [`FenceScanner::iter`]
/// starts again from the top of the text.
#[derive(Debug, Clone, Copy)]
pub struct FenceScanner<'t> {
    text: &'t str,
}

impl<'t> FenceScanner<'t> {
    pub fn new(text: &'t str) -> Self {
        Self { text }
    }

    pub fn iter(&self) -> FenceMatches<'t> {
        FenceMatches {
            inner: fence_regex().captures_iter(self.text),
        }
    }
}

impl<'t> IntoIterator for FenceScanner<'t> {
    type Item = FenceMatch<'t>;
    type IntoIter = FenceMatches<'t>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy, left-to-right, non-overlapping fence matches.
pub struct FenceMatches<'t> {
    inner: CaptureMatches<'static, 't>,
}

impl<'t> Iterator for FenceMatches<'t> {
    type Item = FenceMatch<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find_map(|caps| FenceMatch::from_captures(&caps))
    }
}

pub fn scan_fences(text: &str) -> FenceMatches<'_> {
    FenceScanner::new(text).iter()
}
