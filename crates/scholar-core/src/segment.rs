//! Splits raw document text into chunks.
//!
//! Two modes, chosen at deployment time:
//! - paragraph packing: blank-line-delimited paragraphs are packed into
//!   chunks of roughly `max_chars` characters, never splitting a paragraph
//! - word windows: fixed-size overlapping windows over the word stream

use serde::{Deserialize, Serialize};

use crate::config::SegmentSettings;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentMode {
    #[default]
    Paragraph,
    Words,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segmenter {
    Paragraph { max_chars: usize },
    WordWindow { window: usize, overlap: usize },
}

impl Default for Segmenter {
    fn default() -> Self { Self::Paragraph { max_chars: 500 } }
}

impl Segmenter {
    pub fn from_settings(settings: &SegmentSettings) -> Result<Self> {
        match settings.mode {
            SegmentMode::Paragraph => {
                if settings.max_chars == 0 {
                    return Err(Error::InvalidConfig("segment.max_chars must be greater than 0".into()));
                }
                Ok(Self::Paragraph { max_chars: settings.max_chars })
            }
            SegmentMode::Words => {
                if settings.window_words == 0 {
                    return Err(Error::InvalidConfig("segment.window_words must be greater than 0".into()));
                }
                if settings.overlap_words >= settings.window_words {
                    return Err(Error::InvalidConfig(format!(
                        "segment.overlap_words ({}) must be smaller than segment.window_words ({})",
                        settings.overlap_words, settings.window_words
                    )));
                }
                Ok(Self::WordWindow { window: settings.window_words, overlap: settings.overlap_words })
            }
        }
    }

    pub fn segment(&self, text: &str) -> Vec<String> {
        match *self {
            Self::Paragraph { max_chars } => segment_paragraphs(text, max_chars),
            Self::WordWindow { window, overlap } => segment_word_windows(text, window, overlap),
        }
    }
}

/// Packs non-empty paragraphs into chunks joined by a blank line.
///
/// A chunk is emitted when its current length (separators included) plus the
/// next paragraph would exceed `max_chars`. A single paragraph longer than
/// `max_chars` becomes one oversized chunk.
pub fn segment_paragraphs(text: &str, max_chars: usize) -> Vec<String> {
    const SEPARATOR: &str = "\n\n";
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for paragraph in text.split(SEPARATOR) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() { continue; }
        let len = paragraph.chars().count();
        if !current.is_empty() && current_len + len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push_str(SEPARATOR);
            current_len += SEPARATOR.len();
        }
        current.push_str(paragraph);
        current_len += len;
    }
    if !current.is_empty() { chunks.push(current); }
    chunks
}

/// Overlapping windows of `window` words with stride `window - overlap`.
///
/// The last window always ends at the last word, so no window is a strict
/// suffix of its predecessor.
pub fn segment_word_windows(text: &str, window: usize, overlap: usize) -> Vec<String> {
    let window = window.max(1);
    let stride = window - overlap.min(window - 1);
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < words.len() {
        let end = (start + window).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end >= words.len() { break; }
        start += stride;
    }
    chunks
}
