//! Heuristic field extraction from unstructured chunk text.
//!
//! Keyword lists, currency patterns and line windows are tuned to one
//! scholarship compendium, so they are carried as data in [`ExtractionRules`]
//! and can be overridden under `[extraction]` in the config.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ScholarshipRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    pub title_keywords: Vec<String>,
    pub title_max_chars: usize,
    pub title_excluded_prefix: String,
    /// Tried in order; capture group 1 holds the number.
    pub amount_patterns: Vec<String>,
    pub eligibility_keywords: Vec<String>,
    pub eligibility_follow_lines: usize,
    pub eligibility_max_chars: usize,
    pub preview_chars: usize,
    pub default_category: String,
    /// A candidate without a title is still kept if its text mentions one of these.
    pub relevance_keywords: Vec<String>,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        let strings = |xs: &[&str]| xs.iter().map(ToString::to_string).collect::<Vec<_>>();
        Self {
            title_keywords: strings(&["scholarship", "fellowship", "grant", "award"]),
            title_max_chars: 100,
            title_excluded_prefix: "eligibility".to_string(),
            amount_patterns: strings(&[
                r"₹\s*([\d,]+(?:\.\d{2})?)",
                r"Rs\.\s*([\d,]+(?:\.\d{2})?)",
                r"INR\s*([\d,]+(?:\.\d{2})?)",
                r"([\d,]+(?:\.\d{2})?)\s*(?:₹|Rs\.|INR)",
            ]),
            eligibility_keywords: strings(&["eligibility", "criteria", "qualification", "require"]),
            eligibility_follow_lines: 3,
            eligibility_max_chars: 300,
            preview_chars: 200,
            default_category: "General".to_string(),
            relevance_keywords: strings(&["scholarship", "fellowship", "grant"]),
        }
    }
}

/// Compiled form of [`ExtractionRules`]. Pure: no I/O, no shared state.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    rules: ExtractionRules,
    amount_patterns: Vec<Regex>,
}

impl FieldExtractor {
    pub fn new(rules: ExtractionRules) -> Result<Self> {
        let amount_patterns = rules
            .amount_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| Error::InvalidConfig(format!("extraction.amount_patterns: {e}"))))
            .collect::<Result<Vec<_>>>()?;
        let lower = |xs: &[String]| xs.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();
        let rules = ExtractionRules {
            title_keywords: lower(&rules.title_keywords),
            title_excluded_prefix: rules.title_excluded_prefix.to_lowercase(),
            eligibility_keywords: lower(&rules.eligibility_keywords),
            relevance_keywords: lower(&rules.relevance_keywords),
            ..rules
        };
        Ok(Self { rules, amount_patterns })
    }

    /// Applies every rule independently; a rule that misses leaves its default.
    pub fn extract(&self, text: &str) -> ScholarshipRecord {
        ScholarshipRecord {
            name: self.detect_title(text).unwrap_or_default(),
            eligibility: self.detect_eligibility(text).unwrap_or_default(),
            amount: self.detect_amount(text).unwrap_or(0.0),
            category: self.rules.default_category.clone(),
            source_text: preview(text, self.rules.preview_chars),
            similarity_score: None,
        }
    }

    /// First short line naming a scheme that is not itself an eligibility line.
    pub fn detect_title(&self, text: &str) -> Option<String> {
        text.split('\n').map(str::trim).find_map(|line| {
            let lower = line.to_lowercase();
            let is_title = line.chars().count() < self.rules.title_max_chars
                && contains_any(&lower, &self.rules.title_keywords)
                && !lower.starts_with(&self.rules.title_excluded_prefix);
            is_title.then(|| line.to_string())
        })
    }

    pub fn detect_amount(&self, text: &str) -> Option<f64> {
        self.amount_patterns.iter().find_map(|re| {
            let caps = re.captures(text)?;
            caps.get(1)?.as_str().replace(',', "").parse::<f64>().ok()
        })
    }

    /// The first line mentioning eligibility plus up to `eligibility_follow_lines`
    /// following non-blank lines, while the text stays under the length cap.
    pub fn detect_eligibility(&self, text: &str) -> Option<String> {
        let lines: Vec<&str> = text.split('\n').collect();
        let start = lines
            .iter()
            .position(|line| contains_any(&line.to_lowercase(), &self.rules.eligibility_keywords))?;
        let mut acc = lines[start].to_string();
        let mut acc_len = acc.chars().count();
        for next in lines.iter().skip(start + 1).take(self.rules.eligibility_follow_lines) {
            let next_len = next.chars().count();
            if next.trim().is_empty() || acc_len + next_len >= self.rules.eligibility_max_chars { break; }
            acc.push(' ');
            acc.push_str(next);
            acc_len += next_len + 1;
        }
        Some(acc.trim().to_string())
    }

    /// True when the raw text mentions one of the relevance keywords.
    pub fn looks_relevant(&self, text: &str) -> bool {
        contains_any(&text.to_lowercase(), &self.rules.relevance_keywords)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// First `max_chars` characters, with `...` appended when truncated.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("₹₹₹₹", 2), "₹₹...");
        assert_eq!(preview("short", 200), "short");
    }

    #[test]
    fn amount_falls_through_unparseable_match() {
        let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
        // "₹ ," matches the first pattern but parses to nothing.
        assert_eq!(fx.detect_amount("₹ , and INR 1,200"), Some(1200.0));
    }

    #[test]
    fn suffix_currency_pattern() {
        let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
        assert_eq!(fx.detect_amount("stipend of 5,000.50 INR per month"), Some(5000.50));
    }

    #[test]
    fn title_skips_eligibility_lines_and_long_lines() {
        let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
        let long = format!("{} scholarship", "a".repeat(120));
        let text = format!("Eligibility for the scholarship\n{long}\nNational Fellowship Scheme");
        assert_eq!(fx.detect_title(&text).as_deref(), Some("National Fellowship Scheme"));
    }

    #[test]
    fn eligibility_stops_at_blank_line() {
        let fx = FieldExtractor::new(ExtractionRules::default()).unwrap();
        let text = "Criteria: class 12 pass\nfamily income under limit\n\nunrelated";
        assert_eq!(
            fx.detect_eligibility(text).as_deref(),
            Some("Criteria: class 12 pass family income under limit")
        );
    }

    #[test]
    fn default_rules_compile_every_pattern() {
        let rules = ExtractionRules::default();
        let fx = FieldExtractor::new(rules.clone()).unwrap();
        assert_eq!(fx.amount_patterns.len(), rules.amount_patterns.len());
        assert_eq!(fx.detect_amount("Rs. 2,500"), Some(2500.0));
        assert_eq!(fx.detect_amount("INR 700"), Some(700.0));
        assert_eq!(fx.detect_amount("300 ₹ monthly"), Some(300.0));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let rules = ExtractionRules { amount_patterns: vec!["(".into()], ..ExtractionRules::default() };
        assert!(matches!(FieldExtractor::new(rules), Err(Error::InvalidConfig(_))));
    }
}
