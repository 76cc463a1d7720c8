//! Structured scholarship catalog and its field filter.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use scholar_core::error::Error;

pub const DEFAULT_FILTER_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub eligibility: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub region: String,
}

/// Optional criteria; an empty string matches everything.
///
/// `field` and `level` are both tested against eligibility text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFilter {
    pub field: String,
    pub level: String,
    pub category: String,
    pub region: String,
}

impl CatalogFilter {
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        contains_ci(&entry.eligibility, &self.field)
            && contains_ci(&entry.eligibility, &self.level)
            && contains_ci(&entry.category, &self.category)
            && contains_ci(&entry.region, &self.region)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self { Self { entries } }

    /// Reads a JSON array of entries.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!("catalog {}", path.display())).into());
        }
        let raw = std::fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))?;
        info!(path = %path.display(), entries = entries.len(), "catalog loaded");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] { &self.entries }

    /// First `limit` entries matching every non-empty criterion, in catalog order.
    pub fn filter(&self, filter: &CatalogFilter, limit: usize) -> Vec<CatalogEntry> {
        let hits: Vec<CatalogEntry> = self.entries.iter().filter(|e| filter.matches(e)).take(limit).cloned().collect();
        debug!(?filter, hits = hits.len(), "catalog filtered");
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, eligibility: &str, category: &str, region: &str) -> CatalogEntry {
        CatalogEntry { name: name.into(), eligibility: eligibility.into(), amount: 0.0, category: category.into(), region: region.into() }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = CatalogFilter::default();
        assert!(f.matches(&entry("A", "", "", "")));
    }

    #[test]
    fn criteria_are_case_insensitive_substrings() {
        let e = entry("A", "Undergraduate Engineering students", "SC/ST", "Maharashtra");
        let f = CatalogFilter { field: "engineering".into(), level: "UNDERGRAD".into(), category: "sc".into(), region: "mahara".into() };
        assert!(f.matches(&e));
        let miss = CatalogFilter { region: "Kerala".into(), ..CatalogFilter::default() };
        assert!(!miss.matches(&e));
    }

    #[test]
    fn load_reads_json_array_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Inspire Fellowship", "eligibility": "Postgraduate science students", "amount": 80000, "category": "General", "region": "All India"},
                {"name": "Vidyasiri", "eligibility": "Undergraduate students", "category": "OBC", "region": "Karnataka"},
                {"name": "Pragati", "eligibility": "Undergraduate engineering girls", "amount": 50000}
            ]"#,
        )
        .unwrap();
        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.entries().len(), 3);
        assert_eq!(catalog.entries()[2].region, "");
        assert!((catalog.entries()[1].amount).abs() < f64::EPSILON);

        let undergrad = CatalogFilter { level: "undergraduate".into(), ..CatalogFilter::default() };
        let names: Vec<String> = catalog.filter(&undergrad, DEFAULT_FILTER_LIMIT).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Vidyasiri", "Pragati"]);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound(_))));
    }
}
