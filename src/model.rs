//! Core data types: listing records, detail snapshots, tab descriptors,
//! and the deduplicator value threaded through the strategy chain.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One extracted job listing.
///
/// `title` is never empty in pipeline output; candidates that fail to yield
/// a title are discarded inside the strategy layer. Every other field may
/// legitimately be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
    pub apply_link: String,
}

impl JobRecord {
    /// Identity key used for deduplication. Two records with the same key
    /// are the same listing regardless of other field differences.
    pub fn identity_key(&self) -> String {
        format!("{}|{}|{}", self.title, self.company, self.location)
    }
}

/// One selectable category/view control discovered on the page.
///
/// Ephemeral: rebuilt on every navigation, never cached across page states.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TabDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub aria_label: String,
}

/// An anchor captured from a detail pane or active card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailAnchor {
    pub text: String,
    pub href: String,
}

/// Enriched snapshot of one listing's expanded detail view.
///
/// Correlated to its source listing by the 1-based `index`, not by identity
/// key: the detail-view state can outlive the originating record reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobDetail {
    pub index: usize,
    pub record: JobRecord,
    /// Full captured text of the detail view.
    pub content: String,
    pub anchors: Vec<DetailAnchor>,
}

impl JobDetail {
    /// An explicitly empty detail entry for an iteration that failed to
    /// activate. Keeps the index sequence contiguous.
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// True when the iteration captured nothing at all.
    pub fn is_empty(&self) -> bool {
        self.record == JobRecord::default() && self.content.is_empty() && self.anchors.is_empty()
    }
}

/// Output of one pipeline run.
///
/// `records` preserves discovery order from the winning strategy; it is
/// never sorted. `enriched_links` is index-aligned with `records`.
/// `details` is present only when full-detail mode ran.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub records: Vec<JobRecord>,
    pub enriched_links: Vec<String>,
    pub details: Vec<JobDetail>,
}

/// Explicit deduplication state passed into each strategy call.
///
/// Replaces seen-sets hidden inside closures: the primary strategy admits
/// by identity key, the fallback admits by link first (title/company are
/// not yet known at that point) and by identity key at construction.
#[derive(Debug, Default)]
pub struct Deduplicator {
    keys: HashSet<String>,
    links: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a record by identity key. Returns false for repeats.
    pub fn admit_record(&mut self, record: &JobRecord) -> bool {
        self.keys.insert(record.identity_key())
    }

    /// Admit a candidate by link. Empty links are always admitted; there is
    /// nothing to deduplicate on.
    pub fn admit_link(&mut self, link: &str) -> bool {
        if link.is_empty() {
            return true;
        }
        self.links.insert(link.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, company: &str, location: &str) -> JobRecord {
        JobRecord {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            ..JobRecord::default()
        }
    }

    #[test]
    fn identity_key_ignores_other_fields() {
        let mut a = record("Engineer", "Acme", "Remote");
        let b = record("Engineer", "Acme", "Remote");
        a.description = "different".into();
        a.link = "https://a.example".into();
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn deduplicator_rejects_repeated_keys() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.admit_record(&record("Engineer", "Acme", "Remote")));
        assert!(!dedup.admit_record(&record("Engineer", "Acme", "Remote")));
        assert!(dedup.admit_record(&record("Engineer", "Acme", "Berlin")));
    }

    #[test]
    fn deduplicator_always_admits_empty_links() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.admit_link(""));
        assert!(dedup.admit_link(""));
        assert!(dedup.admit_link("https://a.example/job/1"));
        assert!(!dedup.admit_link("https://a.example/job/1"));
    }

    #[test]
    fn empty_detail_keeps_index() {
        let detail = JobDetail::empty(3);
        assert_eq!(detail.index, 3);
        assert!(detail.is_empty());
    }
}
