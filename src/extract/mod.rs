//! Structured extraction from the live content tree.
//!
//! The split is deliberate: in-page scripts (`harvest`) only *collect*
//! structure — for each candidate container they evaluate the ranked
//! selector lists below and return the ordered candidate texts plus the
//! anchor list and container text. All selection logic (first-non-empty,
//! preferred-anchor vocabulary, noise filters, dedup) runs in Rust over the
//! harvested JSON, so every heuristic is independently testable without a
//! browser.

pub mod fields;
pub mod harvest;
pub mod heuristics;
pub mod strategy;

use serde::Deserialize;

/// The record fields the extractor knows how to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    Company,
    Location,
    Description,
    Link,
}

/// One anchor harvested from a container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnchor {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub aria_label: String,
}

/// Raw harvest of one candidate listing container.
///
/// Candidate vectors are ordered by selector rank; an entry is empty when
/// that selector matched nothing. Valid only within the pass that produced
/// it — handles are never carried across page-state changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContainer {
    #[serde(default)]
    pub title_candidates: Vec<String>,
    #[serde(default)]
    pub company_candidates: Vec<String>,
    #[serde(default)]
    pub location_candidates: Vec<String>,
    #[serde(default)]
    pub description_candidates: Vec<String>,
    #[serde(default)]
    pub anchors: Vec<RawAnchor>,
    /// Full visible text of the container.
    #[serde(default)]
    pub text: String,
}

/// Ranked selector tables. Data-driven so the heuristic vocabulary can be
/// adjusted without touching control flow.
pub mod selectors {
    /// The one known stable title-marker signature the primary strategy
    /// keys on.
    pub const PRIMARY_TITLE_MARKER: &str = r#"div[role="heading"][aria-level="3"]"#;

    /// Likely enclosing-container shapes, nearest-ancestor-first walk.
    pub const CONTAINER_SHAPES: &[&str] = &[
        "li",
        r#"[role="treeitem"]"#,
        r#"[role="listitem"]"#,
        "div[data-ved]",
        "div[jscontroller]",
        "article",
    ];

    /// Known stable sibling markers for the company field (primary).
    pub const PRIMARY_COMPANY: &[&str] = &[
        r#"[itemprop="hiringOrganization"]"#,
        r#"[class*="company" i]"#,
        r#"div[role="heading"] + div"#,
    ];

    /// Known stable sibling markers for the location field (primary).
    pub const PRIMARY_LOCATION: &[&str] = &[
        r#"[itemprop="jobLocation"]"#,
        r#"[class*="location" i]"#,
        r#"div[role="heading"] + div + div"#,
    ];

    /// Generic content-shape candidates for descriptions (both tiers).
    pub const DESCRIPTION_SHAPES: &[&str] = &[
        r#"[class*="description" i]"#,
        r#"[class*="snippet" i]"#,
        r#"[class*="summary" i]"#,
        "p",
    ];

    /// Generic "possible listing" shapes the fallback strategy scans.
    pub const FALLBACK_SHAPES: &[&str] = &[
        "ul > li",
        r#"[role="listitem"]"#,
        "article",
        r#"div[class*="job" i]"#,
        r#"div[class*="card" i]"#,
        r#"div[class*="result" i]"#,
    ];

    /// Title-like headings inside a fallback shape.
    pub const FALLBACK_HEADING: &str = r#"h1, h2, h3, h4, [role="heading"]"#;

    /// Secondary heading rescan run after the shape scan.
    pub const RESCAN_HEADINGS: &str = "h3, h4";

    /// Noisier company candidates for the fallback tier.
    pub const FALLBACK_COMPANY: &[&str] = &[
        r#"[class*="company" i]"#,
        r#"[class*="employer" i]"#,
        "span",
        "cite",
    ];

    /// Noisier location candidates for the fallback tier.
    pub const FALLBACK_LOCATION: &[&str] = &[
        r#"[class*="location" i]"#,
        r#"[class*="place" i]"#,
        "span",
    ];

    /// Activatable unit enclosing a title marker (tab/card equivalent).
    pub const ACTIVATABLE_UNIT: &str =
        r#"[role="tab"], [role="treeitem"], [role="button"], li, div[jscontroller], div[data-ved]"#;

    /// Where the expanded detail view usually lives.
    pub const DETAIL_PANE: &str =
        r#"[role="dialog"], [class*="detail" i], [id*="detail" i], aside"#;

    /// The card currently selected after an activation.
    pub const ACTIVE_CARD: &str =
        r#"[aria-selected="true"], [class*="selected" i], [class*="active" i]"#;

    /// Controls scanned for tab discovery and jobs-view activation.
    pub const TAB_CONTROLS: &str = r#"a[href], [role="tab"], [role="link"]"#;

    /// Shapes scanned for the load-more affordance.
    pub const LOAD_MORE_SHAPES: &str = r#"a, button, [role="button"], div[tabindex]"#;

    /// Headings tried for the detail snapshot title.
    pub const DETAIL_HEADING: &str = r#"h1, h2, h3, [role="heading"]"#;
}

/// Vocabularies. All matching is case-insensitive substring.
pub mod vocab {
    /// Anchor texts/labels preferred over the generic first anchor.
    pub const PREFERRED_ANCHOR: &[&str] = &["apply", "view job", "learn more"];

    /// The specialized view the navigator steers toward.
    pub const JOBS_VIEW: &[&str] = &["jobs"];

    /// Load-more affordance texts, most specific first.
    pub const LOAD_MORE: &[&str] = &[
        "100+ more jobs",
        "more jobs",
        "see more jobs",
        "view more jobs",
    ];
}
