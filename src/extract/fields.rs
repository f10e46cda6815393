//! Field extractor: first-match selection over ranked harvest candidates.

use crate::extract::{vocab, FieldKind, RawAnchor, RawContainer};

/// Return the first non-empty textual result for a field, in selector-rank
/// order. Pure read of the harvested container.
///
/// Link fields go through the preferred-anchor heuristic before the generic
/// first-anchor fallback.
pub fn extract_field(container: &RawContainer, kind: FieldKind) -> String {
    match kind {
        FieldKind::Title => first_non_empty(&container.title_candidates),
        FieldKind::Company => first_non_empty(&container.company_candidates),
        FieldKind::Location => first_non_empty(&container.location_candidates),
        FieldKind::Description => first_non_empty(&container.description_candidates),
        FieldKind::Link => preferred_anchor(&container.anchors)
            .map(|a| a.href.clone())
            .unwrap_or_default(),
    }
}

/// First anchor whose visible text or accessible label contains one of the
/// preferred vocabulary words; only when none match, the first anchor
/// present.
pub fn preferred_anchor(anchors: &[RawAnchor]) -> Option<&RawAnchor> {
    anchors
        .iter()
        .find(|a| is_preferred(a))
        .or_else(|| anchors.first())
}

/// The apply link specifically: an anchor mentioning "apply", or nothing.
pub fn apply_anchor(anchors: &[RawAnchor]) -> Option<&RawAnchor> {
    anchors.iter().find(|a| {
        a.text.to_lowercase().contains("apply") || a.aria_label.to_lowercase().contains("apply")
    })
}

/// Does the anchor's visible text or accessible label match the preferred
/// vocabulary? Case-insensitive; the single definition of the match.
pub fn is_preferred(anchor: &RawAnchor) -> bool {
    let text = anchor.text.to_lowercase();
    let label = anchor.aria_label.to_lowercase();
    vocab::PREFERRED_ANCHOR
        .iter()
        .any(|v| text.contains(v) || label.contains(v))
}

fn first_non_empty(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(text: &str, href: &str) -> RawAnchor {
        RawAnchor {
            text: text.into(),
            href: href.into(),
            aria_label: String::new(),
        }
    }

    #[test]
    fn preferred_anchor_beats_first_anchor() {
        let anchors = vec![
            anchor("Home", "https://a.example/"),
            anchor("Apply Now", "https://b.example/apply"),
        ];
        assert_eq!(
            preferred_anchor(&anchors).unwrap().href,
            "https://b.example/apply"
        );
    }

    #[test]
    fn preferred_anchor_falls_back_to_first() {
        let anchors = vec![
            anchor("Home", "https://a.example/"),
            anchor("About", "https://b.example/"),
        ];
        assert_eq!(preferred_anchor(&anchors).unwrap().href, "https://a.example/");
    }

    #[test]
    fn preferred_anchor_reads_aria_label() {
        let anchors = vec![
            anchor("Home", "https://a.example/"),
            RawAnchor {
                text: String::new(),
                href: "https://b.example/job".into(),
                aria_label: "View job details".into(),
            },
        ];
        assert_eq!(preferred_anchor(&anchors).unwrap().href, "https://b.example/job");
    }

    #[test]
    fn preference_match_is_case_insensitive() {
        assert!(is_preferred(&anchor("APPLY NOW", "https://a.example/")));
        assert!(is_preferred(&anchor("Learn More", "https://a.example/")));
        assert!(!is_preferred(&anchor("Home", "https://a.example/")));
    }

    #[test]
    fn ranked_candidates_pick_first_non_empty() {
        let container = RawContainer {
            company_candidates: vec!["".into(), "  ".into(), "Acme Corp".into()],
            ..RawContainer::default()
        };
        assert_eq!(extract_field(&container, FieldKind::Company), "Acme Corp");
        assert_eq!(extract_field(&container, FieldKind::Location), "");
    }

    #[test]
    fn apply_anchor_requires_apply_word() {
        let anchors = vec![
            anchor("Learn more", "https://a.example/"),
            anchor("Apply on company site", "https://b.example/apply"),
        ];
        assert_eq!(apply_anchor(&anchors).unwrap().href, "https://b.example/apply");
        assert!(apply_anchor(&anchors[..1]).is_none());
    }
}
