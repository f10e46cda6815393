//! Listing strategy chain: precise primary scan, noisy fallback scan.
//!
//! The two tiers are intentionally independent. The markup under extraction
//! is externally controlled and unstable; keeping two order-tried strategies
//! isolates a regression to one tier instead of degrading a unified
//! heuristic everywhere. The chain short-circuits on the first tier that
//! yields records.
//!
//! Evaluation failures never escape this module: a tier that cannot read
//! the page yields nothing and the chain moves on.

use crate::extract::{fields, harvest, heuristics, FieldKind, RawContainer};
use crate::model::{Deduplicator, JobRecord};
use crate::renderer::PageContext;
use tracing::{debug, warn};

/// Minimum title length for a fallback candidate. Anything at or below this
/// is selector noise, not a job title.
const MIN_TITLE_CHARS: usize = 3;

/// Try the primary strategy, then the fallback. Returns records in
/// discovery order; `dedup` is threaded through both tiers so repeats never
/// reach the caller.
pub async fn collect_listings(
    page: &dyn PageContext,
    dedup: &mut Deduplicator,
) -> Vec<JobRecord> {
    let primary = primary_listings(page, dedup).await;
    if !primary.is_empty() {
        debug!(count = primary.len(), "primary strategy produced listings");
        return primary;
    }

    debug!("primary title markers absent, falling back to heuristic scan");
    fallback_listings(page, dedup).await
}

/// Primary tier: known stable title markers with known sibling markers for
/// company and location.
pub async fn primary_listings(
    page: &dyn PageContext,
    dedup: &mut Deduplicator,
) -> Vec<JobRecord> {
    let containers = harvest_containers(page, &harvest::primary_harvest_script(), "primary").await;

    let mut records = Vec::new();
    for container in &containers {
        let title = fields::extract_field(container, FieldKind::Title);
        if title.is_empty() {
            continue;
        }
        let company = fields::extract_field(container, FieldKind::Company);
        let location = fields::extract_field(container, FieldKind::Location);

        let description = primary_description(container, &title, &company, &location);

        let record = JobRecord {
            title,
            company,
            location,
            description,
            link: fields::extract_field(container, FieldKind::Link),
            apply_link: fields::apply_anchor(&container.anchors)
                .map(|a| a.href.clone())
                .unwrap_or_default(),
        };

        if dedup.admit_record(&record) {
            records.push(record);
        }
    }
    records
}

/// Generic description shapes occasionally re-match a field already
/// captured; only accept text that adds something.
fn primary_description(
    container: &RawContainer,
    title: &str,
    company: &str,
    location: &str,
) -> String {
    let description = fields::extract_field(container, FieldKind::Description);
    if description == title || description == company || description == location {
        String::new()
    } else {
        description
    }
}

/// Fallback tier: generic shape scan plus a secondary h3/h4 rescan, merged
/// in encounter order.
pub async fn fallback_listings(
    page: &dyn PageContext,
    dedup: &mut Deduplicator,
) -> Vec<JobRecord> {
    let mut records = Vec::new();

    let shapes =
        harvest_containers(page, &harvest::fallback_harvest_script(), "fallback-shapes").await;
    for container in &shapes {
        if let Some(record) = fallback_record(container, dedup) {
            records.push(record);
        }
    }

    // Rescan catches listings whose containers match none of the shapes.
    // Dedup-by-link keeps the merge from reordering or repeating entries.
    let rescan =
        harvest_containers(page, &harvest::heading_rescan_script(), "fallback-rescan").await;
    for container in &rescan {
        if let Some(record) = fallback_record(container, dedup) {
            records.push(record);
        }
    }

    records
}

/// Build one record from a noisy fallback container, or reject it.
///
/// Dedup here is link-based first: title and company are not yet trusted at
/// this point, so the link is the only stable identity available. Identity
/// keys are still admitted at construction to uphold the output invariant.
fn fallback_record(container: &RawContainer, dedup: &mut Deduplicator) -> Option<JobRecord> {
    let title = fields::extract_field(container, FieldKind::Title);
    if title.chars().count() <= MIN_TITLE_CHARS {
        return None;
    }

    let link = fields::extract_field(container, FieldKind::Link);
    if !dedup.admit_link(&link) {
        return None;
    }

    let company = heuristics::pick_company(&container.company_candidates);
    let location = heuristics::pick_location(&container.location_candidates, &company);

    let mut description = heuristics::pick_description(
        &container.description_candidates,
        &title,
        &company,
        &location,
    );
    if description.is_empty() {
        description =
            heuristics::description_from_text(&container.text, &title, &company, &location);
    }

    let record = JobRecord {
        title,
        company,
        location,
        description,
        link,
        apply_link: fields::apply_anchor(&container.anchors)
            .map(|a| a.href.clone())
            .unwrap_or_default(),
    };

    dedup.admit_record(&record).then_some(record)
}

/// Count the primary title markers currently on the page. Zero on any
/// evaluation failure.
pub async fn marker_count(page: &dyn PageContext) -> usize {
    match page.evaluate(&harvest::count_markers_script()).await {
        Ok(value) => value.as_u64().unwrap_or(0) as usize,
        Err(e) => {
            warn!(error = %e, "marker count failed");
            0
        }
    }
}

async fn harvest_containers(
    page: &dyn PageContext,
    script: &str,
    tier: &str,
) -> Vec<RawContainer> {
    match page.evaluate(script).await {
        Ok(value) => match serde_json::from_value::<Vec<RawContainer>>(value) {
            Ok(containers) => containers,
            Err(e) => {
                warn!(tier, error = %e, "harvest returned malformed containers");
                Vec::new()
            }
        },
        Err(e) => {
            warn!(tier, error = %e, "harvest evaluation failed");
            Vec::new()
        }
    }
}
