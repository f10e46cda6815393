//! Detail drill-down orchestrator.
//!
//! Iterates the title markers currently on the jobs view, activates them
//! one at a time, and captures an enriched snapshot of the detail pane.
//! Strictly sequential: activating marker `i+1` before capturing marker
//! `i`'s pane would attribute the wrong detail to the wrong index.

use crate::extract::{fields, harvest, selectors, strategy, FieldKind, RawContainer};
use crate::model::{DetailAnchor, JobDetail, JobRecord};
use crate::renderer::{PageContext, Target, UserInput};
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed settle delay after an activation before the pane is read.
const SETTLE_DELAY_MS: u64 = 1_200;

/// Drill into every listing on the current view.
///
/// The marker count is recomputed fresh; the collection from the strategy
/// pass is stale the moment the page changed. Indices are contiguous and
/// 1-based: an iteration that fails to activate appends an explicitly empty
/// detail at its index instead of shifting later entries.
pub async fn drill_down(page: &dyn PageContext, limit: Option<usize>) -> Vec<JobDetail> {
    let mut count = strategy::marker_count(page).await;
    if let Some(limit) = limit {
        count = count.min(limit);
    }
    debug!(count, "starting detail drill-down");

    let mut details = Vec::with_capacity(count);
    for i in 0..count {
        let index = i + 1;
        let target = Target::new(selectors::PRIMARY_TITLE_MARKER)
            .nth(i)
            .within_closest(selectors::ACTIVATABLE_UNIT);

        let _ = page
            .simulate_input(&UserInput::ScrollIntoView(target.clone()))
            .await;

        let activated = page
            .simulate_input(&UserInput::Click(target))
            .await
            .unwrap_or(false);
        if !activated {
            warn!(index, "listing failed to activate; recording empty detail");
            details.push(JobDetail::empty(index));
            continue;
        }

        tokio::time::sleep(Duration::from_millis(SETTLE_DELAY_MS)).await;
        details.push(capture_detail(page, index).await);
    }
    details
}

/// Read the now-visible detail pane (or the active card) into a snapshot.
/// Partial captures are preserved as empty fields, never as errors.
async fn capture_detail(page: &dyn PageContext, index: usize) -> JobDetail {
    let container = match page.evaluate(&harvest::detail_snapshot_script()).await {
        Ok(value) => match serde_json::from_value::<RawContainer>(value) {
            Ok(container) => container,
            Err(e) => {
                warn!(index, error = %e, "detail snapshot malformed");
                return JobDetail::empty(index);
            }
        },
        Err(e) => {
            warn!(index, error = %e, "detail snapshot failed");
            return JobDetail::empty(index);
        }
    };

    let record = JobRecord {
        title: fields::extract_field(&container, FieldKind::Title),
        company: fields::extract_field(&container, FieldKind::Company),
        location: fields::extract_field(&container, FieldKind::Location),
        description: fields::extract_field(&container, FieldKind::Description),
        link: fields::extract_field(&container, FieldKind::Link),
        apply_link: fields::apply_anchor(&container.anchors)
            .map(|a| a.href.clone())
            .unwrap_or_default(),
    };

    // Anchors arrive pane-first, then card; keep only the preferred ones,
    // in that order.
    let anchors = container
        .anchors
        .iter()
        .filter(|a| fields::is_preferred(a))
        .map(|a| DetailAnchor {
            text: a.text.clone(),
            href: a.href.clone(),
        })
        .collect();

    JobDetail {
        index,
        record,
        content: container.text.clone(),
        anchors,
    }
}
