//! Run orchestrator: sequences navigation, strategy chain, drill-down, and
//! enrichment, and renders the final report.
//!
//! Only bootstrap is fatal. Once the initial navigation succeeds the run
//! always produces output; every later stage degrades to partial data.

use crate::detail;
use crate::enrich::Enricher;
use crate::extract::strategy;
use crate::model::{Deduplicator, RunResult};
use crate::nav::{self, Navigator};
use crate::renderer::{Renderer, WaitPolicy};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Records kept in summary-only mode.
const SUMMARY_TAIL: usize = 5;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Search page the run starts from.
    pub search_url: String,
    /// Full-detail mode drills into every record; summary-only mode stops
    /// after the enriched tail summary.
    pub full_detail: bool,
    /// Cap on drill-down iterations.
    pub detail_limit: Option<usize>,
    /// Timeout for the bootstrap navigation.
    pub nav_timeout_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.google.com/search?q=software+engineer+jobs".to_string(),
            full_detail: false,
            detail_limit: None,
            nav_timeout_ms: 30_000,
        }
    }
}

/// Execute one full pipeline pass.
pub async fn run(renderer: &dyn Renderer, config: &RunConfig) -> Result<RunResult> {
    // Bootstrap: the only fatal path. No browser page or no initial
    // navigation means nothing can be produced.
    let mut page = renderer
        .new_page()
        .await
        .context("bootstrap: opening primary page")?;
    page.navigate(&config.search_url, WaitPolicy::Load, config.nav_timeout_ms)
        .await
        .context("bootstrap: initial navigation")?;

    let mut navigator = Navigator::new();
    if !navigator.to_jobs_view(page.as_mut()).await {
        info!("jobs view unavailable; continuing with the generic results view");
    }

    nav::expand_listings(page.as_ref()).await;

    let mut dedup = Deduplicator::new();
    let mut records = strategy::collect_listings(page.as_ref(), &mut dedup).await;
    if records.is_empty() {
        info!("no records found");
        let _ = page.close().await;
        return Ok(RunResult::default());
    }
    info!(count = records.len(), "listings collected");

    let details = if config.full_detail {
        detail::drill_down(page.as_ref(), config.detail_limit).await
    } else {
        // Summary mode reports the tail of the discovery order and skips
        // drill-down entirely.
        let keep_from = records.len().saturating_sub(SUMMARY_TAIL);
        records = records.split_off(keep_from);
        Vec::new()
    };

    // Enrichment runs on its own long-lived view; losing it costs links,
    // never records.
    let enriched_links = match renderer.new_page().await {
        Ok(secondary) => {
            let mut enricher = Enricher::new(secondary);
            let links = enricher.enrich_all(&records).await;
            if let Err(e) = enricher.close().await {
                warn!(error = %e, "failed to close enrichment view");
            }
            links
        }
        Err(e) => {
            warn!(error = %e, "enrichment view unavailable; links left empty");
            vec![String::new(); records.len()]
        }
    };

    let _ = page.close().await;

    Ok(RunResult {
        records,
        enriched_links,
        details,
    })
}

/// Render the run result as a human-readable report. Nothing is persisted;
/// this text is the run's only artifact.
pub fn render_report(result: &RunResult) -> String {
    let mut out = String::new();

    if result.records.is_empty() {
        out.push_str("No job listings found.\n");
        return out;
    }

    out.push_str(&format!("Job listings ({} found)\n\n", result.records.len()));
    for (i, record) in result.records.iter().enumerate() {
        let enriched = result
            .enriched_links
            .get(i)
            .map(String::as_str)
            .unwrap_or("");
        out.push_str(&format!("[{}] {}\n", i + 1, record.title));
        out.push_str(&format!("    company:  {}\n", record.company));
        out.push_str(&format!("    location: {}\n", record.location));
        out.push_str(&format!("    link:     {}\n", enriched));
        out.push('\n');
    }

    if !result.details.is_empty() {
        out.push_str("Details\n\n");
        for detail in &result.details {
            out.push_str(&format!("--- [{}] {}\n", detail.index, detail.record.title));
            if detail.is_empty() {
                out.push_str("    (no detail captured)\n\n");
                continue;
            }
            out.push_str(&format!("    company:     {}\n", detail.record.company));
            out.push_str(&format!("    location:    {}\n", detail.record.location));
            out.push_str(&format!("    description: {}\n", detail.record.description));
            if !detail.content.is_empty() {
                out.push_str(&format!("    content:\n{}\n", indent(&detail.content, 8)));
            }
            for anchor in &detail.anchors {
                out.push_str(&format!("    anchor: {} -> {}\n", anchor.text, anchor.href));
            }
            out.push('\n');
        }
    }

    out
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DetailAnchor, JobDetail, JobRecord};

    #[test]
    fn report_lists_records_with_enrichment_links() {
        let result = RunResult {
            records: vec![
                JobRecord {
                    title: "Rust Engineer".into(),
                    company: "Acme".into(),
                    location: "Remote".into(),
                    ..JobRecord::default()
                },
                JobRecord {
                    title: "Platform Engineer".into(),
                    ..JobRecord::default()
                },
            ],
            enriched_links: vec!["https://target.example/job/1".into(), String::new()],
            details: Vec::new(),
        };
        let report = render_report(&result);
        assert!(report.contains("[1] Rust Engineer"));
        assert!(report.contains("link:     https://target.example/job/1"));
        assert!(report.contains("[2] Platform Engineer"));
        assert!(!report.contains("Details"));
    }

    #[test]
    fn report_marks_empty_details() {
        let result = RunResult {
            records: vec![JobRecord {
                title: "Rust Engineer".into(),
                ..JobRecord::default()
            }],
            enriched_links: vec![String::new()],
            details: vec![
                JobDetail {
                    index: 1,
                    record: JobRecord {
                        title: "Rust Engineer".into(),
                        ..JobRecord::default()
                    },
                    content: "Full posting text".into(),
                    anchors: vec![DetailAnchor {
                        text: "Apply".into(),
                        href: "https://target.example/apply".into(),
                    }],
                },
                JobDetail::empty(2),
            ],
        };
        let report = render_report(&result);
        assert!(report.contains("--- [1] Rust Engineer"));
        assert!(report.contains("anchor: Apply -> https://target.example/apply"));
        assert!(report.contains("--- [2]"));
        assert!(report.contains("(no detail captured)"));
    }

    #[test]
    fn report_handles_no_records() {
        assert_eq!(render_report(&RunResult::default()), "No job listings found.\n");
    }
}
