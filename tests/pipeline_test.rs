//! Full-pipeline tests against a scripted page context.
//!
//! `MockPage` answers the harvest scripts by exact script match, so these
//! tests exercise the real orchestration paths (navigator, strategy chain,
//! drill-down, enrichment) without a browser.

use async_trait::async_trait;
use jobscout::extract::harvest;
use jobscout::pipeline::{self, RunConfig};
use jobscout::renderer::{NavigationResult, PageContext, Renderer, UserInput, WaitPolicy};
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

struct MockPage {
    tabs: Value,
    primary: Value,
    fallback: Value,
    rescan: Value,
    marker_count: u64,
    snapshots: Mutex<VecDeque<Value>>,
    click_results: Mutex<VecDeque<bool>>,
    html: String,
}

impl Default for MockPage {
    fn default() -> Self {
        Self {
            tabs: json!([{ "name": "Jobs", "href": "https://search.example/jobs?q=rust", "aria_label": "" }]),
            primary: json!([]),
            fallback: json!([]),
            rescan: json!([]),
            marker_count: 0,
            snapshots: Mutex::new(VecDeque::new()),
            click_results: Mutex::new(VecDeque::new()),
            html: String::new(),
        }
    }
}

#[async_trait]
impl PageContext for MockPage {
    async fn navigate(
        &mut self,
        url: &str,
        _policy: WaitPolicy,
        _timeout_ms: u64,
    ) -> anyhow::Result<NavigationResult> {
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn evaluate(&self, script: &str) -> anyhow::Result<Value> {
        if script == harvest::tab_list_script() {
            Ok(self.tabs.clone())
        } else if script == harvest::activate_tab_script() {
            Ok(json!({ "success": true }))
        } else if script == harvest::expand_listings_script() {
            Ok(json!({ "success": false }))
        } else if script == harvest::primary_harvest_script() {
            Ok(self.primary.clone())
        } else if script == harvest::fallback_harvest_script() {
            Ok(self.fallback.clone())
        } else if script == harvest::heading_rescan_script() {
            Ok(self.rescan.clone())
        } else if script == harvest::count_markers_script() {
            Ok(json!(self.marker_count))
        } else if script == harvest::detail_snapshot_script() {
            Ok(self
                .snapshots
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(json!({})))
        } else {
            Ok(Value::Null)
        }
    }

    async fn wait_for(&self, _selector: &str, _timeout_ms: u64) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn simulate_input(&self, input: &UserInput) -> anyhow::Result<bool> {
        match input {
            UserInput::Click(_) => Ok(self
                .click_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(true)),
            _ => Ok(true),
        }
    }

    async fn html(&self) -> anyhow::Result<String> {
        Ok(self.html.clone())
    }

    async fn url(&self) -> anyhow::Result<String> {
        Ok(String::new())
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

struct MockRenderer {
    pages: Mutex<VecDeque<Box<dyn PageContext>>>,
}

impl MockRenderer {
    fn new(pages: Vec<Box<dyn PageContext>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
        }
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn new_page(&self) -> anyhow::Result<Box<dyn PageContext>> {
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no more pages"))
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn primary_container(
    title: &str,
    company: &str,
    location: &str,
    description: &str,
    link: &str,
) -> Value {
    json!({
        "title_candidates": [title],
        "company_candidates": [company],
        "location_candidates": [location],
        "description_candidates": [description],
        "anchors": [{ "text": "Apply now", "href": link, "aria_label": "" }],
        "text": format!("{title}\n{company}\n{location}"),
    })
}

fn search_results_html() -> String {
    // The wrapper is host-relative, as result pages actually emit it.
    r#"<html><body>
        <a href="/search?q=next">Next page</a>
        <a href="https://www.google.com/preferences">Settings</a>
        <a href="/url?q=https://target.example/job/1&amp;sa=U">Result</a>
    </body></html>"#
        .to_string()
}

#[tokio::test]
async fn summary_run_collapses_duplicates_and_enriches() {
    let main_page = MockPage {
        primary: json!([
            primary_container(
                "Senior Rust Engineer",
                "Acme",
                "Remote",
                "Own the storage engine powering our search product.",
                "https://acme.example/jobs/1",
            ),
            // Same identity key, different description and link: a repeat.
            primary_container(
                "Senior Rust Engineer",
                "Acme",
                "Remote",
                "Duplicate entry with different body text entirely.",
                "https://acme.example/jobs/1b",
            ),
            // Missing description: empty string in output, not an error.
            primary_container("Data Engineer", "Globex", "Berlin, Germany", "", "https://globex.example/jobs/2"),
        ]),
        ..MockPage::default()
    };
    let search_page = MockPage {
        html: search_results_html(),
        ..MockPage::default()
    };

    let renderer = MockRenderer::new(vec![Box::new(main_page), Box::new(search_page)]);
    let config = RunConfig::default();

    let result = pipeline::run(&renderer, &config).await.unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].title, "Senior Rust Engineer");
    assert_eq!(
        result.records[0].description,
        "Own the storage engine powering our search product."
    );
    assert_eq!(result.records[1].title, "Data Engineer");
    assert_eq!(result.records[1].description, "");

    // No two output records share an identity key, adjacent or not.
    let keys: HashSet<String> = result.records.iter().map(|r| r.identity_key()).collect();
    assert_eq!(keys.len(), result.records.len());

    // Redirect wrapper resolved to its embedded target.
    assert_eq!(result.enriched_links[0], "https://target.example/job/1");

    // Summary mode never drills down.
    assert!(result.details.is_empty());
}

#[tokio::test]
async fn fallback_strategy_used_verbatim_when_primary_is_empty() {
    let main_page = MockPage {
        primary: json!([]),
        fallback: json!([
            {
                "title_candidates": ["Platform Engineer"],
                "company_candidates": ["Initech"],
                "location_candidates": ["Austin, TX"],
                "description_candidates": ["Operate the deployment platform for 200 services."],
                "anchors": [{ "text": "View job", "href": "https://initech.example/jobs/7", "aria_label": "" }],
                "text": "",
            },
            {
                // Title too short: noise, never emitted.
                "title_candidates": ["NYC"],
                "anchors": [{ "text": "View job", "href": "https://noise.example/1", "aria_label": "" }],
            },
        ]),
        rescan: json!([
            {
                // Same link as the first fallback hit: merged away.
                "title_candidates": ["Platform Engineer (copy)"],
                "anchors": [{ "text": "View job", "href": "https://initech.example/jobs/7", "aria_label": "" }],
            },
            {
                "title_candidates": ["Site Reliability Engineer"],
                "company_candidates": ["Hooli"],
                "location_candidates": ["Remote"],
                "description_candidates": ["Keep the fleet healthy and the pager quiet at scale."],
                "anchors": [{ "text": "Apply", "href": "https://hooli.example/jobs/3", "aria_label": "" }],
                "text": "",
            },
        ]),
        ..MockPage::default()
    };
    let search_page = MockPage {
        html: search_results_html(),
        ..MockPage::default()
    };

    let renderer = MockRenderer::new(vec![Box::new(main_page), Box::new(search_page)]);
    let result = pipeline::run(&renderer, &RunConfig::default()).await.unwrap();

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].title, "Platform Engineer");
    assert_eq!(result.records[0].company, "Initech");
    assert_eq!(result.records[0].location, "Austin, TX");
    assert_eq!(result.records[1].title, "Site Reliability Engineer");
}

#[tokio::test(start_paused = true)]
async fn failed_drill_down_iteration_leaves_explicit_gap() {
    let snapshot = |title: &str| {
        json!({
            "title_candidates": [title],
            "company_candidates": ["Acme"],
            "location_candidates": ["Remote"],
            "description_candidates": ["Design and build the next iteration of our platform."],
            "anchors": [{ "text": "Apply on company site", "href": "https://acme.example/apply", "aria_label": "" }],
            "text": "Expanded posting text",
        })
    };

    let main_page = MockPage {
        primary: json!([
            primary_container("Rust Engineer", "Acme", "Remote", "", "https://acme.example/jobs/1"),
        ]),
        marker_count: 5,
        // Iteration 3 fails to activate.
        click_results: Mutex::new(VecDeque::from(vec![true, true, false, true, true])),
        snapshots: Mutex::new(VecDeque::from(vec![
            snapshot("Job one"),
            snapshot("Job two"),
            snapshot("Job four"),
            snapshot("Job five"),
        ])),
        ..MockPage::default()
    };

    // No secondary page: enrichment degrades to empty links.
    let renderer = MockRenderer::new(vec![Box::new(main_page)]);
    let config = RunConfig {
        full_detail: true,
        ..RunConfig::default()
    };

    let result = pipeline::run(&renderer, &config).await.unwrap();

    assert_eq!(result.details.len(), 5);
    let indices: Vec<usize> = result.details.iter().map(|d| d.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);

    assert_eq!(result.details[0].record.title, "Job one");
    assert_eq!(result.details[1].record.title, "Job two");
    assert!(result.details[2].is_empty());
    assert_eq!(result.details[3].record.title, "Job four");
    assert_eq!(result.details[4].record.title, "Job five");

    // Preferred anchors survive into the detail.
    assert_eq!(
        result.details[0].anchors[0].href,
        "https://acme.example/apply"
    );

    // Enrichment view was unavailable: links empty, records kept.
    assert_eq!(result.enriched_links, vec![String::new()]);
    assert_eq!(result.records.len(), 1);
}

#[tokio::test]
async fn empty_page_is_a_terminal_state_not_an_error() {
    let main_page = MockPage::default();
    let renderer = MockRenderer::new(vec![Box::new(main_page)]);

    let result = pipeline::run(&renderer, &RunConfig::default()).await.unwrap();

    assert!(result.records.is_empty());
    assert!(result.details.is_empty());
    assert_eq!(
        pipeline::render_report(&result),
        "No job listings found.\n"
    );
}

#[tokio::test]
async fn summary_mode_keeps_the_last_five_in_discovery_order() {
    let containers: Vec<Value> = (1..=7)
        .map(|i| {
            primary_container(
                &format!("Engineer {i}"),
                "Acme",
                "Remote",
                "",
                &format!("https://acme.example/jobs/{i}"),
            )
        })
        .collect();

    let main_page = MockPage {
        primary: json!(containers),
        ..MockPage::default()
    };
    let search_page = MockPage {
        html: search_results_html(),
        ..MockPage::default()
    };

    let renderer = MockRenderer::new(vec![Box::new(main_page), Box::new(search_page)]);
    let result = pipeline::run(&renderer, &RunConfig::default()).await.unwrap();

    let titles: Vec<&str> = result.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Engineer 3", "Engineer 4", "Engineer 5", "Engineer 6", "Engineer 7"]
    );
}
