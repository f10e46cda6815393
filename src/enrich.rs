//! Result enricher: resolve a canonical external link per record through a
//! secondary search view.
//!
//! One long-lived page context is reused across every lookup; opening a
//! fresh view per query is both slower and far more detectable. Every
//! failure mode (timeout, no results, parse error) yields an empty link and
//! the record is kept.

use crate::model::JobRecord;
use crate::renderer::{PageContext, WaitPolicy};
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Default search endpoint for the secondary view.
const SEARCH_BASE: &str = "https://www.google.com/search?q=";

/// How long one enrichment navigation may take.
const LOOKUP_TIMEOUT_MS: u64 = 15_000;

/// Hosts that are never an organic result.
const INTERNAL_HOSTS: &[&str] = &[
    "google.",
    "gstatic.",
    "googleusercontent.",
    "webcache.",
    "duckduckgo.",
    "bing.",
];

pub struct Enricher {
    page: Box<dyn PageContext>,
    search_base: String,
}

impl Enricher {
    pub fn new(page: Box<dyn PageContext>) -> Self {
        Self {
            page,
            search_base: SEARCH_BASE.to_string(),
        }
    }

    /// Override the search endpoint (tests, alternate engines).
    pub fn with_search_base(mut self, base: impl Into<String>) -> Self {
        self.search_base = base.into();
        self
    }

    /// Resolve one record's canonical link. Empty on any failure.
    pub async fn lookup(&mut self, record: &JobRecord) -> String {
        let query = format!("{} {}", record.title, record.company)
            .trim()
            .to_string();
        if query.is_empty() {
            return String::new();
        }

        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let search_url = format!("{}{}", self.search_base, encoded);

        if let Err(e) = self
            .page
            .navigate(&search_url, WaitPolicy::Load, LOOKUP_TIMEOUT_MS)
            .await
        {
            warn!(query = %query, error = %e, "enrichment navigation failed");
            return String::new();
        }
        let _ = self.page.wait_for("a[href]", 3_000).await;

        let html = match self.page.html().await {
            Ok(html) => html,
            Err(e) => {
                warn!(query = %query, error = %e, "enrichment page unreadable");
                return String::new();
            }
        };

        let link = first_organic_link(&html, &search_url);
        debug!(query = %query, link = %link, "enrichment lookup");
        link
    }

    /// Resolve links for every record with a non-empty title or company.
    /// Output is index-aligned with the input.
    pub async fn enrich_all(&mut self, records: &[JobRecord]) -> Vec<String> {
        let mut links = Vec::with_capacity(records.len());
        for record in records {
            if record.title.is_empty() && record.company.is_empty() {
                links.push(String::new());
                continue;
            }
            links.push(self.lookup(record).await);
        }
        links
    }

    pub async fn close(self) -> anyhow::Result<()> {
        self.page.close().await
    }
}

/// First organic result link in a search results page, with redirect
/// wrappers unwrapped. Relative hrefs are resolved against `base` first;
/// result pages emit their wrappers host-relative.
pub fn first_organic_link(html: &str, base: &str) -> String {
    let document = Html::parse_document(html);
    let sel = Selector::parse("a[href]").unwrap();
    for element in document.select(&sel) {
        let href = element.value().attr("href").unwrap_or("");
        let resolved = unwrap_redirect(href, base);
        if is_organic(&resolved) {
            return resolved;
        }
    }
    String::new()
}

/// Decode a redirect-wrapper URL to its embedded target.
///
/// Handles the `/url?q=<target>` and `/l/?uddg=<target>` wrapper shapes,
/// whether absolute, scheme-relative, or host-relative (resolved against
/// `base`). Anything else comes back absolutized but otherwise untouched.
pub fn unwrap_redirect(href: &str, base: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = match Url::parse(&absolute) {
        Ok(url) => url,
        Err(_) => match Url::parse(base).and_then(|b| b.join(href)) {
            Ok(url) => url,
            Err(_) => return absolute,
        },
    };

    let is_wrapper = parsed.path() == "/url" || parsed.path().starts_with("/l/");
    if is_wrapper {
        for (key, value) in parsed.query_pairs() {
            if (key == "q" || key == "uddg") && value.starts_with("http") {
                return value.into_owned();
            }
        }
    }
    parsed.into()
}

fn is_organic(href: &str) -> bool {
    let Ok(parsed) = Url::parse(href) else {
        // Relative links are search-engine chrome, not results.
        return false;
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    !INTERNAL_HOSTS.iter().any(|internal| host.contains(internal))
}
