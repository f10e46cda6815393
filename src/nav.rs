//! Tab/View navigator and pagination expander.
//!
//! The navigator steers the page from the generic search view into the
//! jobs view: a discovered tab href is preferred, a simulated activation of
//! a matching control is the fallback. Callers only ever observe a boolean;
//! nothing thrown inside the page crosses this boundary.

use crate::extract::harvest;
use crate::extract::selectors;
use crate::extract::strategy;
use crate::model::TabDescriptor;
use crate::renderer::{PageContext, WaitPolicy};
use std::time::Duration;
use tracing::{debug, warn};

/// How long a tab-href navigation may take.
const TAB_NAV_TIMEOUT_MS: u64 = 20_000;

/// Settle window after a simulated activation or expansion.
const SETTLE_TIMEOUT_MS: u64 = 4_000;

/// Poll interval while waiting for expanded listings to render.
const EXPAND_POLL_MS: u64 = 200;

/// Navigator states. `ViewReady` is terminal for a successful run;
/// `NavigationFailed` resets to `Idle` and the run continues on the
/// generic view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    AwaitingTabList,
    TabListReady,
    NavigatingToView,
    ViewReady,
    NavigationFailed,
}

pub struct Navigator {
    state: NavState,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            state: NavState::Idle,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Move the page into the jobs view. Returns false when every approach
    /// failed and the caller should continue with the generic view.
    pub async fn to_jobs_view(&mut self, page: &mut dyn PageContext) -> bool {
        self.transition(NavState::AwaitingTabList);
        let tabs = discover_tabs(page).await;
        self.transition(NavState::TabListReady);

        self.transition(NavState::NavigatingToView);

        // Prefer direct navigation through a discovered href.
        if let Some(tab) = tabs
            .iter()
            .find(|t| !t.href.is_empty() && descriptor_matches_jobs(t))
        {
            match page
                .navigate(&tab.href, WaitPolicy::Settled, TAB_NAV_TIMEOUT_MS)
                .await
            {
                Ok(nav) => {
                    debug!(url = %nav.final_url, "jobs view reached via tab href");
                    self.transition(NavState::ViewReady);
                    return true;
                }
                Err(e) => {
                    warn!(href = %tab.href, error = %e, "tab navigation failed, trying simulated activation");
                }
            }
        }

        // Fall back to clicking any control that matches the vocabulary.
        let activated = match page.evaluate(&harvest::activate_tab_script()).await {
            Ok(value) => value
                .get("success")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "jobs-view activation failed");
                false
            }
        };

        if activated {
            let _ = page
                .wait_for(selectors::PRIMARY_TITLE_MARKER, SETTLE_TIMEOUT_MS)
                .await;
            self.transition(NavState::ViewReady);
            return true;
        }

        self.transition(NavState::NavigationFailed);
        self.transition(NavState::Idle);
        false
    }

    fn transition(&mut self, next: NavState) {
        debug!(from = ?self.state, to = ?next, "navigator transition");
        self.state = next;
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

/// Does a tab descriptor point at the jobs view?
pub fn descriptor_matches_jobs(tab: &TabDescriptor) -> bool {
    matches_jobs(&tab.href) || matches_jobs(&tab.name) || matches_jobs(&tab.aria_label)
}

fn matches_jobs(s: &str) -> bool {
    use crate::extract::vocab;
    let lower = s.to_lowercase();
    vocab::JOBS_VIEW.iter().any(|v| lower.contains(v))
}

/// Rebuild the tab list from the current page state. Descriptors are
/// ephemeral; they are never reused across navigations.
pub async fn discover_tabs(page: &dyn PageContext) -> Vec<TabDescriptor> {
    match page.evaluate(&harvest::tab_list_script()).await {
        Ok(value) => match serde_json::from_value::<Vec<TabDescriptor>>(value) {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(error = %e, "tab list malformed");
                Vec::new()
            }
        },
        Err(e) => {
            warn!(error = %e, "tab discovery failed");
            Vec::new()
        }
    }
}

/// Single best-effort "load more" expansion. Absence of the affordance is
/// not an error; the already-found set stands on its own.
pub async fn expand_listings(page: &dyn PageContext) -> bool {
    // The title markers already match before the click; a selector wait
    // would resolve immediately. The pre-click count is the baseline the
    // settle step waits to grow past.
    let before = strategy::marker_count(page).await;

    let expanded = match page.evaluate(&harvest::expand_listings_script()).await {
        Ok(value) => value
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        Err(e) => {
            warn!(error = %e, "load-more scan failed");
            false
        }
    };

    if expanded {
        // Settle: either the marker count grows or the window elapses,
        // whichever resolves first.
        let deadline = tokio::time::Instant::now() + Duration::from_millis(SETTLE_TIMEOUT_MS);
        loop {
            tokio::time::sleep(Duration::from_millis(EXPAND_POLL_MS)).await;
            let after = strategy::marker_count(page).await;
            if after > before {
                debug!(before, after, "listing set expanded");
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                debug!(before, "expansion settle window elapsed without new listings");
                break;
            }
        }
    } else {
        debug!("no load-more affordance present");
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{NavigationResult, UserInput};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Page double for the expansion settle: a scripted sequence of marker
    /// counts, then a steady-state count once the sequence is drained.
    struct ExpandPage {
        has_affordance: bool,
        counts: Mutex<VecDeque<u64>>,
        settled_count: u64,
    }

    #[async_trait]
    impl PageContext for ExpandPage {
        async fn navigate(
            &mut self,
            url: &str,
            _policy: WaitPolicy,
            _timeout_ms: u64,
        ) -> anyhow::Result<NavigationResult> {
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 0,
            })
        }

        async fn evaluate(&self, script: &str) -> anyhow::Result<Value> {
            if script == harvest::expand_listings_script() {
                Ok(json!({ "success": self.has_affordance }))
            } else if script == harvest::count_markers_script() {
                let count = self
                    .counts
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or(self.settled_count);
                Ok(json!(count))
            } else {
                Ok(Value::Null)
            }
        }

        async fn wait_for(&self, _selector: &str, _timeout_ms: u64) -> anyhow::Result<bool> {
            Ok(true)
        }

        async fn simulate_input(&self, _input: &UserInput) -> anyhow::Result<bool> {
            Ok(true)
        }

        async fn html(&self) -> anyhow::Result<String> {
            Ok(String::new())
        }

        async fn url(&self) -> anyhow::Result<String> {
            Ok(String::new())
        }

        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expansion_settles_on_marker_count_growth_not_mere_presence() {
        // 10 markers before the click; they keep matching while the
        // expanded entries render, so presence alone proves nothing.
        let page = ExpandPage {
            has_affordance: true,
            counts: Mutex::new(VecDeque::from(vec![10, 10, 10])),
            settled_count: 25,
        };
        assert!(expand_listings(&page).await);
        // Every stale count was polled through before the grown count
        // ended the settle.
        assert!(page.counts.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expansion_settle_gives_up_when_count_never_grows() {
        let page = ExpandPage {
            has_affordance: true,
            counts: Mutex::new(VecDeque::new()),
            settled_count: 10,
        };
        // The activation still counts as an expansion; the settle just
        // stops at the window.
        assert!(expand_listings(&page).await);
    }

    #[tokio::test]
    async fn missing_affordance_skips_the_settle() {
        let page = ExpandPage {
            has_affordance: false,
            counts: Mutex::new(VecDeque::from(vec![10])),
            settled_count: 10,
        };
        assert!(!expand_listings(&page).await);
        // Only the baseline count was read.
        assert!(page.counts.lock().unwrap().is_empty());
    }

    fn tab(name: &str, href: &str, aria: &str) -> TabDescriptor {
        TabDescriptor {
            name: name.into(),
            href: href.into(),
            aria_label: aria.into(),
        }
    }

    #[test]
    fn jobs_vocabulary_matches_any_descriptor_field() {
        assert!(descriptor_matches_jobs(&tab("Jobs", "", "")));
        assert!(descriptor_matches_jobs(&tab("", "https://x.example/jobs?q=rust", "")));
        assert!(descriptor_matches_jobs(&tab("", "", "Jobs near you")));
        assert!(!descriptor_matches_jobs(&tab("Images", "https://x.example/img", "")));
    }

    #[test]
    fn navigator_starts_idle() {
        let nav = Navigator::new();
        assert_eq!(nav.state(), NavState::Idle);
    }
}
