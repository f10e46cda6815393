//! Browser boundary: the four page capabilities the pipeline depends on.
//!
//! Defines the `Renderer` and `PageContext` traits that abstract over the
//! browser engine (currently Chromium via chromiumoxide). All extraction and
//! navigation logic is expressed purely in terms of `navigate`, `evaluate`,
//! `wait_for`, and `simulate_input`, so the whole pipeline can run against a
//! scripted page in tests.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures that abort the run before any extraction happens.
///
/// Everything past bootstrap degrades instead of failing; these are the only
/// errors the binary reports as fatal.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Chromium not found; set JOBSCOUT_CHROMIUM_PATH or install Chrome")]
    ChromiumNotFound,
    #[error("failed to launch Chromium: {0}")]
    Launch(String),
}

/// How long to wait after a navigation commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Return once the load event fires.
    Load,
    /// Wait for a follow-up navigation to settle as well (client-side
    /// redirects after tab switches).
    Settled,
}

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// An element target for simulated input.
///
/// `index` picks among multiple matches; `closest` (when non-empty) resolves
/// the matched element up to its nearest ancestor of that shape before
/// acting, falling back to the element itself.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub selector: String,
    pub index: usize,
    pub closest: String,
}

impl Target {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn within_closest(mut self, shape: impl Into<String>) -> Self {
        self.closest = shape.into();
        self
    }
}

/// A simulated user interaction.
#[derive(Debug, Clone)]
pub enum UserInput {
    Click(Target),
    ScrollIntoView(Target),
    Type { target: Target, text: String },
}

/// A browser engine that can create page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new page context (tab).
    async fn new_page(&self) -> Result<Box<dyn PageContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
}

/// A single controlled page. Shared mutable state: every call is an ordered,
/// blocking step and no two calls may run concurrently.
#[async_trait]
pub trait PageContext: Send + Sync {
    /// Navigate to a URL. The only capability allowed to fail fatally, and
    /// only during bootstrap; later callers degrade on error.
    async fn navigate(
        &mut self,
        url: &str,
        policy: WaitPolicy,
        timeout_ms: u64,
    ) -> Result<NavigationResult>;

    /// Evaluate a script against the current content tree and return its
    /// JSON result. Side effects are visible only inside the page.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Wait until a selector matches or the timeout elapses. Timeout is
    /// reported as `Ok(false)`, never as an error.
    async fn wait_for(&self, selector: &str, timeout_ms: u64) -> Result<bool>;

    /// Simulate user input against a target. Returns whether the target was
    /// found and acted on.
    async fn simulate_input(&self, input: &UserInput) -> Result<bool>;

    /// Full serialized HTML of the current page.
    async fn html(&self) -> Result<String>;

    /// Current URL.
    async fn url(&self) -> Result<String>;

    /// Close this page.
    async fn close(self: Box<Self>) -> Result<()>;
}
