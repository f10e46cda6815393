//! jobscout — resilient structured extraction of job listings from live
//! rendered pages.
//!
//! The pipeline drives a controlled browser page through a fixed sequence:
//! navigate to the search view, switch to the jobs view, expand the listing
//! set once, harvest candidate containers through a two-tier strategy chain,
//! deduplicate, optionally drill into each listing's detail pane, and resolve
//! a canonical external link per record through a secondary search view.
//!
//! This library crate exposes the core modules for integration testing.

pub mod detail;
pub mod enrich;
pub mod extract;
pub mod model;
pub mod nav;
pub mod pipeline;
pub mod renderer;
