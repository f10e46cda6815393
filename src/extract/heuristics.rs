//! Text-shape heuristics for the fallback strategy.
//!
//! These run over harvested candidate texts and decide which candidate, if
//! any, is a plausible company, location, or description. Vocabulary lives
//! in constants so the lists stay data-driven.

use regex::Regex;
use std::sync::OnceLock;

/// Words that mark a candidate as a location rather than a company.
pub const LOCATION_VOCAB: &[&str] = &[
    "remote",
    "hybrid",
    "on-site",
    "onsite",
    "anywhere",
    "work from home",
];

/// Maximum length for a plausible company name.
const COMPANY_MAX_LEN: usize = 100;

/// Minimum length for a plausible description.
const DESCRIPTION_MIN_LEN: usize = 20;

fn relative_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*\d+\+?\s*(second|minute|hour|day|week|month|year)s?\s+ago\s*$")
            .unwrap()
    })
}

fn city_region_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // "City, Region" shape: capitalized token(s), comma, capitalized
        // token(s). "Berlin, Germany", "Austin, TX".
        Regex::new(r"^[A-Z][A-Za-z .'()-]*,\s*[A-Z][A-Za-z .'()-]*$").unwrap()
    })
}

/// "2 days ago", "30+ minutes ago" and friends.
pub fn is_relative_time(s: &str) -> bool {
    relative_time_re().is_match(s)
}

/// Contains place/remote vocabulary or matches the "City, Region" shape.
pub fn looks_like_location(s: &str) -> bool {
    contains_location_vocab(s) || city_region_re().is_match(s.trim())
}

fn contains_location_vocab(s: &str) -> bool {
    let lower = s.to_lowercase();
    LOCATION_VOCAB.iter().any(|v| lower.contains(v))
}

/// First candidate that is non-empty, short enough, free of location
/// vocabulary, and not a relative-time string. The "City, Region" shape is
/// deliberately not excluded here; company names like "Acme, Inc" share it.
pub fn pick_company(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| {
            !c.is_empty()
                && c.chars().count() < COMPANY_MAX_LEN
                && !contains_location_vocab(c)
                && !is_relative_time(c)
        })
        .unwrap_or_default()
        .to_string()
}

/// First candidate that looks like a location and is not the already-chosen
/// company.
pub fn pick_location(candidates: &[String], company: &str) -> String {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| !c.is_empty() && *c != company && looks_like_location(c))
        .unwrap_or_default()
        .to_string()
}

/// First candidate long enough to be prose and distinct from the fields
/// already captured.
pub fn pick_description(
    candidates: &[String],
    title: &str,
    company: &str,
    location: &str,
) -> String {
    candidates
        .iter()
        .map(|c| c.trim())
        .find(|c| plausible_description(c, title, company, location))
        .unwrap_or_default()
        .to_string()
}

/// Line-splitting fallback over the container's full text. Same constraints
/// as [`pick_description`], plus lines mentioning apply/view affordances are
/// skipped.
pub fn description_from_text(text: &str, title: &str, company: &str, location: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| {
            let lower = line.to_lowercase();
            plausible_description(line, title, company, location)
                && !lower.contains("apply")
                && !lower.contains("view")
        })
        .unwrap_or_default()
        .to_string()
}

fn plausible_description(s: &str, title: &str, company: &str, location: &str) -> bool {
    s.chars().count() >= DESCRIPTION_MIN_LEN
        && s != title
        && s != company
        && s != location
        && !is_relative_time(s)
}
