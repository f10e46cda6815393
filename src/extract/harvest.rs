//! In-page harvest scripts.
//!
//! Every script is an IIFE evaluated in the page context. Harvest scripts
//! return plain JSON (arrays of raw containers, tab descriptors, counts);
//! activation scripts mutate the page and return `{ success }`. Anything
//! interpolated into a script goes through [`sanitize_js_string`] first.

use crate::extract::{selectors, vocab};
use crate::renderer::UserInput;
use serde_json::json;

/// Shared helpers prepended to the harvest scripts.
const HELPERS: &str = r#"    const fieldText = (root, sel) => {
        const el = root.querySelector(sel);
        return el ? (el.innerText || '').trim() : '';
    };
    const anchorsOf = (root) => Array.from(root.querySelectorAll('a[href]')).map(a => ({
        text: (a.innerText || '').trim(),
        href: a.href,
        aria_label: (a.getAttribute('aria-label') || '').trim(),
    }));
    const harvest = (container, titleText, fields) => ({
        title_candidates: [titleText],
        company_candidates: fields.company.map(s => fieldText(container, s)),
        location_candidates: fields.location.map(s => fieldText(container, s)),
        description_candidates: fields.description.map(s => fieldText(container, s)),
        anchors: anchorsOf(container),
        text: (container.innerText || '').trim(),
    });"#;

fn field_table(company: &[&str], location: &[&str]) -> String {
    json!({
        "company": company,
        "location": location,
        "description": selectors::DESCRIPTION_SHAPES,
    })
    .to_string()
}

/// Harvest containers around every primary title marker. One container per
/// marker, resolved by a nearest-ancestor walk over the likely shapes.
pub fn primary_harvest_script() -> String {
    format!(
        r#"(() => {{
{helpers}
    const fields = {fields};
    const shapes = {shapes};
    const seen = new Set();
    const out = [];
    for (const marker of document.querySelectorAll({marker})) {{
        let container = null;
        for (const shape of shapes) {{
            const hit = marker.closest(shape);
            if (hit) {{ container = hit; break; }}
        }}
        if (!container) container = marker.parentElement || marker;
        if (seen.has(container)) continue;
        seen.add(container);
        out.push(harvest(container, (marker.innerText || '').trim(), fields));
    }}
    return out;
}})()"#,
        helpers = HELPERS,
        fields = field_table(selectors::PRIMARY_COMPANY, selectors::PRIMARY_LOCATION),
        shapes = json!(selectors::CONTAINER_SHAPES),
        marker = json!(selectors::PRIMARY_TITLE_MARKER),
    )
}

/// Broader shape scan for the fallback strategy. Elements without a
/// title-like heading are skipped; elements without descendant anchors get
/// their nearest ancestor anchor instead.
pub fn fallback_harvest_script() -> String {
    format!(
        r#"(() => {{
{helpers}
    const fields = {fields};
    const seen = new Set();
    const out = [];
    for (const shape of {shapes}) {{
        for (const el of document.querySelectorAll(shape)) {{
            if (seen.has(el)) continue;
            const heading = el.querySelector({heading});
            if (!heading) continue;
            seen.add(el);
            const item = harvest(el, (heading.innerText || '').trim(), fields);
            if (!item.anchors.length) {{
                const up = el.closest('a[href]');
                if (up) item.anchors = [{{
                    text: (up.innerText || '').trim(),
                    href: up.href,
                    aria_label: (up.getAttribute('aria-label') || '').trim(),
                }}];
            }}
            out.push(item);
        }}
    }}
    return out;
}})()"#,
        helpers = HELPERS,
        fields = field_table(selectors::FALLBACK_COMPANY, selectors::FALLBACK_LOCATION),
        shapes = json!(selectors::FALLBACK_SHAPES),
        heading = json!(selectors::FALLBACK_HEADING),
    )
}

/// Secondary heading rescan, run after the shape scan purely to catch
/// listings it missed. Same container resolution as the primary walk.
pub fn heading_rescan_script() -> String {
    format!(
        r#"(() => {{
{helpers}
    const fields = {fields};
    const shapes = {shapes};
    const seen = new Set();
    const out = [];
    for (const heading of document.querySelectorAll({rescan})) {{
        let container = null;
        for (const shape of shapes) {{
            const hit = heading.closest(shape);
            if (hit) {{ container = hit; break; }}
        }}
        if (!container) container = heading.parentElement || heading;
        if (seen.has(container)) continue;
        seen.add(container);
        const item = harvest(container, (heading.innerText || '').trim(), fields);
        if (!item.anchors.length) {{
            const up = container.closest('a[href]');
            if (up) item.anchors = [{{
                text: (up.innerText || '').trim(),
                href: up.href,
                aria_label: (up.getAttribute('aria-label') || '').trim(),
            }}];
        }}
        out.push(item);
    }}
    return out;
}})()"#,
        helpers = HELPERS,
        fields = field_table(selectors::FALLBACK_COMPANY, selectors::FALLBACK_LOCATION),
        shapes = json!(selectors::CONTAINER_SHAPES),
        rescan = json!(selectors::RESCAN_HEADINGS),
    )
}

/// List every selectable category/view control on the page.
pub fn tab_list_script() -> String {
    format!(
        r#"(() => Array.from(document.querySelectorAll({controls})).map(el => ({{
    name: (el.innerText || '').trim(),
    href: el.href || '',
    aria_label: (el.getAttribute('aria-label') || '').trim(),
}})))()"#,
        controls = json!(selectors::TAB_CONTROLS),
    )
}

/// Click the first control whose href, text, or label matches the jobs
/// vocabulary.
pub fn activate_tab_script() -> String {
    activation_script(selectors::TAB_CONTROLS, vocab::JOBS_VIEW, true)
}

/// Click the first load-more affordance, if any.
pub fn expand_listings_script() -> String {
    activation_script(selectors::LOAD_MORE_SHAPES, vocab::LOAD_MORE, false)
}

fn activation_script(controls: &str, words: &[&str], match_href: bool) -> String {
    let href_clause = if match_href {
        "matches(el.href) || "
    } else {
        ""
    };
    format!(
        r#"(() => {{
    const vocab = {vocab};
    const matches = (s) => {{
        s = (s || '').toLowerCase();
        return vocab.some(v => s.includes(v));
    }};
    for (const el of document.querySelectorAll({controls})) {{
        if ({href_clause}matches(el.innerText) || matches(el.getAttribute('aria-label'))) {{
            el.click();
            return {{ success: true }};
        }}
    }}
    return {{ success: false }};
}})()"#,
        vocab = json!(words),
        controls = json!(controls),
        href_clause = href_clause,
    )
}

/// Count primary title markers currently on the page.
pub fn count_markers_script() -> String {
    format!(
        "document.querySelectorAll({}).length",
        json!(selectors::PRIMARY_TITLE_MARKER)
    )
}

/// Snapshot the detail view after an activation: prefers the detail pane's
/// content, falls back to the active card, then the whole body. Anchors are
/// pane-first, then card.
pub fn detail_snapshot_script() -> String {
    format!(
        r#"(() => {{
{helpers}
    const fields = {fields};
    const pane = document.querySelector({pane});
    const card = document.querySelector({card});
    const scope = (pane && (pane.innerText || '').trim()) ? pane : (card || document.body);
    const item = harvest(scope, fieldText(scope, {heading}), fields);
    const anchors = [];
    if (pane) anchors.push(...anchorsOf(pane));
    if (card) anchors.push(...anchorsOf(card));
    if (anchors.length) item.anchors = anchors;
    return item;
}})()"#,
        helpers = HELPERS,
        fields = field_table(selectors::FALLBACK_COMPANY, selectors::FALLBACK_LOCATION),
        pane = json!(selectors::DETAIL_PANE),
        card = json!(selectors::ACTIVE_CARD),
        heading = json!(selectors::DETAIL_HEADING),
    )
}

/// Build the script for one simulated user interaction.
pub fn input_script(input: &UserInput) -> String {
    let (target, action) = match input {
        UserInput::Click(t) => (t, "el.click();".to_string()),
        UserInput::ScrollIntoView(t) => {
            (t, "el.scrollIntoView({ block: 'center' });".to_string())
        }
        UserInput::Type { target, text } => (
            target,
            format!(
                "el.value = '{}'; el.dispatchEvent(new Event('input', {{ bubbles: true }}));",
                sanitize_js_string(text)
            ),
        ),
    };
    let closest = if target.closest.is_empty() {
        String::new()
    } else {
        format!(
            "el = el.closest('{}') || el;",
            sanitize_js_string(&target.closest)
        )
    };
    format!(
        r#"(() => {{
    let el = document.querySelectorAll('{sel}')[{idx}];
    if (!el) return {{ success: false }};
    {closest}
    {action}
    return {{ success: true }};
}})()"#,
        sel = sanitize_js_string(&target.selector),
        idx = target.index,
        closest = closest,
        action = action,
    )
}

/// Probe used by `wait_for`: truthy once the selector matches.
pub fn exists_script(selector: &str) -> String {
    format!(
        "!!document.querySelector('{}')",
        sanitize_js_string(selector)
    )
}

/// Sanitize a string for safe injection into a JavaScript string literal.
///
/// Escapes everything that could break out of a JS string context:
/// backslashes, quotes, backticks, newlines, and angle brackets (so a
/// reflected value cannot smuggle a closing script tag). Null bytes are
/// stripped.
pub fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}
