//! DOM evaluation scripts
//!
//! Selectors are embedded as JSON string literals so quoting in the
//! configured selector can never break the script.

use crate::core::config::SelectorConfig;

fn literal(selector: &str) -> String {
    serde_json::Value::String(selector.to_string()).to_string()
}

const VISIBLE_FN: &str = "const visible = el => { \
     const r = el.getBoundingClientRect(); \
     const s = window.getComputedStyle(el); \
     return r.width > 0 && r.height > 0 && s.display !== 'none' && s.visibility !== 'hidden'; \
     };";

/// Evaluates to `true` when the info panel is shown and has content
pub fn panel_visible(selectors: &SelectorConfig) -> String {
    format!(
        "(() => {{ {} const el = document.querySelector({}); \
         return !!el && visible(el) && el.textContent.trim().length > 0; }})()",
        VISIBLE_FN,
        literal(&selectors.info_panel)
    )
}

/// Evaluates to `{regions, marker}` for the visible info regions
pub fn album_probe(selectors: &SelectorConfig) -> String {
    format!(
        "(() => {{ {} const regions = Array.from(document.querySelectorAll({})).filter(visible); \
         const marker = regions.length === 1 && regions[0].querySelector({}) !== null; \
         return {{ regions: regions.length, marker }}; }})()",
        VISIBLE_FN,
        literal(&selectors.info_region),
        literal(&selectors.album_marker)
    )
}

/// Evaluates to `true` on the landing grid rather than a single item
pub fn home_page(selectors: &SelectorConfig) -> String {
    format!(
        "(() => {{ const path = window.location.pathname.replace(/^\\/u\\/\\d+/, ''); \
         const atRoot = path === '' || path === '/'; \
         return atRoot && document.querySelector({}) !== null; }})()",
        literal(&selectors.grid_cell)
    )
}

/// Clicks the injected previous-item control; `false` if it is missing
pub fn click_previous(selectors: &SelectorConfig) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); \
         if (!el) return false; el.click(); return true; }})()",
        literal(&selectors.previous_control)
    )
}

/// Moves keyboard focus onto the first grid cell; `false` if there is none
pub fn focus_first_cell(selectors: &SelectorConfig) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); \
         if (!el) return false; el.focus(); return true; }})()",
        literal(&selectors.grid_cell)
    )
}

/// Evaluates to the link behind the focused element, or `null`
pub const FOCUSED_LINK: &str = "(() => { const el = document.activeElement; \
     const a = el && el.closest ? el.closest('a') : null; \
     return a && a.href ? a.href : null; })()";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_quoted() {
        let selectors = SelectorConfig {
            previous_control: r#"div[aria-label="View previous photo"]"#.to_string(),
            ..SelectorConfig::default()
        };
        let script = click_previous(&selectors);
        assert!(script.contains(r#""div[aria-label=\"View previous photo\"]""#));
    }

    #[test]
    fn test_album_probe_uses_both_selectors() {
        let selectors = SelectorConfig::default();
        let script = album_probe(&selectors);
        assert!(script.contains("regions.length === 1"));
        assert!(script.contains("/album/"));
    }
}
