use colored::*;
use tracing::info;

use crate::candidates::first_match_or;
use crate::config::SITE_PRESETS;

/// Picks the sidebar selector for `url`.
///
/// A user selector that differs from `default_selector` always wins. One that
/// equals the default is treated as unset, so the preset table is consulted.
pub fn resolve_selector(url: &str, user_selector: &str, default_selector: &str) -> String {
    if !user_selector.is_empty() && user_selector != default_selector {
        return user_selector.to_string();
    }

    first_match_or(SITE_PRESETS.iter(), default_selector.to_string(), |(domain, selector)| {
        if url.contains(domain) {
            info!("Auto-detected preset for {}: {}", domain.green(), selector);
            Some(selector.to_string())
        } else {
            None
        }
    })
}

/// Value parser for `--selector`: trims and rejects blank strings.
///
/// The selector only ever runs inside the browser, which is the judge of its
/// syntax. One Chromium cannot parse makes the sidebar strategy find nothing
/// and discovery falls through to the next strategy.
pub fn parse_selector(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Selector must not be empty.".to_string());
    }
    Ok(trimmed.to_string())
}
