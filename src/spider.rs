use std::collections::HashSet;

use colored::*;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::browser::DocPage;
use crate::config::{Timing, MIN_LINKS};
use crate::links::canonical_url;

/// Origin and path of `actual_url`: no query, no fragment, no trailing slash.
pub fn base_prefix(actual_url: &str) -> String {
    let without_query = actual_url.split('?').next().unwrap_or_default();
    let without_fragment = without_query.split('#').next().unwrap_or_default();
    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
        .to_string()
}

/// Accumulates unique, in-scope links in first-seen order.
#[derive(Debug, Clone)]
pub struct LinkCollector {
    actual_url: String,
    base_prefix: String,
    links: Vec<String>,
    seen: HashSet<String>,
}

impl LinkCollector {
    pub fn new(actual_url: &str) -> Self {
        let actual_url = canonical_url(actual_url);
        let base_prefix = base_prefix(&actual_url);
        Self {
            actual_url,
            base_prefix,
            links: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn base_prefix(&self) -> &str {
        &self.base_prefix
    }

    /// Adds `raw` if it is a new page under the base prefix. Returns whether it was added.
    pub fn offer(&mut self, raw: &str) -> bool {
        let link = canonical_url(raw.trim());
        if !link.starts_with(&self.base_prefix) {
            return false;
        }
        if link == self.actual_url
            || link == self.base_prefix
            || link.strip_suffix('/') == Some(self.base_prefix.as_str())
        {
            return false;
        }
        if !self.seen.insert(link.clone()) {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Offers every link in `raw`, returning how many were new.
    pub fn absorb<'a>(&mut self, raw: impl IntoIterator<Item = &'a str>) -> usize {
        raw.into_iter().filter(|link| self.offer(link)).count()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}

/// Where to look for chapter links, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Anchors inside the sidebar, or the nearest `aside`/`nav`.
    Sidebar,
    /// Anchors inside a Sphinx-style `.toctree-wrapper`.
    TocWrapper,
    /// Every anchor in the main content region, or the whole body.
    Nuclear,
}

impl Strategy {
    /// Tiers in the order `discover` runs them. Links found by a tier are
    /// kept when the next one runs, so a later tier only adds to the
    /// collection; the first tier that lifts it to `MIN_LINKS` ends discovery.
    pub const ALL: [Strategy; 3] = [Strategy::Sidebar, Strategy::TocWrapper, Strategy::Nuclear];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Sidebar => "Strategy A: Sidebar",
            Strategy::TocWrapper => "Strategy B: TOC Wrapper",
            Strategy::Nuclear => "Strategy C: Nuclear",
        }
    }

    /// Script returning the resolved `href` of every anchor the strategy covers.
    pub fn script(&self, sidebar_selector: &str) -> String {
        match self {
            Strategy::Sidebar => format!(
                r#"(() => {{
                    const el = {container};
                    return el ? Array.from(el.querySelectorAll('a')).map(a => a.href) : [];
                }})()"#,
                container = sidebar_container_js(sidebar_selector),
            ),
            Strategy::TocWrapper => {
                "Array.from(document.querySelectorAll('.toctree-wrapper a')).map(a => a.href)"
                    .to_string()
            }
            Strategy::Nuclear => r#"(() => {
                    const el = document.querySelector('main') || document.querySelector('div.body') || document.body;
                    return el ? Array.from(el.querySelectorAll('a')).map(a => a.href) : [];
                })()"#
                .to_string(),
        }
    }
}

/// JS expression for the sidebar element, falling back to `aside` then `nav`.
fn sidebar_container_js(sidebar_selector: &str) -> String {
    // A JSON string literal is also a valid JS string literal.
    let literal = serde_json::to_string(sidebar_selector).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "(document.querySelector({}) || document.querySelector('aside') || document.querySelector('nav'))",
        literal
    )
}

/// Clicks collapsed menu groups inside the sidebar so lazy children render.
pub fn expand_menus_script(sidebar_selector: &str) -> String {
    format!(
        r#"(() => {{
            const sidebar = {container};
            if (!sidebar) return {{ clicked: 0 }};
            const expanders = sidebar.querySelectorAll([
                'li[role="link"]',
                '.menu-item-type-group',
                '.menu__list-item--collapsed > .menu__link',
                '.menu__link--sublist[aria-expanded="false"]',
                'button[aria-expanded="false"]',
                '[role="button"][aria-expanded="false"]'
            ].join(', '));
            let clicked = 0;
            for (const el of expanders) {{
                try {{ el.click(); clicked += 1; }} catch (e) {{}}
            }}
            return {{ clicked }};
        }})()"#,
        container = sidebar_container_js(sidebar_selector),
    )
}

#[derive(Debug, Deserialize)]
struct ExpandReport {
    clicked: usize,
}

/// Collects the chapter links reachable from the start page's navigation.
///
/// Returns an empty list when navigation fails or nothing usable is found;
/// the caller decides whether that is fatal.
pub async fn discover<P>(page: &P, start_url: &str, sidebar_selector: &str, timing: &Timing) -> Vec<String>
where
    P: DocPage + ?Sized,
{
    info!("Spider: navigating to {}", start_url.green());

    if let Err(e) = page.navigate(start_url, timing.navigation).await {
        error!("Spider error: {}", e);
        return Vec::new();
    }
    if let Err(e) = page.wait_for_dom_ready(timing.navigation).await {
        error!("Spider error: {}", e);
        return Vec::new();
    }

    let actual_url = match page.current_url().await {
        Ok(url) => url,
        Err(e) => {
            warn!("Could not read the post-navigation URL, using the start URL: {}", e);
            start_url.to_string()
        }
    };
    if actual_url != start_url {
        info!("Redirected to: {}", actual_url.green());
    }

    expand_menus(page, sidebar_selector, timing).await;

    let mut collector = LinkCollector::new(&actual_url);
    debug!("Base prefix: {}", collector.base_prefix());

    for strategy in Strategy::ALL {
        if collector.len() >= MIN_LINKS {
            break;
        }
        info!("{}...", strategy.label());

        let raw = match run_strategy(page, strategy, sidebar_selector).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("{} failed: {}", strategy.label(), e);
                continue;
            }
        };
        let added = collector.absorb(raw.iter().map(String::as_str));
        info!("   Found {} raw, {} new valid links.", raw.len(), added);
    }

    collector.into_links()
}

async fn expand_menus<P>(page: &P, sidebar_selector: &str, timing: &Timing)
where
    P: DocPage + ?Sized,
{
    info!("Attempting to expand sidebar menus ({})...", sidebar_selector);
    let report = page
        .evaluate(&expand_menus_script(sidebar_selector))
        .await
        .and_then(|value| serde_json::from_value::<ExpandReport>(value).map_err(Into::into));

    match report {
        Ok(report) => {
            debug!("Clicked {} menu expanders", report.clicked);
            page.wait(timing.menu_expansion).await;
        }
        Err(e) => warn!("Expander warning: {}", e),
    }
}

async fn run_strategy<P>(page: &P, strategy: Strategy, sidebar_selector: &str) -> anyhow::Result<Vec<String>>
where
    P: DocPage + ?Sized,
{
    let value = page.evaluate(&strategy.script(sidebar_selector)).await?;
    Ok(serde_json::from_value(value)?)
}
