use std::path::PathBuf;
use std::time::Duration;

/// Sidebar selector used when neither the user nor a preset supplies one.
pub const DEFAULT_SELECTOR: &str = "div.sphinxsidebar";
pub const DEFAULT_OUTPUT: &str = "manual.pdf";
pub const DEFAULT_TITLE: &str = "Documentation";
pub const UNTITLED: &str = "Untitled";

/// Known documentation hosts and the sidebar that lists their pages.
///
/// Order matters: the first key found inside the URL wins.
pub const SITE_PRESETS: &[(&str, &str)] = &[
    ("flask.palletsprojects.com", "div.sphinxsidebar"),
    ("react.dev", "nav[aria-label='Main']"),
    ("playwright.dev", ".menu__list"),
    ("docs.python.org", "div.sphinxsidebar"),
    ("readthedocs.io", "div.sphinxsidebar"),
    ("django", "#docs-content"),
];

/// Candidates for the main content region, most specific first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "[data-component-name='Layout/DocumentationLayout']",
    ".redoc-wrap",
    ".api-content",
    "div.document",
    "div[itemprop='articleBody']",
    "div.body",
    "section",
    "main",
    "article",
    ".markdown-section",
    ".theme-doc-markdown",
];

/// Chrome that never belongs in a printed chapter.
pub const STRIPPED_SELECTORS: &[&str] = &[
    "a.headerlink",
    ".toctree-wrapper",
    ".rst-footer-buttons",
    ".wy-breadcrumbs",
    "div[role='navigation']",
    "script",
    "style",
    ".exclude-print",
    "nav",
    "button",
    "div[class*='PageActions']",
    "div[class*='PageNavigation']",
    "div[class*='Feedback']",
];

pub const ALLOWED_ATTRIBUTES: &[&str] = &["src", "href", "colspan", "rowspan", "id", "class"];

/// Callout classes kept so the stylesheet can still color them.
pub const ADMONITION_CLASSES: &[&str] = &[
    "admonition",
    "note",
    "warning",
    "tip",
    "attention",
    "caution",
    "danger",
    "error",
    "admonition-title",
];

/// Class stamped on anchors that were rewritten to point inside the document.
pub const INTERNAL_LINK_CLASS: &str = "internal-link";

/// Discovery stops falling back once this many unique links are known.
pub const MIN_LINKS: usize = 3;

#[derive(Debug, Clone)]
pub struct Timing {
    pub navigation: Duration,
    /// Upper bound on waiting for client-side rendering to settle.
    pub hydration: Duration,
    pub hydration_poll: Duration,
    pub menu_expansion: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(60),
            hydration: Duration::from_millis(2000),
            hydration_poll: Duration::from_millis(250),
            menu_expansion: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub scale: f64,
    pub print_background: bool,
    pub prefer_css_page_size: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

/// Everything a single run needs, usually built from the command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub sidebar_selector: String,
    pub output: PathBuf,
    pub title: String,
    /// Maximum number of chapters to extract, `0` meaning all of them.
    pub limit: usize,
    pub visible: bool,
    pub timing: Timing,
    pub pdf: PdfOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            sidebar_selector: DEFAULT_SELECTOR.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            title: DEFAULT_TITLE.to_string(),
            limit: 0,
            visible: false,
            timing: Timing::default(),
            pdf: PdfOptions::default(),
        }
    }
}
