use anyhow::Result;
use dom_query::{Document, Matcher, Selection};
use tracing::debug;

use crate::browser::DocPage;
use crate::candidates::first_match;
use crate::chapter::Chapter;
use crate::config::{Timing, CONTENT_SELECTORS, UNTITLED};
use crate::html::collapsed_text;
use crate::links::{absolutize_images, repair_links, UrlMap};
use crate::sanitizer::sanitize;

/// Size of the rendered body, sampled to tell when hydration has settled.
const BODY_SIZE_SCRIPT: &str = "document.body ? document.body.innerHTML.length : 0";

/// Loads `url` and turns it into a chapter.
///
/// `None` means the page is skipped: it failed to load, or it has no
/// recognizable content region. Neither stops the run.
pub async fn extract<P>(page: &P, url: &str, chapter_id: &str, url_map: &UrlMap, timing: &Timing) -> Option<Chapter>
where
    P: DocPage + ?Sized,
{
    match try_extract(page, url, chapter_id, url_map, timing).await {
        Ok(chapter) => chapter,
        Err(e) => {
            debug!("Extraction of {} failed: {}", url, e);
            None
        }
    }
}

async fn try_extract<P>(
    page: &P,
    url: &str,
    chapter_id: &str,
    url_map: &UrlMap,
    timing: &Timing,
) -> Result<Option<Chapter>>
where
    P: DocPage + ?Sized,
{
    page.navigate(url, timing.navigation).await?;
    page.wait_for_dom_ready(timing.navigation).await?;
    wait_for_hydration(page, timing).await;

    let html = page.rendered_html().await?;
    let page_title = page.current_title().await.ok().flatten();

    Ok(extract_from_html(&html, url, chapter_id, url_map, page_title.as_deref()))
}

/// Waits until the rendered body stops changing size, at most `timing.hydration`.
async fn wait_for_hydration<P>(page: &P, timing: &Timing)
where
    P: DocPage + ?Sized,
{
    let mut waited = std::time::Duration::ZERO;
    let mut previous = None;

    while waited < timing.hydration {
        page.wait(timing.hydration_poll).await;
        waited += timing.hydration_poll;

        let size = page.evaluate(BODY_SIZE_SCRIPT).await.ok();
        if size.is_some() && size == previous {
            debug!("Content settled after {:?}", waited);
            return;
        }
        previous = size;
    }
}

/// Runs content selection, sanitizing, link repair and title detection on
/// already-rendered HTML.
///
/// The page is parsed once; every step rewrites the content region in place
/// and it is serialized once at the end.
pub fn extract_from_html(
    html: &str,
    url: &str,
    chapter_id: &str,
    url_map: &UrlMap,
    page_title: Option<&str>,
) -> Option<Chapter> {
    let document = Document::from(html);
    let Some(content) = select_content(&document) else {
        debug!("No content selector matched {}", url);
        return None;
    };

    absolutize_images(&content, url);
    sanitize(&content);
    repair_links(&content, url, url_map);

    let (title, content) = anchor_chapter(&content, chapter_id, page_title);
    Some(Chapter {
        id: chapter_id.to_string(),
        title,
        content,
    })
}

/// The first element matched by the first content selector that matches anything.
pub fn select_content(document: &Document) -> Option<Selection<'_>> {
    first_match(CONTENT_SELECTORS, |candidate| {
        let matcher = Matcher::new(candidate).ok()?;
        let found = document.select_matcher(&matcher).first();
        found.exists().then_some(found)
    })
}

/// Picks the chapter title, makes sure `chapter_id` resolves inside the
/// content and serializes it.
///
/// The first `h1` supplies the title and receives the id. Otherwise the first
/// `h2` or the page title names the chapter and an empty marker carrying the
/// id is placed at the top.
fn anchor_chapter(content: &Selection, chapter_id: &str, page_title: Option<&str>) -> (String, String) {
    let h1 = content.select("h1").first();
    if h1.exists() {
        h1.set_attr("id", chapter_id);
        return (non_empty_or_untitled(&collapsed_text(&h1)), content.html().to_string());
    }

    let h2 = content.select("h2").first();
    let title = if h2.exists() {
        non_empty_or_untitled(&collapsed_text(&h2))
    } else {
        page_title
            .and_then(|t| t.split('|').next())
            .map(non_empty_or_untitled)
            .unwrap_or_else(|| UNTITLED.to_string())
    };

    (title, format!(r#"<div id="{}"></div>{}"#, chapter_id, content.html()))
}

fn non_empty_or_untitled(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}
