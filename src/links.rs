use std::collections::HashMap;

use dom_query::Selection;
use url::Url;

use crate::chapter::chapter_id;
use crate::config::INTERNAL_LINK_CLASS;

/// Absolute URL with its fragment removed.
///
/// Strings that do not parse as URLs are cut at the first `#`.
pub fn canonical_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.split('#').next().unwrap_or_default().to_string(),
    }
}

/// Resolves `href` against `base` and drops the fragment.
pub fn resolve_canonical(base: &Url, href: &str) -> Option<String> {
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// Canonical page URL → chapter id, fixed before any page is extracted.
#[derive(Debug, Clone, Default)]
pub struct UrlMap {
    ids: HashMap<String, String>,
}

impl UrlMap {
    /// Assigns `chap_<i>` to each link in order.
    pub fn from_links(links: &[String]) -> Self {
        let ids = links
            .iter()
            .enumerate()
            .map(|(index, link)| (canonical_url(link), chapter_id(index)))
            .collect();
        Self { ids }
    }

    pub fn chapter_id(&self, url: &str) -> Option<&str> {
        self.ids.get(&canonical_url(url)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Points anchors at captured pages to their in-document chapter anchor.
///
/// Fragment-only and empty hrefs are left alone, as are targets the map does
/// not know about.
pub fn repair_links(content: &Selection, page_url: &str, url_map: &UrlMap) {
    let Ok(base) = Url::parse(page_url) else {
        return;
    };

    for link in content.select("a[href]").iter() {
        let target = link
            .attr("href")
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty() && !href.starts_with('#'))
            .and_then(|href| resolve_canonical(&base, &href))
            .and_then(|canonical| url_map.chapter_id(&canonical).map(str::to_string));

        if let Some(id) = target {
            let href = format!("#{}", id);
            link.set_attr("href", href.as_str());
            link.add_class(INTERNAL_LINK_CLASS);
        }
    }
}

/// Rewrites every `img[src]` to an absolute URL resolved against the page.
pub fn absolutize_images(content: &Selection, page_url: &str) {
    let Ok(base) = Url::parse(page_url) else {
        return;
    };

    for image in content.select("img[src]").iter() {
        let absolute = image
            .attr("src")
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
            .and_then(|src| base.join(&src).ok());
        if let Some(absolute) = absolute {
            image.set_attr("src", absolute.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::attributes_of;
    use dom_query::Document;

    const PAGE: &str = "https://docs.example.com/guide/intro";

    fn map() -> UrlMap {
        UrlMap::from_links(&[
            "https://docs.example.com/guide/intro".to_string(),
            "https://docs.example.com/guide/install".to_string(),
            "https://docs.example.com/guide/api/".to_string(),
        ])
    }

    fn repaired(html: &str) -> Document {
        let doc = Document::from(html);
        repair_links(&doc.select("body"), PAGE, &map());
        doc
    }

    fn link_attr(doc: &Document, text: &str, name: &str) -> Option<String> {
        doc.select("a")
            .iter()
            .find(|a| &*a.text() == text)
            .and_then(|a| a.attr(name))
            .map(|value| value.to_string())
    }

    #[test]
    fn map_assigns_ids_in_link_order() {
        let map = map();
        assert_eq!(map.len(), 3);
        assert_eq!(map.chapter_id("https://docs.example.com/guide/intro"), Some("chap_0"));
        assert_eq!(map.chapter_id("https://docs.example.com/guide/install#linux"), Some("chap_1"));
        assert_eq!(map.chapter_id("https://docs.example.com/guide/api/"), Some("chap_2"));
        assert_eq!(map.chapter_id("https://docs.example.com/guide/other"), None);
    }

    #[test]
    fn relative_and_forward_references_become_anchors() {
        let doc = repaired(r#"<p><a href="install#linux">Install</a> then <a href="../guide/api/">API</a></p>"#);

        assert_eq!(link_attr(&doc, "Install", "href").as_deref(), Some("#chap_1"));
        assert_eq!(link_attr(&doc, "Install", "class").as_deref(), Some(INTERNAL_LINK_CLASS));
        assert_eq!(link_attr(&doc, "API", "href").as_deref(), Some("#chap_2"));
        assert_eq!(link_attr(&doc, "API", "class").as_deref(), Some(INTERNAL_LINK_CLASS));
    }

    #[test]
    fn existing_classes_are_kept_next_to_marker() {
        let doc = repaired(r#"<a class="note" href="/guide/install">x</a>"#);
        let class = link_attr(&doc, "x", "class").unwrap_or_default();
        let classes: Vec<&str> = class.split_whitespace().collect();
        assert_eq!(classes, vec!["note", INTERNAL_LINK_CLASS]);
    }

    #[test]
    fn unknown_and_fragment_links_are_untouched() {
        let doc = repaired(
            r##"<a href="https://github.com/example">GitHub</a><a href="#section">Here</a><a href="/blog/">Blog</a><a href="mailto:a@b.c">Mail</a>"##,
        );

        assert_eq!(link_attr(&doc, "GitHub", "href").as_deref(), Some("https://github.com/example"));
        assert_eq!(link_attr(&doc, "Here", "href").as_deref(), Some("#section"));
        assert_eq!(link_attr(&doc, "Blog", "href").as_deref(), Some("/blog/"));
        assert_eq!(link_attr(&doc, "Mail", "href").as_deref(), Some("mailto:a@b.c"));
        assert!(doc.select("a.internal-link").is_empty());
    }

    #[test]
    fn repair_is_stable_when_run_twice() {
        let doc = repaired(r#"<a href="install">Install</a><a href="https://elsewhere.org/">Out</a>"#);
        let once = doc.select("body").inner_html().to_string();

        repair_links(&doc.select("body"), PAGE, &map());
        assert_eq!(doc.select("body").inner_html().to_string(), once);
        assert_eq!(doc.select("a.internal-link").length(), 1);
    }

    #[test]
    fn images_become_absolute() {
        let doc = Document::from(
            r#"<p><img src="../_images/arch.png"><img src="https://cdn.example.com/x.svg"><img alt="none"></p>"#,
        );
        absolutize_images(&doc.select("body"), PAGE);

        let sources: Vec<Option<String>> = doc
            .select("img")
            .iter()
            .map(|img| img.attr("src").map(|src| src.to_string()))
            .collect();
        assert_eq!(
            sources,
            vec![
                Some("https://docs.example.com/_images/arch.png".to_string()),
                Some("https://cdn.example.com/x.svg".to_string()),
                None,
            ]
        );
        assert_eq!(attributes_of(&doc.select("img[alt]")).len(), 1);
    }

    #[test]
    fn canonical_url_strips_fragment_only() {
        assert_eq!(canonical_url("https://a.io/x/y?q=1#frag"), "https://a.io/x/y?q=1");
        assert_eq!(canonical_url("not a url#frag"), "not a url");
    }
}
