use std::collections::HashMap;

use chrono::NaiveDate;
use dom_query::Document;

use crate::chapter::Chapter;
use crate::html::body_markup;

/// Chapter id → 1-based page of the printed document.
pub type PageNumbers = HashMap<String, usize>;

/// Forced break emitted before every chapter.
pub const PAGE_BREAK: &str = r#"<div style="page-break-before: always;"></div>"#;

pub const STYLESHEET: &str = r#"
    @page {
        size: A4; margin: 1.5cm; margin-bottom: 2.5cm;
        @bottom-center {
            content: "Page " counter(page);
            font-family: sans-serif; font-size: 9pt; color: #7f8c8d;
            border-top: 1px solid #eee; padding-top: 10px; width: 100%;
        }
    }
    @page cover { margin: 0; @bottom-center { content: none; } }

    * { box-sizing: border-box; max-width: 100% !important; }
    body { font-family: sans-serif; font-size: 10pt; line-height: 1.6; color: #333; text-align: justify; }

    img { max-width: 100% !important; height: auto !important; display: block; margin: 1.5em auto; border: 1px solid #e1e4e8; page-break-inside: avoid; }
    pre { background: #f6f8fa; padding: 12px; border: 1px solid #e1e4e8; border-radius: 4px; font-family: monospace; font-size: 8.5pt; white-space: pre-wrap !important; word-break: break-all !important; page-break-inside: avoid; }

    h1 { border-bottom: 2px solid #2c3e50; padding-bottom: 5px; margin-top: 0; color: #2c3e50; page-break-after: avoid; }
    h2 { border-bottom: 1px solid #eee; margin-top: 2em; color: #e67e22; page-break-after: avoid; }

    .cover-page { page: cover; text-align: center; padding-top: 35%; height: 100%; page-break-after: always; }
    .cover-title { font-size: 36pt; font-weight: bold; color: #2c3e50; border-bottom: 4px solid #2c3e50; display: inline-block; margin-bottom: 20px; }
    .cover-subtitle { font-size: 18pt; color: #7f8c8d; }
    .cover-footer { font-size: 10pt; color: #95a5a6; margin-top: 100px; }

    .toc-page { page: cover; page-break-before: always; page-break-after: always; padding: 2em; }
    .toc-header { text-align: center; font-size: 24pt; margin-bottom: 2em; border-bottom: 2px solid #eee; }
    ul.toc-list { list-style-type: none; padding: 0; }
    li.toc-entry { margin-bottom: 0.5em; }
    a.toc-link { text-decoration: none; color: #333; display: flex; align-items: baseline; }
    .toc-leader { flex: 1; margin: 0 0.4em; border-bottom: 1px dotted #bdc3c7; }
    .toc-number { color: #7f8c8d; }

    a.internal-link { color: #2980b9; text-decoration: none; border-bottom: 1px dotted #2980b9; }

    .admonition { padding: 12px; margin-bottom: 15px; border: 1px solid #eee; border-left-width: 5px; border-radius: 4px; page-break-inside: avoid; }
    .admonition-title { font-weight: bold; display: block; margin-bottom: 5px; text-transform: uppercase; font-size: 0.9em; }
    .note { background-color: #e7f2fa; border-left-color: #6ab0de; }
    .tip { background-color: #e9f7ef; border-left-color: #27ae60; }
    .warning, .attention, .caution { background-color: #fff3cd; border-left-color: #ffc107; }
    .danger, .error { background-color: #fdecea; border-left-color: #e74c3c; }

    table { width: 100% !important; border-collapse: collapse; margin-bottom: 1.5em; font-size: 9pt; table-layout: fixed; }
    td, th { border: 1px solid #ddd; padding: 8px; word-wrap: break-word; word-break: break-word; vertical-align: top; }
    th { background-color: #f8f9fa; font-weight: bold; color: #2c3e50; }
    tr { page-break-inside: avoid; }
"#;

const COVER: &str = r#"<div class="cover-page"><div class="cover-title"></div><div class="cover-subtitle"></div><div class="cover-footer"></div></div>"#;

const TOC: &str = r#"<div class="toc-page"><div class="toc-header">Table of Contents</div><ul class="toc-list"></ul></div>"#;

const TOC_ENTRY: &str = r#"<li class="toc-entry"><a class="toc-link"><span class="toc-title"></span><span class="toc-leader"></span><span class="toc-number"></span></a></li>"#;

pub fn cover_html(title: &str, subtitle: &str, generated_on: NaiveDate) -> String {
    let document = Document::from(COVER);
    document.select("div.cover-title").set_text(title);
    document.select("div.cover-subtitle").set_text(subtitle);
    let footer = format!("Generated on: {}", generated_on.format("%B %d, %Y"));
    document.select("div.cover-footer").set_text(footer.as_str());
    body_markup(&document)
}

/// One entry per chapter, in order. Entries without a known page get an
/// empty number.
pub fn toc_html(chapters: &[Chapter], page_numbers: &PageNumbers) -> String {
    let document = Document::from(TOC);
    let list = document.select("ul.toc-list");
    for _ in chapters {
        list.append_html(TOC_ENTRY);
    }

    for (link, chapter) in document.select("a.toc-link").iter().zip(chapters) {
        let href = format!("#{}", chapter.id);
        link.set_attr("href", href.as_str());
        link.select("span.toc-title").set_text(chapter.title.as_str());
        if let Some(page) = page_numbers.get(&chapter.id) {
            let page = page.to_string();
            link.select("span.toc-number").set_text(page.as_str());
        }
    }
    body_markup(&document)
}

fn title_html(title: &str) -> String {
    let document = Document::from("<title></title>");
    let element = document.select("title");
    element.set_text(title);
    element.html().to_string()
}

/// Builds the complete printable document, dated today, without page numbers.
pub fn assemble(title: &str, start_url: &str, chapters: &[Chapter]) -> String {
    assemble_on(
        title,
        start_url,
        chapters,
        chrono::Local::now().date_naive(),
        &PageNumbers::new(),
    )
}

/// Cover, table of contents and every chapter behind a page break, in
/// exactly the order of `chapters`.
pub fn assemble_on(
    title: &str,
    start_url: &str,
    chapters: &[Chapter],
    generated_on: NaiveDate,
    page_numbers: &PageNumbers,
) -> String {
    let mut body = cover_html(title, start_url, generated_on);
    body.push_str(&toc_html(chapters, page_numbers));
    for chapter in chapters {
        body.push_str(PAGE_BREAK);
        body.push_str(&chapter.content);
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    {}
    <style>{}</style>
</head>
<body>{}</body>
</html>
"#,
        title_html(title),
        STYLESHEET,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn chapter(index: usize, title: &str, content: &str) -> Chapter {
        Chapter {
            id: format!("chap_{}", index),
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn texts(doc: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        doc.select(&selector).map(|el| el.text().collect()).collect()
    }

    #[test]
    fn cover_shows_title_url_and_date() {
        let cover = cover_html("Flask <3", "https://flask.palletsprojects.com/", date());
        assert!(cover.contains("Flask &lt;3"));
        assert!(cover.contains("https://flask.palletsprojects.com/"));
        assert!(cover.contains("Generated on: March 09, 2024"));
    }

    #[test]
    fn toc_entries_match_body_anchors_one_to_one() {
        // chap_1 failed extraction and is simply absent.
        let chapters = vec![
            chapter(0, "Intro", r#"<main><h1 id="chap_0">Intro</h1></main>"#),
            chapter(2, "Install & Run", r#"<div id="chap_2"></div><article><h2>Install</h2></article>"#),
            chapter(3, "API", r#"<main><h1 id="chap_3">API</h1></main>"#),
        ];
        let doc = Html::parse_document(&assemble_on("Docs", "https://x.io/", &chapters, date(), &PageNumbers::new()));

        let toc_links = Selector::parse("ul.toc-list a.toc-link").unwrap();
        let targets: Vec<String> = doc
            .select(&toc_links)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect();
        assert_eq!(targets, vec!["#chap_0", "#chap_2", "#chap_3"]);

        for target in &targets {
            let by_id = Selector::parse(target).unwrap();
            assert_eq!(doc.select(&by_id).count(), 1, "{target}");
        }

        assert_eq!(texts(&doc, "a.toc-link .toc-title"), vec!["Intro", "Install & Run", "API"]);
        assert_eq!(texts(&doc, "a.toc-link .toc-number"), vec!["", "", ""]);
        assert_eq!(texts(&doc, "title"), vec!["Docs"]);
    }

    #[test]
    fn page_numbers_land_in_their_toc_entries() {
        let chapters = vec![
            chapter(0, "Intro", "<p>a</p>"),
            chapter(1, "Install", "<p>b</p>"),
            chapter(2, "API", "<p>c</p>"),
        ];
        let numbers: PageNumbers = [("chap_0".to_string(), 3), ("chap_2".to_string(), 11)]
            .into_iter()
            .collect();
        let doc = Html::parse_document(&assemble_on("Docs", "https://x.io/", &chapters, date(), &numbers));

        assert_eq!(texts(&doc, "a.toc-link .toc-number"), vec!["3", "", "11"]);
        assert_eq!(texts(&doc, "a.toc-link .toc-title"), vec!["Intro", "Install", "API"]);
    }

    #[test]
    fn every_chapter_follows_a_page_break_in_order() {
        let chapters = vec![
            chapter(0, "A", "<p>first</p>"),
            chapter(1, "B", "<p>second</p>"),
        ];
        let html = assemble("Docs", "https://x.io/", &chapters);

        assert_eq!(html.matches(PAGE_BREAK).count(), 2);
        let first = html.find("<p>first</p>").unwrap();
        let second = html.find("<p>second</p>").unwrap();
        assert!(html.find("Table of Contents").unwrap() < first);
        assert!(first < second);
        assert!(html[..first].ends_with(PAGE_BREAK));
        assert!(html.contains("<style>"));
        assert!(html.contains(".toc-leader"));
    }

    #[test]
    fn chapter_markup_is_embedded_verbatim() {
        let content = "<main><h1 id=\"chap_0\">T</h1><pre>\n\nkeep</pre></main>";
        let html = assemble_on("Docs", "https://x.io/", &[chapter(0, "T", content)], date(), &PageNumbers::new());
        assert!(html.contains(content));
    }
}
