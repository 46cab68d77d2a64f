use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use colored::*;
use tracing::{info, warn};

use crate::assembler::{assemble_on, PageNumbers};
use crate::browser::{BrowserSession, DocPage};
use crate::chapter::{chapter_id, Chapter};
use crate::config::{Options, DEFAULT_SELECTOR};
use crate::extractor::extract;
use crate::links::UrlMap;
use crate::renderer::render_pdf;
use crate::selector::resolve_selector;
use crate::spider::discover;

/// Chapters pulled from a site, ready to be assembled.
#[derive(Debug, Clone)]
pub struct Book {
    pub title: String,
    pub start_url: String,
    pub generated_on: NaiveDate,
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// The printable document, with `page_numbers` in its table of contents.
    pub fn html(&self, page_numbers: &PageNumbers) -> String {
        assemble_on(
            &self.title,
            &self.start_url,
            &self.chapters,
            self.generated_on,
            page_numbers,
        )
    }
}

pub struct Downloader {
    options: Options,
}

impl Downloader {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub async fn run(&self, target_url: &str) -> Result<()> {
        info!("Target: {}", target_url.green());

        let session = BrowserSession::launch(self.options.visible).await?;
        let result = self.run_internal(&session, target_url).await;
        session.close().await;

        result
    }

    async fn run_internal(&self, session: &BrowserSession, target_url: &str) -> Result<()> {
        let page = session.new_page().await?;
        let book = collect_book(&page, target_url, &self.options).await?;

        let pages = render_pdf(
            session.browser(),
            |page_numbers: &PageNumbers| book.html(page_numbers),
            &self.options.title,
            &self.options.output,
            &self.options.pdf,
        )
        .await?;

        info!(
            "Success! Saved {} chapters ({} pages) to {}",
            book.chapters.len(),
            pages,
            self.options.output.display().to_string().blue()
        );
        Ok(())
    }
}

/// Keeps the first `limit` links; `0` keeps them all.
pub fn apply_limit(mut links: Vec<String>, limit: usize) -> Vec<String> {
    if limit > 0 {
        links.truncate(limit);
    }
    links
}

/// Discovers, extracts and assembles a site on one page, strictly in order.
///
/// Fails when discovery finds nothing or no page yields content.
pub async fn collect_book<P>(page: &P, target_url: &str, options: &Options) -> Result<Book>
where
    P: DocPage + ?Sized,
{
    let selector = resolve_selector(target_url, &options.sidebar_selector, DEFAULT_SELECTOR);

    let links = discover(page, target_url, &selector, &options.timing).await;
    if links.is_empty() {
        return Err(anyhow!("No links found"));
    }
    info!("Found {} chapters.", links.len());

    let links = apply_limit(links, options.limit);
    if options.limit > 0 {
        info!("Limiting to the first {} chapters", links.len());
    }

    // Every id must exist before extraction so links can point forward.
    let url_map = UrlMap::from_links(&links);

    info!("Downloading content...");
    let total = links.len();
    let mut chapters = Vec::with_capacity(total);
    for (index, link) in links.iter().enumerate() {
        info!("[{}/{}] {}", index + 1, total, link.green());
        let id = chapter_id(index);
        match extract(page, link, &id, &url_map, &options.timing).await {
            Some(chapter) => chapters.push(chapter),
            None => warn!("Skipped {}: no extractable content", link),
        }
    }

    if chapters.is_empty() {
        return Err(anyhow!("Aborted: no chapter could be extracted"));
    }

    info!("Assembling document from {} chapters...", chapters.len());
    Ok(Book {
        title: options.title.clone(),
        start_url: target_url.to_string(),
        generated_on: chrono::Local::now().date_naive(),
        chapters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_keeps_a_prefix() {
        let links: Vec<String> = (0..5).map(|i| format!("https://x.io/{}", i)).collect();
        assert_eq!(apply_limit(links.clone(), 2), links[..2].to_vec());
        assert_eq!(apply_limit(links.clone(), 0), links);
        assert_eq!(apply_limit(links.clone(), 10), links);
    }
}
