use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, Page};
use colored::*;
use lopdf::{dictionary, Document, Object, ObjectId};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::assembler::PageNumbers;
use crate::chapter::CHAPTER_ID_PREFIX;
use crate::config::PdfOptions;

const PRODUCER: &str = "docs2pdf";

/// Grace period for images referenced by the document to finish loading.
const ASSET_SETTLE: Duration = Duration::from_millis(1500);

const MAX_NAME_TREE_DEPTH: usize = 32;

/// Prints the document built by `document` to `output` through Chrome.
///
/// The first print is only read for the page each chapter starts on; the
/// document is then rebuilt with those numbers in its table of contents and
/// printed again. Returns the number of pages written.
pub async fn render_pdf<F>(
    browser: &Browser,
    document: F,
    title: &str,
    output: &Path,
    options: &PdfOptions,
) -> Result<usize>
where
    F: Fn(&PageNumbers) -> String,
{
    info!("Rendering PDF: {}...", output.display().to_string().blue());

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| anyhow!("Failed to create render page: {}", e))?;

    let result = print_numbered(&page, &document, options).await;
    page.close().await.ok();

    let (pdf_data, pages) = stamp_metadata(&result?, title)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    fs::write(output, pdf_data)
        .await
        .map_err(|e| anyhow!("Failed to write PDF to {}: {}", output.display(), e))?;

    Ok(pages)
}

async fn print_numbered<F>(page: &Page, document: &F, options: &PdfOptions) -> Result<Vec<u8>>
where
    F: Fn(&PageNumbers) -> String,
{
    let draft = print(page, &document(&PageNumbers::new()), options).await?;

    let numbers = match chapter_pages(&draft) {
        Ok(numbers) => numbers,
        Err(e) => {
            warn!("Could not read chapter pages from the draft: {}", e);
            PageNumbers::new()
        }
    };
    if numbers.is_empty() {
        warn!("No chapter destinations in the draft, table of contents left unnumbered");
        return Ok(draft);
    }

    info!("Numbering table of contents ({} chapters)...", numbers.len());
    print(page, &document(&numbers), options).await
}

async fn print(page: &Page, html: &str, options: &PdfOptions) -> Result<Vec<u8>> {
    page.set_content(html)
        .await
        .map_err(|e| anyhow!("Failed to load assembled document: {}", e))?;

    tokio::time::sleep(ASSET_SETTLE).await;

    let params = PrintToPdfParams {
        scale: Some(options.scale),
        print_background: Some(options.print_background),
        prefer_css_page_size: Some(options.prefer_css_page_size),
        display_header_footer: Some(false),
        ..Default::default()
    };

    page.pdf(params)
        .await
        .map_err(|e| anyhow!("Failed to generate PDF: {}", e))
}

/// Maps every chapter's named destination in a printed PDF to its 1-based page.
///
/// Chrome writes a named destination for each in-document link target, either
/// in the catalog's `/Dests` dictionary or in the `/Names` tree.
pub fn chapter_pages(pdf: &[u8]) -> Result<PageNumbers> {
    let document =
        Document::load_mem(pdf).map_err(|e| anyhow!("Failed to parse rendered PDF: {}", e))?;

    let page_index: HashMap<ObjectId, usize> = document
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number as usize))
        .collect();

    let root = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|e| anyhow!("PDF has no catalog: {}", e))?;
    let catalog = document
        .get_dictionary(root)
        .map_err(|e| anyhow!("PDF has no catalog: {}", e))?;

    let mut named = Vec::new();
    if let Ok(dests) = catalog
        .get(b"Dests")
        .and_then(|d| resolve(&document, d))
        .and_then(Object::as_dict)
    {
        named.extend(dests.iter().map(|(name, dest)| (name.clone(), dest)));
    }
    if let Ok(tree) = catalog
        .get(b"Names")
        .and_then(|n| resolve(&document, n))
        .and_then(Object::as_dict)
        .and_then(|names| names.get(b"Dests"))
    {
        collect_name_tree(&document, tree, &mut named, 0);
    }

    let mut pages = PageNumbers::new();
    for (name, dest) in named {
        let Ok(name) = String::from_utf8(name) else {
            continue;
        };
        if !name.starts_with(CHAPTER_ID_PREFIX) {
            continue;
        }
        if let Some(page) = destination_page(&document, dest).and_then(|id| page_index.get(&id)) {
            pages.insert(name, *page);
        }
    }
    debug!("Found {} chapter destinations", pages.len());

    Ok(pages)
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> lopdf::Result<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id),
        other => Ok(other),
    }
}

fn collect_name_tree<'a>(
    document: &'a Document,
    node: &'a Object,
    out: &mut Vec<(Vec<u8>, &'a Object)>,
    depth: usize,
) {
    if depth > MAX_NAME_TREE_DEPTH {
        return;
    }
    let Ok(node) = resolve(document, node).and_then(Object::as_dict) else {
        return;
    };

    if let Ok(names) = node
        .get(b"Names")
        .and_then(|n| resolve(document, n))
        .and_then(Object::as_array)
    {
        for pair in names.chunks(2) {
            if let [key, dest] = pair {
                if let Ok(key) = key.as_str() {
                    out.push((key.to_vec(), dest));
                }
            }
        }
    }

    if let Ok(kids) = node
        .get(b"Kids")
        .and_then(|k| resolve(document, k))
        .and_then(Object::as_array)
    {
        for kid in kids {
            collect_name_tree(document, kid, out, depth + 1);
        }
    }
}

/// The page object a destination points at: `[page /XYZ ...]`, or a
/// dictionary holding that array under `/D`.
fn destination_page(document: &Document, dest: &Object) -> Option<ObjectId> {
    let array = match resolve(document, dest).ok()? {
        Object::Array(array) => array,
        Object::Dictionary(dict) => resolve(document, dict.get(b"D").ok()?)
            .ok()?
            .as_array()
            .ok()?,
        _ => return None,
    };
    array.first()?.as_reference().ok()
}

/// Sets the Info dictionary's title and producer and counts the pages.
///
/// A document without pages is rejected.
pub fn stamp_metadata(pdf: &[u8], title: &str) -> Result<(Vec<u8>, usize)> {
    let mut document =
        Document::load_mem(pdf).map_err(|e| anyhow!("Failed to parse rendered PDF: {}", e))?;

    let pages = document.get_pages().len();
    if pages == 0 {
        return Err(anyhow!("Rendered PDF has no pages"));
    }

    let info_id = document.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal(PRODUCER),
    });
    document.trailer.set("Info", info_id);
    debug!("Stamped metadata on PDF with {} pages", pages);

    let mut data = Vec::new();
    document
        .save_to(&mut data)
        .map_err(|e| anyhow!("Failed to serialize PDF: {}", e))?;

    Ok((data, pages))
}
