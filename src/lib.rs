//! # docs2pdf
//!
//! A CLI utility that crawls a documentation website and stitches its pages
//! into a single PDF with a cover page and a table of contents.
//!
//! ## How it works
//!
//! - The sidebar selector comes from `--selector`, a per-site preset, or a
//!   Sphinx-style default
//! - Chapter links are discovered from the sidebar, a TOC wrapper, or as a
//!   last resort every link in the main content
//! - Each page is rendered in Chromium, its content region cleaned up and
//!   links between captured pages rewritten to in-document anchors
//! - The assembled document is printed to PDF by Chromium twice: the first
//!   print tells which page every chapter starts on, the second carries those
//!   numbers in the table of contents
//!
//! ## Usage
//!
//! ```bash
//! docs2pdf https://flask.palletsprojects.com/en/latest/ -t "Flask" -o flask.pdf
//! ```

mod assembler;
mod browser;
mod candidates;
mod chapter;
mod config;
mod downloader;
mod extractor;
mod html;
mod links;
mod renderer;
mod sanitizer;
mod selector;
mod spider;

pub use assembler::{assemble, assemble_on, cover_html, toc_html, PageNumbers, PAGE_BREAK, STYLESHEET};
pub use browser::{BrowserSession, ChromiumPage, DocPage};
pub use candidates::{first_match, first_match_or};
pub use chapter::{chapter_id, Chapter, CHAPTER_ID_PREFIX};
pub use config::{
    Options, PdfOptions, Timing, ADMONITION_CLASSES, ALLOWED_ATTRIBUTES, DEFAULT_OUTPUT,
    DEFAULT_SELECTOR, DEFAULT_TITLE, INTERNAL_LINK_CLASS, MIN_LINKS,
};
pub use downloader::{apply_limit, collect_book, Book, Downloader};
pub use extractor::{extract, extract_from_html};
pub use links::{canonical_url, repair_links, UrlMap};
pub use renderer::{chapter_pages, render_pdf, stamp_metadata};
pub use sanitizer::{filter_attributes, sanitize};
pub use selector::{parse_selector, resolve_selector};
pub use spider::{discover, expand_menus_script, LinkCollector, Strategy};
