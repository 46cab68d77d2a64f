#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use docs2pdf::{DocPage, Strategy};
use serde_json::{json, Value};

/// In-memory stand-in for a browser tab.
///
/// Pages are served by URL, script results are looked up by exact script
/// text, and every evaluated script is recorded.
#[derive(Default)]
pub struct FakePage {
    pages: HashMap<String, FakeDoc>,
    redirects: HashMap<String, String>,
    scripts: HashMap<String, Value>,
    current: Mutex<Option<String>>,
    evaluated: Mutex<Vec<String>>,
    visited: Mutex<Vec<String>>,
}

#[derive(Clone)]
pub struct FakeDoc {
    pub html: String,
    pub title: Option<String>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str, title: Option<&str>) -> Self {
        self.pages.insert(
            url.to_string(),
            FakeDoc {
                html: html.to_string(),
                title: title.map(str::to_string),
            },
        );
        self
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn strategy_links(mut self, strategy: Strategy, sidebar_selector: &str, links: &[&str]) -> Self {
        self.scripts
            .insert(strategy.script(sidebar_selector), json!(links));
        self
    }

    pub fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().unwrap().clone()
    }

    pub fn ran(&self, strategy: Strategy, sidebar_selector: &str) -> bool {
        let script = strategy.script(sidebar_selector);
        self.evaluated().iter().any(|s| *s == script)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    fn current_doc(&self) -> Result<FakeDoc> {
        let current = self.current.lock().unwrap().clone();
        current
            .and_then(|url| self.pages.get(&url).cloned())
            .ok_or_else(|| anyhow!("no page loaded"))
    }
}

#[async_trait]
impl DocPage for FakePage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        let target = self.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        if !self.pages.contains_key(&target) {
            return Err(anyhow!("Navigation to {} timed out", url));
        }
        *self.current.lock().unwrap() = Some(target);
        Ok(())
    }

    async fn wait_for_dom_ready(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        self.evaluated.lock().unwrap().push(script.to_string());
        if script == "document.readyState" {
            return Ok(json!("complete"));
        }
        Ok(self.scripts.get(script).cloned().unwrap_or(Value::Null))
    }

    async fn current_url(&self) -> Result<String> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("no page loaded"))
    }

    async fn current_title(&self) -> Result<Option<String>> {
        Ok(self.current_doc()?.title)
    }

    async fn rendered_html(&self) -> Result<String> {
        Ok(self.current_doc()?.html)
    }

    async fn wait(&self, _duration: Duration) {}
}

pub fn doc_page(h1: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>{h1} | Example Docs</title></head><body>
        <div class="sphinxsidebar"><a href="/">Home</a></div>
        <div class="document"><h1>{h1}</h1>{body}</div>
        </body></html>"#
    )
}
