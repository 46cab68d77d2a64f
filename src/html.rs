//! Small helpers over `dom_query` trees.
//!
//! A page is parsed once into a [`Document`]; image absolutizing, sanitizing,
//! link repair and heading anchoring all mutate that tree in place, and the
//! content region is serialized once at the end.

use dom_query::{Document, Matcher, Selection};
use tracing::warn;

pub type Attributes = Vec<(String, String)>;

/// Compiles a list of selectors, skipping (and logging) any that do not parse.
pub fn compile_selectors(selectors: &[&str]) -> Vec<Matcher> {
    selectors
        .iter()
        .filter_map(|s| match Matcher::new(s) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                warn!("Ignoring invalid selector {:?}: {:?}", s, e);
                None
            }
        })
        .collect()
}

/// `root` itself followed by every element below it, in document order.
pub fn elements<'a>(root: &Selection<'a>) -> Vec<Selection<'a>> {
    let mut out: Vec<Selection<'a>> = root.iter().collect();
    out.extend(root.select("*").iter());
    out
}

/// The attributes of the first node in `sel` as owned pairs.
pub fn attributes_of(sel: &Selection) -> Attributes {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Replaces the element's attributes with `attrs`, keeping the position of
/// the ones that survive.
pub fn replace_attributes(sel: &Selection, attrs: &Attributes) {
    for (name, _) in attributes_of(sel) {
        if !attrs.iter().any(|(kept, _)| *kept == name) {
            sel.remove_attr(name.as_str());
        }
    }
    for (name, value) in attrs {
        sel.set_attr(name.as_str(), value.as_str());
    }
}

/// Text of a selection with whitespace runs collapsed to single spaces.
pub fn collapsed_text(sel: &Selection) -> String {
    sel.text().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Markup inside `<body>`, for documents built from a fragment.
pub fn body_markup(document: &Document) -> String {
    document.select("body").inner_html().to_string()
}
