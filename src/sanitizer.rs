use dom_query::Selection;

use crate::config::{ADMONITION_CLASSES, ALLOWED_ATTRIBUTES, STRIPPED_SELECTORS};
use crate::html::{attributes_of, compile_selectors, elements, replace_attributes, Attributes};

/// Strips navigation chrome below `content` and reduces every remaining
/// element, `content` included, to the attribute allowlist.
pub fn sanitize(content: &Selection) {
    for matcher in compile_selectors(STRIPPED_SELECTORS) {
        content.select_matcher(&matcher).remove();
    }

    for element in elements(content) {
        let attrs = attributes_of(&element);
        let kept = filter_attributes(attrs.iter().map(|(name, value)| (name.as_str(), value.as_str())));
        replace_attributes(&element, &kept);
    }
}

/// Keeps only allowlisted attributes; `class` keeps only admonition names and
/// disappears when none survive.
pub fn filter_attributes<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Attributes {
    attrs
        .into_iter()
        .filter(|(name, _)| ALLOWED_ATTRIBUTES.contains(name))
        .filter_map(|(name, value)| {
            if name != "class" {
                return Some((name.to_string(), value.to_string()));
            }
            let kept = value
                .split_whitespace()
                .filter(|class| ADMONITION_CLASSES.contains(class))
                .collect::<Vec<_>>();
            if kept.is_empty() {
                None
            } else {
                Some((name.to_string(), kept.join(" ")))
            }
        })
        .collect()
}
