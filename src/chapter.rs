/// One extracted page, ready to be placed in the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// `chap_<index>`; doubles as the in-document anchor.
    pub id: String,
    pub title: String,
    /// Sanitized HTML fragment with repaired links.
    pub content: String,
}

pub const CHAPTER_ID_PREFIX: &str = "chap_";

/// Id assigned to the link at `index` of the discovered link list.
pub fn chapter_id(index: usize) -> String {
    format!("{}{}", CHAPTER_ID_PREFIX, index)
}
