//! First-match-wins over an ordered list of candidates.
//!
//! Preset lookup and content-region selection both walk a
//! fixed list and keep the first candidate that produces something.

/// Returns the first non-`None` attempt result, in candidate order.
pub fn first_match<C, T>(
    candidates: impl IntoIterator<Item = C>,
    attempt: impl FnMut(C) -> Option<T>,
) -> Option<T> {
    candidates.into_iter().find_map(attempt)
}

/// Like [`first_match`], falling back to `default` when nothing matches.
pub fn first_match_or<C, T>(
    candidates: impl IntoIterator<Item = C>,
    default: T,
    attempt: impl FnMut(C) -> Option<T>,
) -> T {
    first_match(candidates, attempt).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_first_hit_in_order() {
        let hit = first_match(["a", "bb", "cc"], |c| (c.len() == 2).then(|| c.to_uppercase()));
        assert_eq!(hit.as_deref(), Some("BB"));
    }

    #[test]
    fn stops_trying_after_first_hit() {
        let mut tried = Vec::new();
        let _ = first_match([1, 2, 3, 4], |n| {
            tried.push(n);
            (n == 2).then_some(n)
        });
        assert_eq!(tried, vec![1, 2]);
    }

    #[test]
    fn falls_back_to_default() {
        let value = first_match_or(Vec::<u8>::new(), "fallback", |_| Some("never"));
        assert_eq!(value, "fallback");
    }
}
