//! Slash-separated data paths.
//!
//! The empty path addresses the root of a model's data. Numeric segments
//! index arrays.

/// Split a path into segments. The empty path has none.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// Path of the item at `index` inside the list at `list`.
#[must_use]
pub fn child(list: &str, index: usize) -> String {
    if list.is_empty() {
        index.to_string()
    } else {
        format!("{list}/{index}")
    }
}

/// Re-anchor `path` under item `index` of the list at `list`.
///
/// The first `n + 1` segments of `path` (where `n` is the segment count of
/// `list`) are replaced by `list/index`. Returns `None` when `path` is not
/// long enough to contain an item index at that depth.
#[must_use]
pub fn rebase(path: &str, list: &str, index: usize) -> Option<String> {
    let depth = segments(list).len();
    let parts = segments(path);
    if parts.len() <= depth {
        return None;
    }
    let mut rebased = child(list, index);
    for rest in &parts[depth + 1..] {
        rebased.push('/');
        rebased.push_str(rest);
    }
    Some(rebased)
}

/// Longest proper prefix of `path` that ends in a numeric segment.
///
/// `products/3/name` → `products/3`; `groups/0/items/2/label` → `groups/0/items/2`.
#[must_use]
pub fn item_prefix(path: &str) -> Option<&str> {
    let parts = segments(path);
    let mut end = path.len();
    for keep in (1..parts.len()).rev() {
        end -= parts[keep].len() + 1;
        if is_index(parts[keep - 1]) {
            return Some(&path[..end]);
        }
    }
    None
}

#[must_use]
pub fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_has_no_segments() {
        assert!(segments("").is_empty());
        assert_eq!(segments("a/0/b"), vec!["a", "0", "b"]);
    }

    #[test]
    fn child_paths() {
        assert_eq!(child("products", 2), "products/2");
        assert_eq!(child("", 0), "0");
    }

    #[test]
    fn rebase_replaces_item_index() {
        assert_eq!(
            rebase("products/0/tags", "products", 4).as_deref(),
            Some("products/4/tags")
        );
        assert_eq!(
            rebase("products/3/tags/1/label", "products", 4).as_deref(),
            Some("products/4/tags/1/label")
        );
        assert_eq!(
            rebase("products/0/tags/0/x", "products/2/tags", 5).as_deref(),
            Some("products/2/tags/5/x")
        );
        assert_eq!(rebase("products", "products", 1), None);
        assert_eq!(rebase("0/name", "", 3).as_deref(), Some("3/name"));
    }

    #[test]
    fn item_prefix_strips_to_numeric_segment() {
        assert_eq!(item_prefix("products/3/name"), Some("products/3"));
        assert_eq!(
            item_prefix("groups/0/items/2/label"),
            Some("groups/0/items/2")
        );
        assert_eq!(item_prefix("groups/0/items"), Some("groups/0"));
        assert_eq!(item_prefix("products/3"), None);
        assert_eq!(item_prefix("name"), None);
        assert_eq!(item_prefix(""), None);
    }

    #[test]
    fn index_segments() {
        assert!(is_index("0"));
        assert!(is_index("42"));
        assert!(!is_index(""));
        assert!(!is_index("-1"));
        assert!(!is_index("a1"));
    }
}
