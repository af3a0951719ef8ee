//! Insertion-ordered mapping from page path to rendered content.
//!
//! Entries are stored in a flat `Vec` with a `HashMap` index for O(1) path
//! lookups. A path is claimed with an empty placeholder before its template
//! runs and filled once rendering finishes.

use std::collections::HashMap;

use pw_tree::NodeId;

struct PageEntry {
    path: String,
    source: NodeId,
    content: Option<String>,
}

/// Output of a build run: path → content, in the order pages were claimed.
#[derive(Default)]
pub struct PageMap {
    entries: Vec<PageEntry>,
    index: HashMap<String, usize>,
}

impl PageMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node that first claimed `path`.
    pub(crate) fn source_of(&self, path: &str) -> Option<NodeId> {
        self.index.get(path).map(|&idx| self.entries[idx].source)
    }

    /// Insert a placeholder for `path`. Existing entries are left untouched.
    pub(crate) fn claim(&mut self, path: &str, source: NodeId) {
        if self.index.contains_key(path) {
            return;
        }
        self.index.insert(path.to_owned(), self.entries.len());
        self.entries.push(PageEntry {
            path: path.to_owned(),
            source,
            content: None,
        });
    }

    /// Replace the placeholder for `path` with rendered content.
    pub(crate) fn fill(&mut self, path: &str, content: String) {
        if let Some(&idx) = self.index.get(path) {
            self.entries[idx].content = Some(content);
        }
    }

    /// Rendered content for `path`. Placeholders report `None`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.index
            .get(path)
            .and_then(|&idx| self.entries[idx].content.as_deref())
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths in claim order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.path.as_str())
    }

    /// `(path, content)` pairs in claim order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }
}

impl std::fmt::Debug for PageMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (&e.path, e.content.as_ref().map(String::len))))
            .finish()
    }
}

/// Iterator over `(path, content)` pairs of a [`PageMap`].
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, PageEntry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|entry| (entry.path.as_str(), entry.content.as_deref().unwrap_or_default()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a PageMap {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_then_fill() {
        let mut pages = PageMap::new();
        pages.claim("/a", NodeId::ROOT);
        assert!(pages.contains("/a"));
        assert_eq!(pages.get("/a"), None);

        pages.fill("/a", "content".to_owned());
        assert_eq!(pages.get("/a"), Some("content"));
    }

    #[test]
    fn test_claim_is_first_wins() {
        let mut pages = PageMap::new();
        pages.claim("/a", NodeId::ROOT);
        pages.fill("/a", "first".to_owned());
        pages.claim("/a", NodeId::ROOT);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages.get("/a"), Some("first"));
    }

    #[test]
    fn test_iteration_keeps_claim_order() {
        let mut pages = PageMap::new();
        for path in ["", "/z", "/styles.css", "/a"] {
            pages.claim(path, NodeId::ROOT);
            pages.fill(path, format!("page {path}"));
        }
        let paths: Vec<_> = pages.paths().collect();
        assert_eq!(paths, vec!["", "/z", "/styles.css", "/a"]);

        let pairs: Vec<_> = (&pages).into_iter().collect();
        assert_eq!(pairs[1], ("/z", "page /z"));
        assert_eq!(pages.iter().len(), 4);
    }

    #[test]
    fn test_empty_map() {
        let pages = PageMap::new();
        assert!(pages.is_empty());
        assert_eq!(pages.source_of(""), None);
        assert_eq!(pages.get(""), None);
    }
}
