//! Spring-style page envelope returned by the product listing endpoints.

use serde::{Deserialize, Serialize};

/// One page of results.
///
/// The gateway wraps paginated listings in a Spring `Page` object; only the
/// `content` array matters to the client, everything else is ignored. The
/// catalog treats a page shorter than the requested size as the last one, so
/// no total-count field is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

impl<T> Page<T> {
    /// Create a page from its items.
    #[must_use]
    pub const fn new(content: Vec<T>) -> Self {
        Self { content }
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the page carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
