//! Query value object

use serde::{Deserialize, Serialize};

/// A free-text investigation query (Value Object)
///
/// Represents the operator's question that is classified, handed to every
/// specialist worker, and echoed back in the final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    text: String,
}

impl Query {
    /// Create a new query
    ///
    /// # Panics
    /// Panics if the text is empty or only whitespace
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        assert!(!text.trim().is_empty(), "Query cannot be empty");
        Self { text }
    }

    /// Try to create a new query, returning None if invalid
    pub fn try_new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }

    /// Get the query text
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for Query {
    fn from(s: &str) -> Self {
        Query::new(s)
    }
}

impl From<String> for Query {
    fn from(s: String) -> Self {
        Query::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::new("Is checkout healthy?");
        assert_eq!(q.text(), "Is checkout healthy?");
    }

    #[test]
    #[should_panic]
    fn test_empty_query_panics() {
        Query::new("");
    }

    #[test]
    fn test_try_new_empty() {
        assert!(Query::try_new("").is_none());
        assert!(Query::try_new("   ").is_none());
    }
}
