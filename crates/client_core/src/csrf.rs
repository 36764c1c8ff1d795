use std::fmt;

use tracing::debug;

use crate::dom::Document;

pub const CSRF_META_NAME: &str = "csrf-token";

/// Anti-forgery token read once per page. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Blank tokens are rejected.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn from_page(doc: &Document) -> Option<Self> {
        let token = doc.meta_content(CSRF_META_NAME).and_then(Self::new);
        debug!(found = token.is_some(), "CSRF meta tag read");
        token
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(<redacted>)")
    }
}
