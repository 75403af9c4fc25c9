use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TagId(pub i64);

/// Raw, comma-separated tag input as submitted with a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(String);

impl TagList {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Trimmed, non-empty names in submission order. Repeats are kept; the
    /// association table absorbs them.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').map(str::trim).filter(|name| !name.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.names().next().is_none()
    }
}
