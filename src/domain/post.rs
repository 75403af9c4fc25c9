use serde::{Deserialize, Serialize};

use crate::domain::tag::TagList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PostId(pub i64);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a post known to have no parent.
///
/// Only the post store mints these, after reading the row back, so a reply can
/// never be attached beneath another reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopLevelId(PostId);

impl TopLevelId {
    pub(crate) fn verified(id: PostId) -> Self {
        Self(id)
    }

    pub fn post_id(&self) -> PostId {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    #[default]
    Regular,
    Journal,
}

impl PostKind {
    /// Rows written before the CHECK constraint existed may carry other values;
    /// anything that is not a journal entry reads as a regular post.
    pub fn from_db(value: &str) -> Self {
        match value {
            "journal" => Self::Journal,
            _ => Self::Regular,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Journal => "journal",
        }
    }

    /// Parses the `post_type` form field. A missing or blank value means regular.
    pub fn from_form(value: Option<&str>) -> Option<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("regular") => Some(Self::Regular),
            Some("journal") => Some(Self::Journal),
            Some(_) => None,
        }
    }
}

/// Where a new post lands in the thread structure.
#[derive(Debug, Clone)]
pub enum Placement {
    TopLevel { kind: PostKind, tags: Option<TagList> },
    Reply { parent: TopLevelId },
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author: String,
    pub content: String,
    pub image_url: Option<String>,
    pub placement: Placement,
}

/// Read-side projection of a post with its derived counts.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: PostId,
    pub author: String,
    pub content: String,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<PostId>,
    pub kind: PostKind,
    pub created_at: String,
    pub like_count: i64,
    pub reply_count: i64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub post: Post,
    pub replies: Vec<Post>,
}
