use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::HashMap;

use crate::app::error::BoardError;
use crate::domain::post::{PostId, TopLevelId};
use crate::domain::tag::{TagId, TagList};
use crate::infra::db::{is_unique_violation, Db};

#[derive(Clone)]
pub struct TagService {
    db: Db,
}

impl TagService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Get-or-create by exact name. Callers pass a trimmed, non-empty name.
    pub async fn resolve(&self, name: &str) -> Result<TagId, BoardError> {
        if let Some(id) = self.find(name).await? {
            return Ok(id);
        }

        let inserted = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(self.db.pool())
            .await;

        match inserted {
            Ok(result) => Ok(TagId(result.last_insert_rowid())),
            // Another request created it between our lookup and insert.
            Err(err) if is_unique_violation(&err) => {
                tracing::debug!(tag = %name, "tag created concurrently, reusing existing row");
                self.find(name).await?.ok_or(BoardError::NotFound("tag"))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find(&self, name: &str) -> Result<Option<TagId>, BoardError> {
        let id = sqlx::query_scalar::<_, TagId>("SELECT id FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(id)
    }

    /// Associates every name in `tags` with the post. Repeated names and
    /// existing associations are absorbed by the `(post_id, tag_id)` constraint.
    /// Returns how many new associations were written.
    pub async fn attach_tags(&self, post: TopLevelId, tags: &TagList) -> Result<u64, BoardError> {
        let post_id = post.post_id();
        let mut attached = 0;

        for name in tags.names() {
            let tag_id = self.resolve(name).await?;
            let result = sqlx::query(
                "INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?) \
                 ON CONFLICT (post_id, tag_id) DO NOTHING",
            )
            .bind(post_id)
            .bind(tag_id)
            .execute(self.db.pool())
            .await?;
            attached += result.rows_affected();
        }

        Ok(attached)
    }

    pub async fn tags_for_post(&self, post_id: PostId) -> Result<Vec<String>, BoardError> {
        let mut tags = self.tags_for_posts(&[post_id]).await?;
        Ok(tags.remove(&post_id).unwrap_or_default())
    }

    /// Tag names per post, in the order they were attached.
    pub async fn tags_for_posts(
        &self,
        post_ids: &[PostId],
    ) -> Result<HashMap<PostId, Vec<String>>, BoardError> {
        let mut tags: HashMap<PostId, Vec<String>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(tags);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT pt.post_id, t.name \
             FROM post_tags pt \
             INNER JOIN tags t ON pt.tag_id = t.id \
             WHERE pt.post_id IN (",
        );
        let mut ids = query.separated(", ");
        for post_id in post_ids {
            ids.push_bind(*post_id);
        }
        ids.push_unseparated(") ORDER BY pt.id");

        let rows = query.build().fetch_all(self.db.pool()).await?;
        for row in rows {
            let post_id: PostId = row.get("post_id");
            tags.entry(post_id).or_default().push(row.get("name"));
        }

        Ok(tags)
    }
}
