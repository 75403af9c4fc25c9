use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::app::error::BoardError;
use crate::app::tags::TagService;
use crate::domain::post::{NewPost, Placement, Post, PostId, PostKind, Thread, TopLevelId};
use crate::domain::timestamp;
use crate::infra::db::Db;

const POST_COLUMNS: &str = "p.id, p.username, p.content, p.image_url, p.parent_id, p.post_type, p.created_at, \
     (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count, \
     (SELECT COUNT(*) FROM posts r WHERE r.parent_id = p.id) AS reply_count";

#[derive(Clone)]
pub struct PostService {
    db: Db,
    tags: TagService,
}

impl PostService {
    pub fn new(db: Db) -> Self {
        let tags = TagService::new(db.clone());
        Self { db, tags }
    }

    /// Confirms `post_id` names an existing post without a parent.
    pub async fn top_level(&self, post_id: PostId) -> Result<TopLevelId, BoardError> {
        let parent = sqlx::query_scalar::<_, Option<PostId>>("SELECT parent_id FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(self.db.pool())
            .await?;

        match parent {
            None => Err(BoardError::NotFound("post")),
            Some(Some(_)) => Err(BoardError::invalid("replies cannot be replied to or tagged")),
            Some(None) => Ok(TopLevelId::verified(post_id)),
        }
    }

    pub async fn create_post(&self, new_post: NewPost) -> Result<PostId, BoardError> {
        if new_post.content.is_empty() {
            return Err(BoardError::invalid("content cannot be empty"));
        }

        let (parent_id, kind, tags) = match new_post.placement {
            Placement::TopLevel { kind, tags } => (None, kind, tags),
            Placement::Reply { parent } => (Some(parent.post_id()), PostKind::Regular, None),
        };

        let result = sqlx::query(
            "INSERT INTO posts (username, content, image_url, parent_id, post_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_post.author)
        .bind(&new_post.content)
        .bind(&new_post.image_url)
        .bind(parent_id)
        .bind(kind.as_db())
        .bind(timestamp::now()?)
        .execute(self.db.pool())
        .await?;

        let post_id = PostId(result.last_insert_rowid());

        // Tagging runs after the post is committed; a failure here leaves the
        // post in place untagged.
        if let Some(tags) = tags.filter(|tags| !tags.is_blank()) {
            let post = TopLevelId::verified(post_id);
            if let Err(err) = self.tags.attach_tags(post, &tags).await {
                tracing::warn!(error = ?err, post_id = %post_id, "failed to attach tags");
            }
        }

        tracing::info!(post_id = %post_id, author = %new_post.author, kind = kind.as_db(), reply = parent_id.is_some(), "post created");
        Ok(post_id)
    }

    /// Top-level posts of one kind, newest first. `exclude_journal` selects the
    /// home timeline; otherwise only journal entries are returned.
    pub async fn timeline(&self, exclude_journal: bool) -> Result<Vec<Post>, BoardError> {
        let kind = if exclude_journal {
            PostKind::Regular
        } else {
            PostKind::Journal
        };
        self.top_level_posts(kind).await
    }

    pub async fn top_level_posts(&self, kind: PostKind) -> Result<Vec<Post>, BoardError> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} \
             FROM posts p \
             WHERE p.parent_id IS NULL AND p.post_type = ? \
             ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(kind.as_db())
        .fetch_all(self.db.pool())
        .await?;

        let mut posts: Vec<Post> = rows.iter().map(post_from_row).collect();
        let ids: Vec<PostId> = posts.iter().map(|post| post.id).collect();
        let mut tags = self.tags.tags_for_posts(&ids).await?;
        for post in &mut posts {
            post.tags = tags.remove(&post.id).unwrap_or_default();
        }

        Ok(posts)
    }

    /// A post and its direct replies, oldest reply first.
    pub async fn thread(&self, post_id: PostId) -> Result<Thread, BoardError> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"
        ))
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;

        let mut post = match row {
            Some(row) => post_from_row(&row),
            None => return Err(BoardError::NotFound("post")),
        };
        post.tags = self.tags.tags_for_post(post_id).await?;

        let replies = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} \
             FROM posts p \
             WHERE p.parent_id = ? \
             ORDER BY p.created_at ASC, p.id ASC"
        ))
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await?
        .iter()
        .map(post_from_row)
        .collect();

        Ok(Thread { post, replies })
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    let kind: String = row.get("post_type");
    Post {
        id: row.get("id"),
        author: row.get("username"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        parent_id: row.get("parent_id"),
        kind: PostKind::from_db(&kind),
        created_at: row.get("created_at"),
        like_count: row.get("like_count"),
        reply_count: row.get("reply_count"),
        tags: Vec::new(),
    }
}
