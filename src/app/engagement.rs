use crate::app::error::BoardError;
use crate::domain::engagement::LikeState;
use crate::domain::post::PostId;
use crate::domain::user::UserId;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct EngagementService {
    db: Db,
}

impl EngagementService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Flips the like between `user_id` and `post_id`.
    ///
    /// The delete-or-insert and the existence checks share one transaction
    /// whose first statement is a write, so SQLite's write lock is held before
    /// anything is read. Two toggles on the same pair therefore run one after
    /// the other and each reports the state it actually left behind.
    ///
    /// Runs on its own task, so it completes even when the caller is dropped.
    pub async fn toggle_like(&self, user_id: UserId, post_id: PostId) -> Result<LikeState, BoardError> {
        let db = self.db.clone();
        let state = tokio::spawn(async move { toggle_in_tx(&db, user_id, post_id).await }).await??;

        tracing::debug!(user_id = user_id.0, post_id = %post_id, state = ?state, "like toggled");
        Ok(state)
    }

    pub async fn like_count(&self, post_id: PostId) -> Result<i64, BoardError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    pub async fn is_liked(&self, user_id: UserId, post_id: PostId) -> Result<bool, BoardError> {
        let liked = sqlx::query_scalar::<_, i64>("SELECT 1 FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(self.db.pool())
            .await?
            .is_some();
        Ok(liked)
    }
}

async fn toggle_in_tx(db: &Db, user_id: UserId, post_id: PostId) -> Result<LikeState, BoardError> {
    let mut tx = db.pool().begin().await?;

    let removed = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?;
    if removed.rows_affected() > 0 {
        tx.commit().await?;
        return Ok(LikeState::Unliked);
    }

    let user_exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();
    if !user_exists {
        tx.rollback().await?;
        return Err(BoardError::NotFound("user"));
    }

    let post_exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();
    if !post_exists {
        tx.rollback().await?;
        return Err(BoardError::NotFound("post"));
    }

    sqlx::query(
        "INSERT INTO likes (user_id, post_id) VALUES (?, ?) \
         ON CONFLICT (user_id, post_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(post_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(LikeState::Liked)
}
