use sqlx::Row;

use crate::app::error::BoardError;
use crate::domain::timestamp;
use crate::domain::user::{User, UserId};
use crate::infra::db::{is_unique_violation, Db};

/// Lookup side of the identity collaborator. Credentials live elsewhere; this
/// only maps usernames to the ids likes are recorded against.
#[derive(Clone)]
pub struct UserService {
    db: Db,
}

impl UserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create_user(&self, username: &str) -> Result<User, BoardError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(BoardError::invalid("username cannot be empty"));
        }

        let created_at = timestamp::now()?;
        let result = sqlx::query("INSERT INTO users (username, created_at) VALUES (?, ?)")
            .bind(username)
            .bind(&created_at)
            .execute(self.db.pool())
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    BoardError::AlreadyExists("username")
                } else {
                    BoardError::from(err)
                }
            })?;

        Ok(User {
            id: UserId(result.last_insert_rowid()),
            username: username.to_string(),
            created_at,
        })
    }

    pub async fn id_for_username(&self, username: &str) -> Result<Option<UserId>, BoardError> {
        let id = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(id)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, BoardError> {
        let row = sqlx::query("SELECT id, username, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        let user = row.map(|row| User {
            id: row.get("id"),
            username: row.get("username"),
            created_at: row.get("created_at"),
        });

        Ok(user)
    }
}
