use anyhow::Result;
use sqlx::Row;
use time::OffsetDateTime;

use crate::domain::comment::Comment;
use crate::domain::user::User;
use crate::domain::{timestamp_from_micros, timestamp_micros};
use crate::infra::db::Db;

const COMMENT_COLUMNS: &str = "c.id, c.text, c.author_id, c.created_at, c.updated_at, \
                               c.likes, c.image, u.first_name AS author_name";

#[derive(Clone)]
pub struct CommentService {
    db: Db,
}

impl CommentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// All comments, newest first. Ties on `created_at` fall back to
    /// insertion order so repeated calls are stable.
    pub async fn list(&self) -> Result<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} \
             FROM comments c \
             JOIN users u ON c.author_id = u.id \
             ORDER BY c.created_at DESC, c.id DESC",
        ))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(map_comment).collect())
    }

    pub async fn get(&self, comment_id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!(
            "SELECT {COMMENT_COLUMNS} \
             FROM comments c \
             JOIN users u ON c.author_id = u.id \
             WHERE c.id = ?",
        ))
        .bind(comment_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(map_comment))
    }

    /// Insert a comment attributed to `author`. The author is resolved by
    /// the caller; this operation never looks one up itself.
    pub async fn create(
        &self,
        author: &User,
        text: String,
        likes: i64,
        image: Option<String>,
    ) -> Result<Comment> {
        // Truncate to stored precision so the returned timestamps match
        // every later read of the same row.
        let now = timestamp_from_micros(timestamp_micros(OffsetDateTime::now_utc()));

        let result = sqlx::query(
            "INSERT INTO comments (text, author_id, created_at, updated_at, likes, image) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&text)
        .bind(author.id)
        .bind(timestamp_micros(now))
        .bind(timestamp_micros(now))
        .bind(likes)
        .bind(&image)
        .execute(self.db.pool())
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            text,
            author: author.id,
            author_name: author.first_name.clone(),
            created_at: now,
            updated_at: now,
            likes,
            image,
        })
    }

    /// Partial update: `None` leaves a field unchanged. For `image` the
    /// outer `None` means "leave it", `Some(None)` clears the column.
    /// Refreshes `updated_at`; `created_at` is never touched.
    pub async fn update(
        &self,
        comment_id: i64,
        text: Option<String>,
        likes: Option<i64>,
        image: Option<Option<String>>,
    ) -> Result<Option<Comment>> {
        let now = OffsetDateTime::now_utc();

        let result = sqlx::query(
            "UPDATE comments \
             SET text = COALESCE(?, text), \
                 likes = COALESCE(?, likes), \
                 image = CASE WHEN ? THEN ? ELSE image END, \
                 updated_at = ? \
             WHERE id = ?",
        )
        .bind(text)
        .bind(likes)
        .bind(image.is_some())
        .bind(image.flatten())
        .bind(timestamp_micros(now))
        .bind(comment_id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(comment_id).await
    }

    pub async fn delete(&self, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every comment; used by the seed importer's reset step.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments")
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }
}

fn map_comment(row: sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        text: row.get("text"),
        author: row.get("author_id"),
        author_name: row.get("author_name"),
        created_at: timestamp_from_micros(row.get("created_at")),
        updated_at: timestamp_from_micros(row.get("updated_at")),
        likes: row.get("likes"),
        image: row.get("image"),
    }
}
