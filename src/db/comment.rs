use super::DBClient;
use crate::models::CommentRow;
use uuid::Uuid;

/// Comment database operations trait
pub trait CommentExt {
    /// Fetch one comment with its author's username
    async fn get_comment(&self, comment_id: i64) -> Result<Option<CommentRow>, sqlx::Error>;

    /// Full comment thread of a post, oldest first
    async fn list_post_comments(&self, post_id: i64) -> Result<Vec<CommentRow>, sqlx::Error>;

    /// Create new comment on a post
    async fn create_comment(
        &self,
        author_id: Uuid,
        post_id: i64,
        text: &str,
    ) -> Result<CommentRow, sqlx::Error>;

    /// Update comment text (author check in the WHERE clause)
    async fn update_comment(
        &self,
        comment_id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<(), sqlx::Error>;

    /// Delete comment (author check in the WHERE clause)
    async fn delete_comment(&self, comment_id: i64, author_id: Uuid) -> Result<(), sqlx::Error>;
}

const COMMENT_SELECT: &str = r#"
    SELECT cm.id, cm.text, cm.created_at, cm.author_id,
           u.username AS author_username, cm.post_id
    FROM comments cm
    INNER JOIN users u ON cm.author_id = u.id
"#;

impl CommentExt for DBClient {
    async fn get_comment(&self, comment_id: i64) -> Result<Option<CommentRow>, sqlx::Error> {
        let comment =
            sqlx::query_as::<_, CommentRow>(&format!("{COMMENT_SELECT} WHERE cm.id = $1"))
                .bind(comment_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(comment)
    }

    async fn list_post_comments(&self, post_id: i64) -> Result<Vec<CommentRow>, sqlx::Error> {
        let comments = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE cm.post_id = $1 ORDER BY cm.created_at ASC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn create_comment(
        &self,
        author_id: Uuid,
        post_id: i64,
        text: &str,
    ) -> Result<CommentRow, sqlx::Error> {
        let comment = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH new_comment AS (
                INSERT INTO comments (author_id, post_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, text, created_at, author_id, post_id
            )
            SELECT nc.id, nc.text, nc.created_at, nc.author_id,
                   u.username AS author_username, nc.post_id
            FROM new_comment nc
            INNER JOIN users u ON nc.author_id = u.id
            "#,
        )
        .bind(author_id)
        .bind(post_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn update_comment(
        &self,
        comment_id: i64,
        author_id: Uuid,
        text: &str,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query("UPDATE comments SET text = $1 WHERE id = $2 AND author_id = $3")
            .bind(text)
            .bind(comment_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn delete_comment(&self, comment_id: i64, author_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(comment_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}
