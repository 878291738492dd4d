use super::DBClient;
use crate::models::PostRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Post database operations trait
///
/// Every listing takes `now` as a bind parameter: the handler reads the
/// clock once per request and all visibility checks in that request use
/// the same instant.
pub trait PostExt {
    /// Fetch one post row regardless of visibility; the handler decides
    /// whether the viewer may see it.
    async fn get_post(&self, post_id: i64) -> Result<Option<PostRow>, sqlx::Error>;

    /// Publicly visible posts, newest pub_date first
    async fn list_public_posts(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error>;

    async fn count_public_posts(&self, now: DateTime<Utc>) -> Result<i64, sqlx::Error>;

    /// Publicly visible posts in one category
    async fn list_category_posts(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error>;

    async fn count_category_posts(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error>;

    /// Posts by one author. With `only_public` the default visibility
    /// predicate applies; without it the owner sees everything,
    /// unpublished and future-dated posts included.
    async fn list_author_posts(
        &self,
        author_id: Uuid,
        only_public: bool,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error>;

    async fn count_author_posts(
        &self,
        author_id: Uuid,
        only_public: bool,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error>;

    async fn create_post(
        &self,
        author_id: Uuid,
        title: &str,
        text: &str,
        pub_date: DateTime<Utc>,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<i64, sqlx::Error>;

    /// Update a post. The author check is part of the WHERE clause, so a
    /// non-author update affects zero rows and surfaces as RowNotFound.
    async fn update_post(
        &self,
        post_id: i64,
        author_id: Uuid,
        title: &str,
        text: &str,
        pub_date: DateTime<Utc>,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), sqlx::Error>;

    /// Delete a post and (via the FK cascade) its comments.
    async fn delete_post(&self, post_id: i64, author_id: Uuid) -> Result<(), sqlx::Error>;
}

/// Shared SELECT: post columns plus the joined display fields and the
/// read-time comment count.
const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.is_published, p.created_at,
           p.author_id, u.username AS author_username,
           p.category_id, c.title AS category_title, c.slug AS category_slug,
           c.is_published AS category_is_published,
           p.location_id, l.name AS location_name,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    INNER JOIN users u ON p.author_id = u.id
    LEFT JOIN categories c ON p.category_id = c.id
    LEFT JOIN locations l ON p.location_id = l.id
"#;

const COUNT_SELECT: &str = r#"
    SELECT COUNT(*)
    FROM posts p
    LEFT JOIN categories c ON p.category_id = c.id
"#;

// The default public predicate. A NULL category never compares TRUE, so
// posts without a category stay out of public listings.
const PUBLIC_FILTER: &str =
    "p.is_published = TRUE AND c.is_published = TRUE AND p.pub_date <= $1";

impl PostExt for DBClient {
    async fn get_post(&self, post_id: i64) -> Result<Option<PostRow>, sqlx::Error> {
        let post = sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    async fn list_public_posts(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error> {
        let posts = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE {PUBLIC_FILTER} ORDER BY p.pub_date DESC LIMIT $2 OFFSET $3"
        ))
        .bind(now)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count_public_posts(&self, now: DateTime<Utc>) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(&format!("{COUNT_SELECT} WHERE {PUBLIC_FILTER}"))
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_category_posts(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error> {
        let posts = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} WHERE {PUBLIC_FILTER} AND p.category_id = $2 \
             ORDER BY p.pub_date DESC LIMIT $3 OFFSET $4"
        ))
        .bind(now)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count_category_posts(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "{COUNT_SELECT} WHERE {PUBLIC_FILTER} AND p.category_id = $2"
        ))
        .bind(now)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_author_posts(
        &self,
        author_id: Uuid,
        only_public: bool,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostRow>, sqlx::Error> {
        let posts = if only_public {
            sqlx::query_as::<_, PostRow>(&format!(
                "{POST_SELECT} WHERE {PUBLIC_FILTER} AND p.author_id = $2 \
                 ORDER BY p.pub_date DESC LIMIT $3 OFFSET $4"
            ))
            .bind(now)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            // Owner view: the visibility predicate is bypassed entirely.
            sqlx::query_as::<_, PostRow>(&format!(
                "{POST_SELECT} WHERE p.author_id = $1 \
                 ORDER BY p.pub_date DESC LIMIT $2 OFFSET $3"
            ))
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(posts)
    }

    async fn count_author_posts(
        &self,
        author_id: Uuid,
        only_public: bool,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let count = if only_public {
            sqlx::query_scalar::<_, i64>(&format!(
                "{COUNT_SELECT} WHERE {PUBLIC_FILTER} AND p.author_id = $2"
            ))
            .bind(now)
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar::<_, i64>(&format!("{COUNT_SELECT} WHERE p.author_id = $1"))
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?
        };

        Ok(count)
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        title: &str,
        text: &str,
        pub_date: DateTime<Utc>,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        let post_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, category_id, location_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(text)
        .bind(pub_date)
        .bind(author_id)
        .bind(category_id)
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post_id)
    }

    async fn update_post(
        &self,
        post_id: i64,
        author_id: Uuid,
        title: &str,
        text: &str,
        pub_date: DateTime<Utc>,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, text = $2, pub_date = $3, category_id = $4, location_id = $5
            WHERE id = $6 AND author_id = $7
            "#,
        )
        .bind(title)
        .bind(text)
        .bind(pub_date)
        .bind(category_id)
        .bind(location_id)
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    async fn delete_post(&self, post_id: i64, author_id: Uuid) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}
