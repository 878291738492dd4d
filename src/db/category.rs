use super::DBClient;
use crate::models::Category;

/// Category database operations trait
pub trait CategoryExt {
    /// Look up a published category by slug. Unpublished categories are
    /// treated as absent; their pages must be unreachable.
    async fn get_published_category(&self, slug: &str) -> Result<Option<Category>, sqlx::Error>;

    /// Published categories, for the post form select choices
    async fn list_published_categories(&self) -> Result<Vec<Category>, sqlx::Error>;
}

impl CategoryExt for DBClient {
    async fn get_published_category(&self, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, slug, description, is_published, created_at
            FROM categories
            WHERE slug = $1 AND is_published = TRUE
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn list_published_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, slug, description, is_published, created_at
            FROM categories
            WHERE is_published = TRUE
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
