use super::DBClient;
use crate::models::Location;

/// Location database operations trait
pub trait LocationExt {
    /// Published locations, for the post form select choices
    async fn list_published_locations(&self) -> Result<Vec<Location>, sqlx::Error>;
}

impl LocationExt for DBClient {
    async fn list_published_locations(&self) -> Result<Vec<Location>, sqlx::Error> {
        let locations = sqlx::query_as::<_, Location>(
            r#"
            SELECT id, name, is_published, created_at
            FROM locations
            WHERE is_published = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}
