use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User model representing the users table
///
/// Security note: `password` stores the argon2 hash, never plain text.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category a post is filed under. Unpublished categories hide every post
/// filed under them from public listings and detail pages.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Optional place a post is associated with.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// The joined row every post query returns: the post columns plus the
/// author's username, the category/location display fields and the live
/// comment count (aggregated at read time, never stored).
///
/// `category_*` fields are None for posts whose category was removed.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub comment_count: i64,
}

impl PostRow {
    /// The default public predicate: published, filed under a published
    /// category, and the scheduled publication time has passed.
    ///
    /// A post with no category never passes; there is no published
    /// category vouching for it.
    pub fn passes_public_filter(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.category_is_published.unwrap_or(false) && self.pub_date <= now
    }

    /// Detail-page visibility: the author always sees their own post,
    /// everyone else only when the public predicate holds. Callers turn a
    /// `false` into 404, never 403, so existence does not leak.
    pub fn is_visible_to(&self, viewer: Option<Uuid>, now: DateTime<Utc>) -> bool {
        viewer == Some(self.author_id) || self.passes_public_filter(now)
    }
}

/// Comment row joined with the author's username.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub post_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post_row(author_id: Uuid, pub_date: DateTime<Utc>) -> PostRow {
        PostRow {
            id: 1,
            title: "title".to_string(),
            text: "text".to_string(),
            pub_date,
            is_published: true,
            created_at: pub_date,
            author_id,
            author_username: "author".to_string(),
            category_id: Some(1),
            category_title: Some("General".to_string()),
            category_slug: Some("general".to_string()),
            category_is_published: Some(true),
            location_id: None,
            location_name: None,
            comment_count: 0,
        }
    }

    #[test]
    fn published_post_is_visible_to_everyone() {
        let now = Utc::now();
        let row = post_row(Uuid::new_v4(), now - Duration::hours(1));

        assert!(row.is_visible_to(None, now));
        assert!(row.is_visible_to(Some(Uuid::new_v4()), now));
    }

    #[test]
    fn unpublished_post_is_only_visible_to_its_author() {
        let author = Uuid::new_v4();
        let now = Utc::now();
        let mut row = post_row(author, now - Duration::hours(1));
        row.is_published = false;

        assert!(row.is_visible_to(Some(author), now));
        assert!(!row.is_visible_to(None, now));
        assert!(!row.is_visible_to(Some(Uuid::new_v4()), now));
    }

    #[test]
    fn future_dated_post_is_only_visible_to_its_author() {
        let author = Uuid::new_v4();
        let now = Utc::now();
        let row = post_row(author, now + Duration::days(1));

        assert!(row.is_visible_to(Some(author), now));
        assert!(!row.is_visible_to(Some(Uuid::new_v4()), now));
    }

    #[test]
    fn post_becomes_visible_once_pub_date_passes() {
        let tomorrow = Utc::now() + Duration::days(1);
        let row = post_row(Uuid::new_v4(), tomorrow);

        assert!(!row.is_visible_to(None, tomorrow - Duration::hours(1)));
        assert!(row.is_visible_to(None, tomorrow + Duration::hours(1)));
    }

    #[test]
    fn unpublished_category_hides_the_post() {
        let now = Utc::now();
        let mut row = post_row(Uuid::new_v4(), now - Duration::hours(1));
        row.category_is_published = Some(false);

        assert!(!row.passes_public_filter(now));
        assert!(row.is_visible_to(Some(row.author_id), now));
    }

    #[test]
    fn post_without_category_is_not_public() {
        let now = Utc::now();
        let mut row = post_row(Uuid::new_v4(), now - Duration::hours(1));
        row.category_id = None;
        row.category_title = None;
        row.category_slug = None;
        row.category_is_published = None;

        assert!(!row.passes_public_filter(now));
    }

    #[test]
    fn visibility_uses_the_single_clock_reading() {
        let now = Utc::now();
        let row = post_row(Uuid::new_v4(), now);

        // pub_date == now counts as reached
        assert!(row.passes_public_filter(now));
    }
}
