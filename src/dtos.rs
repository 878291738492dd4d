use crate::models::{Category, CommentRow, Location, PostRow, User};
use crate::pagination::PageMeta;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationErrors};

// DTOs define the structure of data exchanged with clients. They are
// separate from database models to control exactly what data is exposed.

// ============================================================================
// Authentication DTOs
// ============================================================================

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[serde(default, rename = "firstName")]
    pub first_name: String,

    #[serde(default, rename = "lastName")]
    pub last_name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "confirmPassword")]
    pub password_confirm: String,
}

/// Login request - accepts email or username
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email or username is required"))]
    pub identifier: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub access_token: String,
    pub username: String,
}

// ============================================================================
// Form DTOs
// ============================================================================

/// Post submission. `author` and `is_published` are server-assigned and
/// never read from the payload.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostFormDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,

    #[validate(required(message = "Publication date is required"))]
    pub pub_date: Option<NaiveDate>,

    pub category: Option<i64>,
    pub location: Option<i64>,
}

/// Comment submission. `post` and `author` are injected by the handler
/// regardless of payload content.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CommentFormDto {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Text must be between 1 and 1000 characters"
    ))]
    pub text: String,
}

/// Profile edit, self-only.
#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProfileFormDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[serde(default, rename = "firstName")]
    pub first_name: String,

    #[serde(default, rename = "lastName")]
    pub last_name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
}

/// Validation-failure payload: the submitted values echoed back with
/// per-field error messages. Served with HTTP 200, the submission page
/// re-renders from it.
#[derive(Debug, Serialize)]
pub struct FormErrorsDto<T> {
    pub status: String,
    pub values: T,
    pub errors: HashMap<String, Vec<String>>,
}

impl<T: Serialize> FormErrorsDto<T> {
    pub fn new(values: T, errors: &ValidationErrors) -> Self {
        FormErrorsDto {
            status: "fail".to_string(),
            values,
            errors: field_errors(errors),
        }
    }
}

/// Flatten `ValidationErrors` into field -> human messages.
pub fn field_errors(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

// ============================================================================
// Query DTOs
// ============================================================================

/// Listing query string. Out-of-range pages are clamped, not rejected.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PageQueryDto {
    pub page: Option<i64>,
}

// ============================================================================
// Post & comment response DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl CategoryDto {
    pub fn filter_category(category: &Category) -> Self {
        CategoryDto {
            id: category.id,
            title: category.title.to_owned(),
            slug: category.slug.to_owned(),
            description: category.description.to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocationDto {
    pub id: i64,
    pub name: String,
}

impl LocationDto {
    pub fn filter_location(location: &Location) -> Self {
        LocationDto {
            id: location.id,
            name: location.name.to_owned(),
        }
    }
}

/// Post as served to clients, with the joined display fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostDto {
    pub id: i64,
    pub title: String,
    pub text: String,
    #[serde(rename = "pubDate")]
    pub pub_date: DateTime<Utc>,
    #[serde(rename = "isPublished")]
    pub is_published: bool,
    pub author: String,
    pub category: Option<String>,
    #[serde(rename = "categorySlug")]
    pub category_slug: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "commentCount")]
    pub comment_count: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl PostDto {
    pub fn from_row(row: &PostRow) -> Self {
        PostDto {
            id: row.id,
            title: row.title.to_owned(),
            text: row.text.to_owned(),
            pub_date: row.pub_date,
            is_published: row.is_published,
            author: row.author_username.to_owned(),
            category: row.category_title.to_owned(),
            category_slug: row.category_slug.to_owned(),
            location: row.location_name.to_owned(),
            comment_count: row.comment_count,
            created_at: row.created_at,
        }
    }

    pub fn from_rows(rows: &[PostRow]) -> Vec<PostDto> {
        rows.iter().map(PostDto::from_row).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: i64,
    pub author: String,
    #[serde(rename = "postId")]
    pub post_id: i64,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl CommentDto {
    pub fn from_row(row: &CommentRow) -> Self {
        CommentDto {
            id: row.id,
            author: row.author_username.to_owned(),
            post_id: row.post_id,
            text: row.text.to_owned(),
            created_at: row.created_at,
        }
    }

    pub fn from_rows(rows: &[CommentRow]) -> Vec<CommentDto> {
        rows.iter().map(CommentDto::from_row).collect()
    }
}

/// Paginated post listing (index, category and profile pages).
#[derive(Debug, Serialize)]
pub struct PostListResponseDto {
    pub status: String,
    pub data: Vec<PostDto>,
    pub pagination: PageMeta,
}

/// Category page: the category header plus its page of posts.
#[derive(Debug, Serialize)]
pub struct CategoryPostsResponseDto {
    pub status: String,
    pub category: CategoryDto,
    pub data: Vec<PostDto>,
    pub pagination: PageMeta,
}

/// Post detail: the post plus its full comment thread, oldest first.
#[derive(Debug, Serialize)]
pub struct PostDetailResponseDto {
    pub status: String,
    pub data: PostDto,
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize)]
pub struct PostResponseDto {
    pub status: String,
    pub data: PostDto,
}

#[derive(Debug, Serialize)]
pub struct CommentResponseDto {
    pub status: String,
    pub data: CommentDto,
}

/// GET on a post form route: the form values to prefill, whether the
/// pub_date field is still editable, and the select choices.
#[derive(Debug, Serialize)]
pub struct PostFormPayloadDto {
    pub status: String,
    pub form: PostFormDto,
    #[serde(rename = "pubDateEditable")]
    pub pub_date_editable: bool,
    pub categories: Vec<CategoryDto>,
    pub locations: Vec<LocationDto>,
}

#[derive(Debug, Serialize)]
pub struct CommentFormPayloadDto {
    pub status: String,
    pub form: CommentFormDto,
}

#[derive(Debug, Serialize)]
pub struct ProfileFormPayloadDto {
    pub status: String,
    pub form: ProfileFormDto,
}

// ============================================================================
// Profile response DTOs
// ============================================================================

/// User data sent to clients (excludes the password hash).
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileDto {
    pub id: String,
    pub username: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ProfileDto {
    pub fn filter_user(user: &User) -> Self {
        ProfileDto {
            id: user.id.to_string(),
            username: user.username.to_owned(),
            first_name: user.first_name.to_owned(),
            last_name: user.last_name.to_owned(),
            email: user.email.to_owned(),
            created_at: user.created_at,
        }
    }
}

/// Profile page: the owner's public data plus their page of posts.
#[derive(Debug, Serialize)]
pub struct ProfilePostsResponseDto {
    pub status: String,
    pub profile: ProfileDto,
    pub data: Vec<PostDto>,
    pub pagination: PageMeta,
}

/// Generic success response
#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_form_requires_title_text_and_date() {
        let form = PostFormDto::default();
        let errors = form.validate().expect_err("empty form rejected");
        let fields = field_errors(&errors);

        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("text"));
        assert!(fields.contains_key("pub_date"));
    }

    #[test]
    fn post_form_category_and_location_are_optional() {
        let form = PostFormDto {
            title: "A day out".to_string(),
            text: "Went outside.".to_string(),
            pub_date: Some(NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")),
            category: None,
            location: None,
        };

        assert!(form.validate().is_ok());
    }

    #[test]
    fn post_form_parses_plain_dates() {
        let form: PostFormDto = serde_json::from_str(
            r#"{"title":"t","text":"b","pub_date":"2024-05-01","category":3}"#,
        )
        .expect("deserializes");

        assert_eq!(form.pub_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(form.category, Some(3));
        assert_eq!(form.location, None);
    }

    #[test]
    fn comment_form_enforces_length_bounds() {
        let empty = CommentFormDto {
            text: String::new(),
        };
        assert!(empty.validate().is_err());

        let too_long = CommentFormDto {
            text: "x".repeat(1001),
        };
        assert!(too_long.validate().is_err());

        let ok = CommentFormDto {
            text: "nice post".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn comment_form_ignores_author_and_post_in_the_payload() {
        // Only the text field is client-editable; anything else in the
        // payload is dropped on the floor.
        let form: CommentFormDto = serde_json::from_str(
            r#"{"text":"hi","author":"mallory","post":99,"author_id":"abc"}"#,
        )
        .expect("deserializes");

        assert_eq!(form.text, "hi");
        assert_eq!(
            serde_json::to_value(&form).expect("serializes"),
            serde_json::json!({"text": "hi"})
        );
    }

    #[test]
    fn register_rejects_mismatched_passwords() {
        let body = RegisterUserDto {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirm: "secret2".to_string(),
            ..Default::default()
        };

        let errors = body.validate().expect_err("mismatch rejected");
        assert!(field_errors(&errors).contains_key("password_confirm"));
    }

    #[test]
    fn field_errors_keeps_custom_messages() {
        let form = PostFormDto {
            text: "b".to_string(),
            pub_date: Some(NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")),
            ..Default::default()
        };
        let errors = form.validate().expect_err("missing title rejected");
        let fields = field_errors(&errors);

        assert_eq!(fields["title"], vec!["Title is required".to_string()]);
    }

    #[test]
    fn profile_dto_never_carries_the_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            username: "bob".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Bones".to_string(),
            email: "bob@example.com".to_string(),
            password: "$argon2id$hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&ProfileDto::filter_user(&user)).expect("serializes");
        assert!(!json.contains("argon2id"));
        assert!(json.contains("bob@example.com"));
    }
}
