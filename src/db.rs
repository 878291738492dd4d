use sqlx::{Pool, Postgres};

mod user;
pub use user::UserExt;

mod category;
pub use category::CategoryExt;

mod location;
pub use location::LocationExt;

mod post;
pub use post::PostExt;

mod comment;
pub use comment::CommentExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}
