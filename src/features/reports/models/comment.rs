use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a comment on a report
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub report_id: i64,
    pub user_name: String,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new comment
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub user_name: String,
    pub comment_text: String,
}
