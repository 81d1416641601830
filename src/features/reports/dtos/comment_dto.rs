use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::reports::models::{Comment, CreateComment};

/// Request DTO for adding a comment to a report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentDto {
    /// Display name of the commenter (not authenticated)
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "userName is required (max 255 characters)"))]
    pub user_name: String,

    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 2000,
        message = "commentText is required (max 2000 characters)"
    ))]
    pub comment_text: String,
}

impl CreateCommentDto {
    /// Strip surrounding whitespace so blank input fails the presence check
    pub fn trimmed(self) -> Self {
        Self {
            user_name: self.user_name.trim().to_string(),
            comment_text: self.comment_text.trim().to_string(),
        }
    }
}

impl From<CreateCommentDto> for CreateComment {
    fn from(dto: CreateCommentDto) -> Self {
        Self {
            user_name: dto.user_name,
            comment_text: dto.comment_text,
        }
    }
}

/// Response DTO for comment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponseDto {
    pub id: i64,
    pub report_id: i64,
    pub user_name: String,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            report_id: c.report_id,
            user_name: c.user_name,
            comment_text: c.comment_text,
            created_at: c.created_at,
        }
    }
}
