use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::reports::dtos::{CommentResponseDto, CreateCommentDto};
use crate::features::reports::handlers::ReportState;
use crate::shared::types::ApiResponse;

/// List comments on a report, newest first
#[utoipa::path(
    get,
    path = "/api/reports/{id}/comments",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Comments of the report", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 404, description = "Report not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let comments = state.comment_service.list_for_report(id).await?;
    let dtos: Vec<CommentResponseDto> = comments.into_iter().map(|c| c.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Add a comment to a report
#[utoipa::path(
    post,
    path = "/api/reports/{id}/comments",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Missing userName or commentText"),
        (status = 404, description = "Report not found")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    let dto = dto.trimmed();
    dto.validate()?;

    let comment = state.comment_service.create(id, &dto.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(comment.into()),
            Some("Comment added".to_string()),
            None,
        )),
    ))
}
