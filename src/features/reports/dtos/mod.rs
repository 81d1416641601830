mod comment_dto;
mod report_dto;

pub use comment_dto::{CommentResponseDto, CreateCommentDto};
pub use report_dto::{
    CreateReportResponseDto, ReportListQuery, ReportResponseDto, SubmitReportDto,
    UpdateReportStatusDto,
};
