mod comment_service;
mod report_service;

pub use comment_service::CommentService;
pub use report_service::ReportService;
