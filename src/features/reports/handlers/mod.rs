pub mod comment_handler;
pub mod report_handler;
mod submission;

pub use comment_handler::{__path_create_comment, __path_list_comments, create_comment, list_comments};
pub use report_handler::{
    __path_create_report, __path_get_report, __path_list_reports, __path_update_report_status,
    create_report, get_report, list_reports, update_report_status, ReportState,
};
