mod comment;
mod report;
mod report_details;

pub use comment::{Comment, CreateComment};
pub use report::{CreateReport, Report, ReportFilter, REPORT_COLUMNS};
pub use report_details::{BinStatus, LightIssue, PotholeDepth, PotholeSize, ReportDetails};
