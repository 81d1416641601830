use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};

/// Create public routes for the reports feature
///
/// Submissions carry media, so the create route gets its own body limit
/// sized for the configured number of images plus a voice note.
pub fn routes(state: ReportState, max_submission_size: usize) -> Router {
    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report).layer(
                DefaultBodyLimit::max(max_submission_size),
            ),
        )
        .route("/api/reports/{id}", get(handlers::get_report))
        .route(
            "/api/reports/{id}/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .with_state(state)
}

/// Administrative report routes, nested under `/api/admin` behind basic auth
pub fn admin_routes(state: ReportState) -> Router {
    Router::new()
        .route(
            "/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .with_state(state)
}
