use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::signup,
        auth_handlers::login,
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        // Comments
        reports_handlers::list_comments,
        reports_handlers::create_comment,
        // Admin
        reports_handlers::update_report_status,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth_dtos::SignupRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::UserResponseDto,
            ApiResponse<auth_dtos::UserResponseDto>,
            // Reports
            reports_models::ReportDetails,
            reports_models::PotholeSize,
            reports_models::PotholeDepth,
            reports_models::LightIssue,
            reports_models::BinStatus,
            reports_dtos::SubmitReportDto,
            reports_dtos::UpdateReportStatusDto,
            ApiResponse<reports_dtos::CreateReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            // Comments
            reports_dtos::CreateCommentDto,
            ApiResponse<Vec<reports_dtos::CommentResponseDto>>,
            ApiResponse<reports_dtos::CommentResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Citizen signup and login"),
        (name = "reports", description = "Civic issue reports with photos and voice notes"),
        (name = "comments", description = "Public comments on reports"),
        (name = "admin", description = "Report moderation (basic auth)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CivicSync API",
        version = "0.1.0",
        description = "API documentation for CivicSync",
    )
)]
pub struct ApiDoc;

/// Adds the basic auth scheme guarding the admin routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/signup",
            "/login",
            "/api/reports",
            "/api/reports/{id}",
            "/api/reports/{id}/comments",
            "/api/admin/reports/{id}/status",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} is missing", path);
        }
    }
}
