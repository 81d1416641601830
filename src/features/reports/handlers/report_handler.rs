use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::reports::dtos::{
    CreateReportResponseDto, ReportListQuery, ReportResponseDto, SubmitReportDto,
    UpdateReportStatusDto,
};
use crate::features::reports::handlers::submission::read_submission;
use crate::features::reports::services::{CommentService, ReportService};
use crate::modules::storage::LocalStorage;
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub comment_service: Arc<CommentService>,
    pub storage: LocalStorage,
}

/// Submit a new report
///
/// Accepts multipart/form-data with the report fields, up to five images
/// (`reportImages`) and an optional voice note (`voice_note`).
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body(
        content = SubmitReportDto,
        content_type = "multipart/form-data",
        description = "Report fields with optional images and voice note",
    ),
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<CreateReportResponseDto>),
        (status = 400, description = "Missing field, invalid value or disallowed file"),
        (status = 413, description = "File too large")
    ),
    tag = "reports"
)]
pub async fn create_report(
    State(state): State<ReportState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CreateReportResponseDto>>)> {
    let submission = read_submission(&mut multipart, &state.storage).await?;

    let report = state
        .report_service
        .create(&submission.report, submission.media)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(CreateReportResponseDto { id: report.id }),
            Some("Report submitted successfully!".to_string()),
            None,
        )),
    ))
}

/// List reports, newest first
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Matching reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Invalid date filter")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<ReportState>,
    AppQuery(query): AppQuery<ReportListQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let filter = query.into_filter()?;
    let reports = state.report_service.list(&filter).await?;
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Update report status (admin only)
#[utoipa::path(
    patch,
    path = "/api/admin/reports/{id}/status",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid status"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("basic_auth" = [])),
    tag = "admin"
)]
pub async fn update_report_status(
    State(state): State<ReportState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let dto = dto.trimmed();
    dto.validate()?;

    let report = state.report_service.update_status(id, &dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report status updated".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use chrono::{DateTime, Duration, Utc};
    use fake::faker::name::en::Name;
    use fake::faker::phone_number::en::PhoneNumber;
    use fake::Fake;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{admin_auth, basic_auth, TestApp};

    fn report_form(category: &str) -> MultipartForm {
        let name: String = Name().fake();
        let phone: String = PhoneNumber().fake();
        MultipartForm::new()
            .add_text("category", category)
            .add_text("name", name)
            .add_text("phone", phone)
            .add_text("location", "MG Road, near bus stop")
            .add_text("description", "Needs attention")
    }

    fn image(name: &str, mime: &str, size: usize) -> Part {
        Part::bytes(vec![7u8; size]).file_name(name).mime_type(mime)
    }

    async fn submit(app: &TestApp, form: MultipartForm) -> i64 {
        let response = app.server.post("/api/reports").multipart(form).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"]["id"].as_i64().unwrap()
    }

    fn assert_no_media(app: &TestApp) {
        assert_eq!(app.files_in("images"), 0);
        assert_eq!(app.files_in("audio"), 0);
        assert_eq!(app.files_in(".staging"), 0);
    }

    #[tokio::test]
    async fn test_submit_without_files_is_retrievable() {
        let app = TestApp::new().await;

        let response = app
            .server
            .post("/api/reports")
            .multipart(report_form("pothole"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Report submitted successfully!");
        let first = body["data"]["id"].as_i64().unwrap();

        let second = submit(&app, report_form("pothole")).await;
        assert!(second > first);

        let detail: Value = app
            .server
            .get(&format!("/api/reports/{}", first))
            .await
            .json();
        assert_eq!(detail["data"]["category"], "pothole");
        assert_eq!(detail["data"]["status"], "Pending");
        assert_eq!(detail["data"]["image_urls"], json!([]));
        assert_eq!(detail["data"]["voice_note_url"], Value::Null);
    }

    #[tokio::test]
    async fn test_bodies_use_the_response_envelope() {
        let app = TestApp::new().await;

        let created: Value = app
            .server
            .post("/api/reports")
            .multipart(report_form("litter"))
            .await
            .json();
        assert_eq!(created["success"], true);
        assert!(created["data"]["id"].is_i64());
        assert!(created.get("reportId").is_none());
        assert!(created.get("msg").is_none());

        let id = created["data"]["id"].as_i64().unwrap();
        let detail: Value = app
            .server
            .get(&format!("/api/reports/{}", id))
            .await
            .json();
        assert_eq!(detail["success"], true);
        assert_eq!(detail["data"]["id"], id);
        assert!(detail.get("category").is_none());

        let missing: Value = app.server.get("/api/reports/424242").await.json();
        assert_eq!(missing["success"], false);
        assert_eq!(missing["data"], Value::Null);
        assert!(missing["message"].is_string());
    }

    #[tokio::test]
    async fn test_missing_field_writes_nothing() {
        let app = TestApp::new().await;

        let form = MultipartForm::new()
            .add_text("category", "litter")
            .add_text("name", "Ravi")
            .add_text("location", "Park Street")
            .add_text("description", "   ")
            .add_part("reportImages", image("bin.png", "image/png", 64));
        let response = app.server.post("/api/reports").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        let errors = body["errors"].as_array().unwrap();
        assert!(errors.contains(&json!("phone is required")));
        assert!(errors.contains(&json!("description is required")));
        assert_eq!(app.count_rows("reports").await, 0);
        assert_no_media(&app);
    }

    #[tokio::test]
    async fn test_too_many_images_rejected_before_field_validation() {
        let app = TestApp::new().await;

        // No text fields at all: the upload layer must fail first
        let mut form = MultipartForm::new();
        for i in 0..6 {
            form = form.add_part(
                "reportImages[]",
                image(&format!("photo{}.jpg", i), "image/jpeg", 16),
            );
        }
        let response = app.server.post("/api/reports").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let message = response.json::<Value>()["message"].as_str().unwrap().to_string();
        assert!(message.contains("Too many images"), "{}", message);
        assert_eq!(app.count_rows("reports").await, 0);
        assert_no_media(&app);
    }

    #[tokio::test]
    async fn test_disallowed_file_type_is_rejected() {
        let app = TestApp::new().await;

        for part in [
            image("script.exe", "application/octet-stream", 16),
            image("photo.png", "text/html", 16),
            image("photo.svg", "image/svg+xml", 16),
        ] {
            let form = report_form("pothole").add_part("reportImages", part);
            app.server
                .post("/api/reports")
                .multipart(form)
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }

        let form = report_form("pothole").add_part(
            "voice_note",
            Part::bytes(vec![1u8; 16])
                .file_name("note.png")
                .mime_type("image/png"),
        );
        app.server
            .post("/api/reports")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(app.count_rows("reports").await, 0);
        assert_no_media(&app);
    }

    #[tokio::test]
    async fn test_oversized_image_is_payload_too_large() {
        let app = TestApp::new().await;
        let limit = app.config.upload.max_image_size;

        let form = report_form("pothole")
            .add_part("reportImages", image("ok.png", "image/png", 10))
            .add_part("reportImages", image("huge.png", "image/png", limit + 1));
        app.server
            .post("/api/reports")
            .multipart(form)
            .await
            .assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        assert_eq!(app.count_rows("reports").await, 0);
        assert_no_media(&app);
    }

    #[tokio::test]
    async fn test_media_is_stored_and_served() {
        let app = TestApp::new().await;

        let form = report_form("streetlight")
            .add_part("reportImages", image("a.jpg", "image/jpeg", 32))
            .add_part("reportImages[]", image("b.webp", "image/webp", 48))
            .add_part(
                "voice_note",
                Part::bytes(vec![3u8; 100])
                    .file_name("blob.webm")
                    .mime_type("audio/webm;codecs=opus"),
            )
            // Empty file input sent by browsers when nothing was picked
            .add_part(
                "reportImages",
                Part::bytes(Vec::<u8>::new())
                    .file_name("")
                    .mime_type("application/octet-stream"),
            );
        let id = submit(&app, form).await;

        let detail: Value = app
            .server
            .get(&format!("/api/reports/{}", id))
            .await
            .json();
        let images = detail["data"]["image_urls"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].as_str().unwrap().ends_with(".jpg"));
        assert!(images[1].as_str().unwrap().ends_with(".webp"));
        let voice_note = detail["data"]["voice_note_url"].as_str().unwrap();
        assert!(voice_note.starts_with("uploads/audio/"));

        assert_eq!(app.files_in("images"), 2);
        assert_eq!(app.files_in("audio"), 1);
        assert_eq!(app.files_in(".staging"), 0);

        let served = app
            .server
            .get(&format!("/{}", images[1].as_str().unwrap()))
            .await;
        served.assert_status_ok();
        assert_eq!(served.as_bytes().len(), 48);
    }

    #[tokio::test]
    async fn test_typed_details_round_trip() {
        let app = TestApp::new().await;

        let form = report_form("pothole")
            .add_text("details", r#"{"potholeSize":"large","potholeDepth":"deep"}"#)
            .add_text("latitude", "12.9716")
            .add_text("longitude", "77.5946")
            .add_text("map_url", "https://maps.example.com/?q=12.9716,77.5946");
        let id = submit(&app, form).await;

        let detail: Value = app
            .server
            .get(&format!("/api/reports/{}", id))
            .await
            .json();
        assert_eq!(
            detail["data"]["details"],
            json!({"kind": "pothole", "size": "large", "depth": "deep"})
        );
        assert_eq!(detail["data"]["latitude"], 12.9716);
        assert_eq!(detail["data"]["longitude"], 77.5946);

        let form = report_form("litter").add_text("details", r#"{"binStatus":"on_fire"}"#);
        app.server
            .post("/api/reports")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters_by_exact_category() {
        let app = TestApp::new().await;
        for category in ["pothole", "Pothole", "litter", "pothole"] {
            submit(&app, report_form(category)).await;
        }

        let response = app
            .server
            .get("/api/reports")
            .add_query_param("category", "pothole")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let reports = body["data"].as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r["category"] == "pothole"));
        assert_eq!(body["meta"]["total"], 2);

        let all: Value = app.server.get("/api/reports").await.json();
        assert_eq!(all["meta"]["total"], 4);
    }

    #[tokio::test]
    async fn test_list_date_range_is_inclusive_and_descending() {
        let app = TestApp::new().await;
        for category in ["pothole", "litter", "streetlight"] {
            submit(&app, report_form(category)).await;
        }

        let all: Value = app.server.get("/api/reports").await.json();
        let created: Vec<DateTime<Utc>> = all["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["created_at"].as_str().unwrap().parse().unwrap())
            .collect();
        assert!(created.windows(2).all(|w| w[0] >= w[1]));

        let day = created[0].date_naive().to_string();
        let response = app
            .server
            .get("/api/reports")
            .add_query_param("startDate", &day)
            .add_query_param("endDate", &day)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["meta"]["total"], 3);

        let yesterday = (created[2] - Duration::days(1)).date_naive().to_string();
        let response = app
            .server
            .get("/api/reports")
            .add_query_param("endDate", &yesterday)
            .await;
        assert_eq!(response.json::<Value>()["meta"]["total"], 0);

        // An exact timestamp bound includes the report created at that instant
        let newest = all["data"][0]["created_at"].as_str().unwrap();
        let response = app
            .server
            .get("/api/reports")
            .add_query_param("startDate", newest)
            .await;
        assert!(response.json::<Value>()["meta"]["total"].as_i64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_dates() {
        let app = TestApp::new().await;

        app.server
            .get("/api/reports")
            .add_query_param("startDate", "last tuesday")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        app.server
            .get("/api/reports")
            .add_query_param("startDate", "2024-06-02")
            .add_query_param("endDate", "2024-06-01")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_report_is_not_found() {
        let app = TestApp::new().await;

        let response = app.server.get("/api/reports/4242").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_admin_status_update_requires_basic_auth() {
        let app = TestApp::new().await;
        let id = submit(&app, report_form("pothole")).await;
        let path = format!("/api/admin/reports/{}/status", id);

        let response = app
            .server
            .patch(&path)
            .json(&json!({ "status": "Resolved" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        app.server
            .patch(&path)
            .add_header(header::AUTHORIZATION, basic_auth("admin", "guess"))
            .json(&json!({ "status": "Resolved" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        app.server
            .patch(&path)
            .add_header(header::AUTHORIZATION, admin_auth())
            .json(&json!({ "status": "  " }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .server
            .patch(&path)
            .add_header(header::AUTHORIZATION, admin_auth())
            .json(&json!({ "status": "In Progress" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["status"], "In Progress");

        let listed: Value = app
            .server
            .get("/api/reports")
            .add_query_param("status", "In Progress")
            .await
            .json();
        assert_eq!(listed["meta"]["total"], 1);
        assert_eq!(listed["data"][0]["id"], id);

        app.server
            .patch("/api/admin/reports/9999/status")
            .add_header(header::AUTHORIZATION, admin_auth())
            .json(&json!({ "status": "Resolved" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_routes_absent_without_credentials() {
        let app = TestApp::with_config(|config| {
            config.admin.username = None;
            config.admin.password = None;
        })
        .await;

        app.server
            .patch("/api/admin/reports/1/status")
            .add_header(header::AUTHORIZATION, admin_auth())
            .json(&json!({ "status": "Resolved" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let app = TestApp::new().await;

        let response = app.server.get("/health").await;
        response.assert_status_ok();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
