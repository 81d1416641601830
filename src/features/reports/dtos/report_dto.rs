use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Report, ReportDetails, ReportFilter};
use crate::shared::validation::non_blank;

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub description: String,
    pub details: Option<ReportDetails>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub map_url: Option<String>,
    pub status: String,
    /// Relative paths under the upload directory, in upload order
    pub image_urls: Vec<String>,
    pub voice_note_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            category: r.category,
            name: r.name,
            phone: r.phone,
            location: r.location,
            description: r.description,
            details: r.details.map(|d| d.0),
            latitude: r.latitude,
            longitude: r.longitude,
            map_url: r.map_url,
            status: r.status,
            image_urls: r.image_urls.0,
            voice_note_url: r.voice_note_url,
            created_at: r.created_at,
        }
    }
}

/// Response DTO for a newly created report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReportResponseDto {
    pub id: i64,
}

/// Report submission form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler reads the multipart stream directly.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct SubmitReportDto {
    #[schema(example = "pothole")]
    pub category: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub map_url: Option<String>,
    /// JSON object with category-specific fields, e.g. `{"potholeSize":"large"}`
    #[schema(example = r#"{"potholeSize":"large","potholeDepth":"deep"}"#)]
    pub details: Option<String>,
    /// Up to five image files (jpg, jpeg, png, gif, webp); `reportImages[]` is also accepted
    #[serde(rename = "reportImages")]
    pub report_images: Vec<String>,
    /// Optional recorded voice note (webm, ogg, mp3, wav, m4a)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub voice_note: Option<String>,
}

/// Query parameters for listing reports
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    /// Exact category match (case-sensitive)
    pub category: Option<String>,
    /// Exact status match
    pub status: Option<String>,
    /// Inclusive lower bound: `YYYY-MM-DD` or RFC 3339 timestamp
    pub start_date: Option<String>,
    /// Inclusive upper bound: `YYYY-MM-DD` (whole day) or RFC 3339 timestamp
    pub end_date: Option<String>,
}

impl ReportListQuery {
    /// Convert into a filter; blank parameters are omitted
    pub fn into_filter(self) -> Result<ReportFilter> {
        let created_from = non_blank(self.start_date)
            .map(|v| parse_date_bound("startDate", &v, false))
            .transpose()?;
        let created_until = non_blank(self.end_date)
            .map(|v| parse_date_bound("endDate", &v, true))
            .transpose()?;

        if let (Some(from), Some(until)) = (created_from, created_until) {
            if from > until {
                return Err(AppError::validation(
                    "startDate must not be after endDate",
                ));
            }
        }

        Ok(ReportFilter {
            category: non_blank(self.category),
            status: non_blank(self.status),
            created_from,
            created_until,
        })
    }
}

/// Parse a date filter value. A bare date used as an upper bound covers the whole day.
fn parse_date_bound(name: &str, value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    let invalid = || {
        AppError::validation(format!(
            "{} must be a date (YYYY-MM-DD) or an RFC 3339 timestamp",
            name
        ))
    };

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    let naive = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    naive.map(|n| n.and_utc()).ok_or_else(invalid)
}

/// Request DTO for updating report status
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReportStatusDto {
    /// Free-text status, e.g. "Pending", "In Progress", "Resolved"
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "status must be 1-50 characters"))]
    pub status: String,
}

impl UpdateReportStatusDto {
    pub fn trimmed(self) -> Self {
        Self {
            status: self.status.trim().to_string(),
        }
    }
}
