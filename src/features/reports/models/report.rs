use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::features::reports::models::ReportDetails;

/// Column list shared by every query returning a [`Report`]
pub const REPORT_COLUMNS: &str = r#"
    id, category, name, phone, location, description, details,
    latitude, longitude, map_url, status, image_urls, voice_note_url, created_at
"#;

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub description: String,
    pub details: Option<Json<ReportDetails>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub map_url: Option<String>,
    pub status: String,
    pub image_urls: Json<Vec<String>>,
    pub voice_note_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new report; media paths come from the staged batch
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub category: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub description: String,
    pub details: Option<ReportDetails>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub map_url: Option<String>,
}

/// Conjunctive filter for report listing; `None` means the predicate is omitted
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub category: Option<String>,
    pub status: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub created_until: Option<DateTime<Utc>>,
}
