//! Multipart reading for report submissions
//!
//! File parts are streamed into a [`StagedBatch`] as they arrive, so count,
//! type and size limits are enforced before the text fields are validated.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, ReportDetails};
use crate::modules::storage::{LocalStorage, MediaKind, StagedBatch};
use crate::shared::constants::{IMAGE_FIELD_NAMES, VOICE_NOTE_FIELD_NAME};
use crate::shared::validation::non_blank;

/// A parsed submission: validated fields plus the staged media
pub struct ReportSubmission {
    pub report: CreateReport,
    pub media: StagedBatch,
}

/// Raw text fields as submitted, trimmed
#[derive(Debug, Default, Validate)]
struct ReportForm {
    #[validate(length(min = 1, message = "category is required"))]
    category: String,
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    phone: String,
    #[validate(length(min = 1, message = "location is required"))]
    location: String,
    #[validate(length(min = 1, message = "description is required"))]
    description: String,
    latitude: Option<String>,
    longitude: Option<String>,
    map_url: Option<String>,
    details: Option<String>,
}

impl ReportForm {
    fn set(&mut self, name: &str, value: String) {
        let value = value.trim().to_string();
        match name {
            "category" => self.category = value,
            "name" => self.name = value,
            "phone" => self.phone = value,
            "location" => self.location = value,
            "description" => self.description = value,
            "latitude" => self.latitude = Some(value),
            "longitude" => self.longitude = Some(value),
            "map_url" => self.map_url = Some(value),
            "details" => self.details = Some(value),
            _ => debug!("Ignoring unknown field: {}", name),
        }
    }

    fn into_report(self) -> Result<CreateReport> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => match AppError::from(e) {
                AppError::Validation(messages) => messages,
                other => return Err(other),
            },
        };

        let latitude = parse_coordinate("latitude", self.latitude, 90.0).unwrap_or_else(|e| {
            errors.push(e);
            None
        });
        let longitude = parse_coordinate("longitude", self.longitude, 180.0).unwrap_or_else(|e| {
            errors.push(e);
            None
        });

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let details = ReportDetails::from_form(&self.category, self.details.as_deref())?;

        Ok(CreateReport {
            category: self.category,
            name: self.name,
            phone: self.phone,
            location: self.location,
            description: self.description,
            details,
            latitude,
            longitude,
            map_url: non_blank(self.map_url),
        })
    }
}

fn parse_coordinate(
    name: &str,
    value: Option<String>,
    bound: f64,
) -> std::result::Result<Option<f64>, String> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && (-bound..=bound).contains(&v) => Ok(Some(v)),
        _ => Err(format!(
            "{} must be a number between -{} and {}",
            name, bound, bound
        )),
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Stream one file part into the batch
async fn stage_file(batch: &mut StagedBatch, kind: MediaKind, mut field: Field<'_>) -> Result<()> {
    let extension = kind.accept(field.file_name(), field.content_type())?;
    let mut writer = batch.open(kind, extension).await?;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        writer.write_chunk(&chunk).await?;
    }
    writer.finish().await?;
    Ok(())
}

/// Read a report submission from the multipart stream.
///
/// Any error drops the batch, which removes the files staged so far.
pub async fn read_submission(
    multipart: &mut Multipart,
    storage: &LocalStorage,
) -> Result<ReportSubmission> {
    let mut media = storage.begin_batch();
    let mut form = ReportForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        let kind = if IMAGE_FIELD_NAMES.contains(&field_name.as_str()) {
            Some(MediaKind::Image)
        } else if field_name == VOICE_NOTE_FIELD_NAME {
            Some(MediaKind::Audio)
        } else {
            None
        };

        match kind {
            // Browsers send an unnamed empty part when no file was picked
            Some(_) if matches!(field.file_name(), None | Some("")) => {
                debug!("Skipping empty file part: {}", field_name);
            }
            Some(kind) => stage_file(&mut media, kind, field).await?,
            None => {
                let text = field.text().await.map_err(multipart_error)?;
                form.set(&field_name, text);
            }
        }
    }

    let report = form.into_report()?;
    Ok(ReportSubmission { report, media })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> ReportForm {
        let mut form = ReportForm::default();
        for (name, value) in [
            ("category", "pothole"),
            ("name", "Asha"),
            ("phone", "9876543210"),
            ("location", " MG Road "),
            ("description", "Deep hole"),
        ] {
            form.set(name, value.to_string());
        }
        form
    }

    #[test]
    fn test_complete_form_is_trimmed() {
        let report = complete_form().into_report().unwrap();
        assert_eq!(report.location, "MG Road");
        assert_eq!(report.latitude, None);
        assert_eq!(report.map_url, None);
    }

    #[test]
    fn test_every_missing_field_is_listed() {
        let mut form = ReportForm::default();
        form.set("category", "litter".to_string());
        form.set("name", "   ".to_string());

        match form.into_report() {
            Err(AppError::Validation(messages)) => {
                assert_eq!(messages.len(), 4);
                assert!(messages.contains(&"name is required".to_string()));
                assert!(messages.contains(&"description is required".to_string()));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_coordinates_are_range_checked() {
        let mut form = complete_form();
        form.set("latitude", "12.9716".to_string());
        form.set("longitude", "77.5946".to_string());
        let report = form.into_report().unwrap();
        assert_eq!(report.latitude, Some(12.9716));
        assert_eq!(report.longitude, Some(77.5946));

        let mut form = complete_form();
        form.set("latitude", "91".to_string());
        form.set("longitude", "east".to_string());
        match form.into_report() {
            Err(AppError::Validation(messages)) => assert_eq!(messages.len(), 2),
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_blank_optional_fields_are_absent() {
        let mut form = complete_form();
        form.set("latitude", "".to_string());
        form.set("map_url", "  ".to_string());
        form.set("details", "".to_string());
        let report = form.into_report().unwrap();
        assert_eq!(report.latitude, None);
        assert_eq!(report.map_url, None);
        assert_eq!(report.details, None);
    }
}
