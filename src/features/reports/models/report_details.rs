use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::core::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PotholeSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PotholeDepth {
    Shallow,
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LightIssue {
    /// Light is completely out
    Out,
    Flickering,
    /// Light stays on during the day
    OnDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BinStatus {
    Full,
    Overflowing,
    Damaged,
}

/// Category-specific report details, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportDetails {
    Pothole {
        size: Option<PotholeSize>,
        depth: Option<PotholeDepth>,
    },
    Streetlight {
        issue_type: Option<LightIssue>,
        pole_number: Option<String>,
    },
    Litter {
        bin_status: Option<BinStatus>,
    },
    /// Free key/value pairs for categories without a dedicated shape
    Other { fields: BTreeMap<String, String> },
}

impl ReportDetails {
    /// Build details from the form's `details` JSON object.
    ///
    /// The variant is chosen by category. Form keys follow the client
    /// (`potholeSize`, `lightIssueType`, ...). Returns `None` when nothing
    /// meaningful was submitted.
    pub fn from_form(category: &str, raw: Option<&str>) -> Result<Option<Self>> {
        let raw = match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let mut fields = parse_fields(raw)?;

        let details = match category.trim().to_ascii_lowercase().as_str() {
            "pothole" => ReportDetails::Pothole {
                size: take_enum(&mut fields, "potholeSize")?,
                depth: take_enum(&mut fields, "potholeDepth")?,
            },
            "streetlight" => ReportDetails::Streetlight {
                issue_type: take_enum(&mut fields, "lightIssueType")?,
                pole_number: fields.remove("poleNumber"),
            },
            "litter" => ReportDetails::Litter {
                bin_status: take_enum(&mut fields, "binStatus")?,
            },
            _ => ReportDetails::Other { fields },
        };

        Ok(Some(details).filter(|d| !d.is_empty()))
    }

    fn is_empty(&self) -> bool {
        match self {
            ReportDetails::Pothole { size, depth } => size.is_none() && depth.is_none(),
            ReportDetails::Streetlight {
                issue_type,
                pole_number,
            } => issue_type.is_none() && pole_number.is_none(),
            ReportDetails::Litter { bin_status } => bin_status.is_none(),
            ReportDetails::Other { fields } => fields.is_empty(),
        }
    }
}

/// Flatten the submitted JSON object into trimmed, non-empty string values
fn parse_fields(raw: &str) -> Result<BTreeMap<String, String>> {
    let object: serde_json::Map<String, Value> = serde_json::from_str(raw)
        .map_err(|_| AppError::validation("details must be a JSON object"))?;

    let mut fields = BTreeMap::new();
    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s.trim().to_string(),
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(AppError::validation(format!(
                    "details.{} must be a single value",
                    key
                )));
            }
        };
        if !text.is_empty() {
            fields.insert(key, text);
        }
    }
    Ok(fields)
}

fn take_enum<T: DeserializeOwned>(
    fields: &mut BTreeMap<String, String>,
    key: &str,
) -> Result<Option<T>> {
    match fields.remove(key) {
        None => Ok(None),
        Some(value) => serde_json::from_value(Value::String(value.clone()))
            .map(Some)
            .map_err(|_| AppError::validation(format!("Invalid {} '{}'", key, value))),
    }
}
