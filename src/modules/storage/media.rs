//! Media type allow-lists for report uploads

use crate::core::error::AppError;

/// Kind of media attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

/// Allowed extensions and the MIME types accepted for each
const IMAGE_TYPES: &[(&str, &[&str])] = &[
    ("jpg", &["image/jpeg"]),
    ("jpeg", &["image/jpeg"]),
    ("png", &["image/png"]),
    ("gif", &["image/gif"]),
    ("webp", &["image/webp"]),
];

const AUDIO_TYPES: &[(&str, &[&str])] = &[
    // MediaRecorder blobs are sometimes labelled video/webm
    ("webm", &["audio/webm", "video/webm"]),
    ("ogg", &["audio/ogg"]),
    ("oga", &["audio/ogg"]),
    ("mp3", &["audio/mpeg"]),
    ("wav", &["audio/wav", "audio/x-wav", "audio/wave"]),
    ("m4a", &["audio/mp4", "audio/x-m4a"]),
];

impl MediaKind {
    /// Sub-directory of the upload root holding this kind of media
    pub fn dir_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Audio => "audio",
        }
    }

    fn allowed(&self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            MediaKind::Image => IMAGE_TYPES,
            MediaKind::Audio => AUDIO_TYPES,
        }
    }

    /// Comma separated list of accepted extensions, for error messages
    pub fn allowed_extensions(&self) -> String {
        self.allowed()
            .iter()
            .map(|(ext, _)| *ext)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validates a part's file name and content type against the allow-list.
    ///
    /// Both must be allowed and agree with each other. Returns the normalized
    /// extension used for the stored file name.
    pub fn accept(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<&'static str, AppError> {
        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let mime = content_type
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
            .unwrap_or_default();

        let (ext, mimes) = self
            .allowed()
            .iter()
            .find(|(ext, _)| *ext == extension)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "File extension '{}' is not allowed for {}. Allowed: {}",
                    extension,
                    self.dir_name(),
                    self.allowed_extensions()
                ))
            })?;

        if !mimes.contains(&mime.as_str()) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed for .{} files",
                mime, ext
            )));
        }

        Ok(*ext)
    }
}
