/// Status given to every newly submitted report
pub const DEFAULT_REPORT_STATUS: &str = "Pending";

/// URL prefix under which uploaded media is served, also the first segment of stored paths
pub const UPLOADS_URL_PREFIX: &str = "uploads";

/// Multipart field carrying report images (the client may send either spelling)
pub const IMAGE_FIELD_NAMES: &[&str] = &["reportImages", "reportImages[]"];

/// Multipart field carrying the recorded voice note
pub const VOICE_NOTE_FIELD_NAME: &str = "voice_note";
