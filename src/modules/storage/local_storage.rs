//! Local disk storage for report media
//!
//! Uploaded bytes are first written to `<root>/.staging/` and only moved to
//! `<root>/images/` or `<root>/audio/` once the owning report row has been
//! inserted. A [`StagedBatch`] owns the files of one submission: unless it is
//! committed, dropping it removes every file it staged or promoted.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::media::MediaKind;
use crate::shared::constants::UPLOADS_URL_PREFIX;

const STAGING_DIR: &str = ".staging";

/// Local filesystem storage rooted at the configured upload directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    max_images: usize,
    max_image_size: usize,
    max_audio_size: usize,
}

impl LocalStorage {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: config.dir.clone(),
            max_images: config.max_images,
            max_image_size: config.max_image_size,
            max_audio_size: config.max_audio_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding committed media of the given kind
    pub fn media_dir(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// Create the upload directory tree if it does not exist yet
    pub async fn ensure_layout(&self) -> Result<()> {
        for dir in [
            self.media_dir(MediaKind::Image),
            self.media_dir(MediaKind::Audio),
            self.staging_dir(),
        ] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                AppError::Internal(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Remove staged files left behind by an interrupted process.
    ///
    /// Returns the number of files removed.
    pub async fn clear_staging(&self) -> Result<usize> {
        let mut removed = 0;
        let mut entries = match fs::read_dir(self.staging_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            warn!("Removed {} orphaned staged upload(s)", removed);
        }
        Ok(removed)
    }

    /// Start collecting the files of one submission
    pub fn begin_batch(&self) -> StagedBatch {
        StagedBatch {
            storage: self.clone(),
            files: Vec::new(),
            committed: false,
        }
    }

    fn max_size(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Image => self.max_image_size,
            MediaKind::Audio => self.max_audio_size,
        }
    }
}

#[derive(Debug)]
struct StagedFile {
    kind: MediaKind,
    staged_path: PathBuf,
    final_path: PathBuf,
    public_path: String,
    promoted: bool,
}

/// Files of one submission that are on disk but not yet committed
#[derive(Debug)]
pub struct StagedBatch {
    storage: LocalStorage,
    files: Vec<StagedFile>,
    committed: bool,
}

impl StagedBatch {
    fn count(&self, kind: MediaKind) -> usize {
        self.files.iter().filter(|f| f.kind == kind).count()
    }

    /// Reserve a staged file for an incoming part.
    ///
    /// Enforces the per-report count limits before any byte is written.
    pub async fn open(&mut self, kind: MediaKind, extension: &str) -> Result<StagedWriter> {
        match kind {
            MediaKind::Image if self.count(kind) >= self.storage.max_images => {
                return Err(AppError::BadRequest(format!(
                    "Too many images: at most {} allowed",
                    self.storage.max_images
                )));
            }
            MediaKind::Audio if self.count(kind) >= 1 => {
                return Err(AppError::BadRequest(
                    "Only one voice note is allowed".to_string(),
                ));
            }
            _ => {}
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let staged_path = self
            .storage
            .staging_dir()
            .join(format!("{}.part", file_name));
        let final_path = self.storage.media_dir(kind).join(&file_name);
        let public_path = format!("{}/{}/{}", UPLOADS_URL_PREFIX, kind.dir_name(), file_name);

        let file = fs::File::create(&staged_path).await?;
        // Registered before the first write so a failed stream is still cleaned up
        self.files.push(StagedFile {
            kind,
            staged_path: staged_path.clone(),
            final_path,
            public_path,
            promoted: false,
        });

        Ok(StagedWriter {
            file,
            path: staged_path,
            written: 0,
            limit: self.storage.max_size(kind),
        })
    }

    /// Public paths of the staged images, in upload order
    pub fn image_paths(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.kind == MediaKind::Image)
            .map(|f| f.public_path.clone())
            .collect()
    }

    /// Public path of the staged voice note, if any
    pub fn voice_note_path(&self) -> Option<String> {
        self.files
            .iter()
            .find(|f| f.kind == MediaKind::Audio)
            .map(|f| f.public_path.clone())
    }

    /// Move every staged file to its final location
    pub async fn promote(&mut self) -> Result<()> {
        for file in self.files.iter_mut().filter(|f| !f.promoted) {
            fs::rename(&file.staged_path, &file.final_path)
                .await
                .map_err(|e| {
                    AppError::Internal(format!(
                        "Failed to promote {}: {}",
                        file.staged_path.display(),
                        e
                    ))
                })?;
            file.promoted = true;
            debug!("Promoted upload to {}", file.final_path.display());
        }
        Ok(())
    }

    /// Keep the files; the batch no longer removes them on drop
    pub fn commit(mut self) {
        self.committed = true;
        if !self.files.is_empty() {
            info!("Committed {} uploaded file(s)", self.files.len());
        }
    }
}

impl Drop for StagedBatch {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Blocking removal on the current thread: at most a handful of small
        // unlinks, and callers rely on the files being gone once drop returns
        for file in &self.files {
            let path = if file.promoted {
                &file.final_path
            } else {
                &file.staged_path
            };
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Discarded upload {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to discard upload {}: {}", path.display(), e),
            }
        }
    }
}

/// Streaming writer for one staged file, enforcing the size limit
pub struct StagedWriter {
    file: fs::File,
    path: PathBuf,
    written: usize,
    limit: usize,
}

impl StagedWriter {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.written += chunk.len();
        if self.written > self.limit {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                self.limit,
                self.limit / 1024 / 1024
            )));
        }
        self.file.write_all(chunk).await?;
        Ok(())
    }

    /// Flush to disk; returns the number of bytes written
    pub async fn finish(mut self) -> Result<usize> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        debug!("Staged {} bytes at {}", self.written, self.path.display());
        Ok(self.written)
    }
}
