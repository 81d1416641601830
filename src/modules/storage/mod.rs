//! Storage module for report media
//!
//! Provides local disk storage with staged uploads that are only kept once
//! the owning report has been persisted.

mod local_storage;
mod media;

pub use local_storage::{LocalStorage, StagedBatch};
pub use media::MediaKind;
