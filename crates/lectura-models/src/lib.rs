//! Shared data models for the Lectura backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their lifecycle states
//! - Scene media items
//! - Render attempt diagnostics
//! - HTTP request/response schemas

pub mod api;
pub mod job;
pub mod media;
pub mod render;

// Re-export common types
pub use api::{CreateLectureRequest, CreateLectureResponse, JobStatusResponse};
pub use job::{Job, JobId, JobStatus, JobUpdate};
pub use media::{MediaItem, MediaKind};
pub use render::{AttemptOutcome, RenderAttempt};
