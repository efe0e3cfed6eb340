//! HTTP handlers.

pub mod health;
pub mod jobs;
pub mod lectures;

pub use health::{health, ready};
