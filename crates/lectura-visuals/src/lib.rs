//! Keyword-based stock media search for scene visuals.
//!
//! Visuals are an enhancement, not a requirement: every failure mode in
//! this crate degrades to "no media" rather than surfacing an error to the
//! pipeline.

mod search;

pub use search::{StockMediaClient, VisualSearch, VisualsError, VisualsResult};
