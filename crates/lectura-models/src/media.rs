//! Scene media models.

use serde::{Deserialize, Serialize};

/// Kind of media attached to a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// One media item fetched for a scene.
///
/// Media is an enhancement, not a requirement: pipelines tolerate scenes
/// with no media at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Media type
    #[serde(rename = "type")]
    pub kind: MediaKind,

    /// Source URL
    pub url: String,

    /// Keywords that produced this item
    pub keywords: Vec<String>,
}

impl MediaItem {
    pub fn image(url: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
            keywords,
        }
    }
}
