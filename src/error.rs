//! Error type for caller-addressed scene operations.
//!
//! Interactive paths (binding, bound-element updates, store mutation) heal
//! broken references silently and never return these. Errors are reserved for
//! contracts the caller controls directly, such as binding text to a shape
//! that cannot hold it or reading malformed configuration.

use thiserror::Error;

use crate::element::ElementId;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("element not found: {0}")]
    NotFound(ElementId),

    #[error("element is deleted: {0}")]
    Deleted(ElementId),

    #[error("element is not linear: {0}")]
    NotLinear(ElementId),

    #[error("element cannot contain text: {0}")]
    NotTextContainer(ElementId),

    #[error("element is not text: {0}")]
    NotText(ElementId),

    #[error("element is not a frame: {0}")]
    NotFrame(ElementId),

    #[error("point index {index} out of range for {id} ({len} points)")]
    PointIndexOutOfRange { id: ElementId, index: usize, len: usize },

    #[error("scene is in view mode")]
    ViewMode,

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
