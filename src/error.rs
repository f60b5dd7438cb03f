//! Error taxonomy for the viewer engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the document, cache, and navigation layers.
///
/// Document-level failures ([`ViewerError::DocumentOpen`]) abort opening a
/// session. Per-page failures are local: they reject the requested operation
/// and leave the cache and navigation state for every other page intact.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("could not open document {}: {detail}", .path.display())]
    DocumentOpen { path: PathBuf, detail: String },

    #[error("page {index} out of range, document has {page_count} pages")]
    IndexOutOfRange { index: usize, page_count: usize },

    #[error("could not rasterize page {index}: {detail}")]
    Rasterization { index: usize, detail: String },

    #[error("document is closed")]
    UseAfterClose,

    #[error("invalid scale factors {scale_x}x{scale_y}, must be finite and positive")]
    InvalidTransform { scale_x: f32, scale_y: f32 },

    #[error("invalid page entry {entry:?}, expected a number between 1 and {page_count}")]
    InvalidPageEntry { entry: String, page_count: usize },
}

impl ViewerError {
    pub fn rasterization(index: usize, detail: impl ToString) -> Self {
        Self::Rasterization {
            index,
            detail: detail.to_string(),
        }
    }

    /// Whether the error is local to one page rather than fatal to the session.
    #[must_use]
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. }
                | Self::Rasterization { .. }
                | Self::InvalidPageEntry { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_local_errors_leave_the_session_running() {
        assert!(
            ViewerError::IndexOutOfRange {
                index: 9,
                page_count: 3
            }
            .is_page_local()
        );
        assert!(ViewerError::rasterization(0, "decode fault").is_page_local());
        assert!(
            ViewerError::InvalidPageEntry {
                entry: "abc".to_string(),
                page_count: 3
            }
            .is_page_local()
        );

        assert!(!ViewerError::UseAfterClose.is_page_local());
        assert!(
            !ViewerError::DocumentOpen {
                path: "missing.pdf".into(),
                detail: "no such file".to_string()
            }
            .is_page_local()
        );
        assert!(
            !ViewerError::InvalidTransform {
                scale_x: 0.0,
                scale_y: 1.0
            }
            .is_page_local()
        );
    }
}
