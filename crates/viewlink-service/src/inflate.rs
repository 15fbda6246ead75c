//! Layout inflation capability.

use crate::View;
use thiserror::Error;
use viewlink_proto::LayoutId;

/// Inflation errors
#[derive(Debug, Error)]
pub enum InflateError {
    #[error("unknown layout {0}")]
    UnknownLayout(LayoutId),

    #[error("inflating {0} failed: {1}")]
    Failed(LayoutId, String),
}

/// Produces a view tree from a layout identifier.
///
/// A failed inflation leaves the session's content container empty; the
/// embedding simply shows nothing.
pub trait LayoutInflater: Send + Sync {
    fn inflate(&self, layout_id: LayoutId) -> Result<Box<dyn View>, InflateError>;
}

impl<F> LayoutInflater for F
where
    F: Fn(LayoutId) -> Result<Box<dyn View>, InflateError> + Send + Sync,
{
    fn inflate(&self, layout_id: LayoutId) -> Result<Box<dyn View>, InflateError> {
        self(layout_id)
    }
}
