use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Non-finite coordinates, degenerate polygons or non-positive radii.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl GeometryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GeometryError::InvalidGeometry(msg.into())
    }
}
