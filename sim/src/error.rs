//! Error types for the physics core.

use bevy_ecs::entity::Entity;
use thiserror::Error;

/// Errors produced while validating a vertex set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    /// The polygon has (near) zero area.
    #[error("polygon has zero area")]
    Degenerate,
    /// The vertex winding changes direction.
    #[error("polygon is not convex")]
    NonConvex,
}

/// Errors surfaced by the engine API.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown body {0:?}")]
    UnknownBody(Entity),

    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("state encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// The state was written by an incompatible format version.
    #[error("unsupported state format version {0}")]
    UnsupportedFormat(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_geometry_error_converts_and_chains() {
        let error: EngineError = GeometryError::NonConvex.into();
        assert!(matches!(error, EngineError::Geometry(GeometryError::NonConvex)));
        assert_eq!(error.to_string(), "invalid geometry: polygon is not convex");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_json_error_converts() {
        let json_error = serde_json::from_str::<u32>("not json").unwrap_err();
        let error = EngineError::from(json_error);
        assert!(matches!(error, EngineError::Json(_)));
        assert!(error.to_string().starts_with("state encoding error"));
    }

    #[test]
    fn test_leaf_errors_have_no_source() {
        let error = EngineError::UnsupportedFormat(9);
        assert_eq!(error.to_string(), "unsupported state format version 9");
        assert!(error.source().is_none());
        assert_eq!(
            GeometryError::TooFewVertices(2).to_string(),
            "polygon needs at least 3 vertices, got 2"
        );
    }
}
