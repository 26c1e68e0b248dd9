//! Error types for PLY reading and mesh loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening a PLY file or decoding its payload.
#[derive(Debug, Error)]
pub enum PlyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing 'ply' magic line")]
    MissingMagic,

    #[error("header ended without 'end_header'")]
    MissingEndHeader,

    #[error("invalid PLY header: {0}")]
    InvalidHeader(#[source] std::io::Error),

    #[error("failed to decode element '{element}': {source}")]
    Payload {
        element: String,
        #[source]
        source: std::io::Error,
    },

    #[error("element '{element}' has a row without property '{property}'")]
    MissingValue { element: String, property: String },

    #[error("list count {count} of '{element}.{property}' does not fit its count type")]
    ListCountOutOfRange {
        element: String,
        property: String,
        count: usize,
    },
}

/// Errors raised by [`crate::load_mesh`].
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("cannot open PLY file at {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: PlyError,
    },

    #[error("vertex element missing")]
    VertexDataMissing,

    #[error("face element missing")]
    FaceDataMissing,

    #[error("need vertex positions to triangulate faces")]
    TriangulationNeedsVerts,

    #[error("corrupted or unsupported PLY file")]
    Corrupted,
}
