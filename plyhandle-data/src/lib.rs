//! Plyhandle Data Crate
//!
//! Element-cursor reading of PLY files, polygon triangulation and triangle
//! mesh loading. This crate has no FFI surface; `plyhandle-capi` wraps it
//! for C callers.

pub mod error;
pub mod mesh;
pub mod ply;
pub mod triangulation;

pub use error::{MeshError, PlyError};
pub use mesh::{PlyMesh, load_mesh, load_mesh_from_reader};
pub use ply::{FileType, INVALID_INDEX, PlyReader, PlyScalar, PropertyType};
pub use triangulation::{ProjectionPlane, triangulate_polygon};
