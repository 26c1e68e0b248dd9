//! PLY file reading: header model, scalar types and the element cursor.

mod header;
mod property;
mod reader;

pub use header::{FileType, INVALID_INDEX, PlyElement, PlyHeader, PlyProperty};
pub use property::{PlyScalar, PropertyType};
pub use reader::PlyReader;
