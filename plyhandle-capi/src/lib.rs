//! C ABI over [`plyhandle_data::PlyReader`].
//!
//! A host creates a reader with `ply_reader_create`, drives it through the
//! `ply_reader_*` functions and releases it with `ply_reader_destroy`. Every
//! function accepts a null handle and answers with false, 0 or nothing.
//! Open failures come back as a null handle; no error details or panics cross
//! the boundary. The matching declarations live in `include/PLYReaderWrapper.h`.

mod ffi;
mod handle;
pub mod logging;

pub use ffi::*;
pub use handle::PLYReaderWrapper;
pub use logging::LoggingConfig;
