//! Opaque handle plumbing shared by every exported function.

use plyhandle_data::PlyReader;
use std::ffi::{CStr, c_char};
use std::fs::File;
use std::io::BufReader;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

pub(crate) type FileReader = PlyReader<BufReader<File>>;

/// Reader state owned by a C handle. Hosts only ever see pointers to it.
#[allow(clippy::upper_case_acronyms)]
pub struct PLYReaderWrapper {
    pub(crate) reader: FileReader,
}

/// Run `f`, turning a panic into `default` so no unwind crosses the C boundary.
pub(crate) fn guard<T>(default: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error!("Panic caught at the C boundary");
            default
        }
    }
}

/// Null-check `handle` and run `f` on its reader, or return `default`.
///
/// # Safety
///
/// `handle` must be null or a live pointer returned by `ply_reader_create`
/// that no other thread is using.
pub(crate) unsafe fn with_reader<T>(
    handle: *mut PLYReaderWrapper,
    default: T,
    f: impl FnOnce(&mut FileReader) -> T,
) -> T {
    // SAFETY: non-null handles are live and exclusively ours per the contract above.
    let Some(handle) = (unsafe { handle.as_mut() }) else {
        return default;
    };
    guard(default, || f(&mut handle.reader))
}

/// Borrow a C string argument. Null or non-UTF-8 input yields `None`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for `'a`.
pub(crate) unsafe fn cstr_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the contract above.
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// View `len` caller-owned elements at `ptr`. Null yields `None`.
///
/// # Safety
///
/// `ptr` must be null or valid for reads of `len` properly aligned elements.
pub(crate) unsafe fn in_slice<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: see above.
    Some(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Mutable counterpart of [`in_slice`].
///
/// # Safety
///
/// `ptr` must be null or valid for writes of `len` properly aligned elements
/// that nothing else aliases for `'a`.
pub(crate) unsafe fn out_slice<'a, T>(ptr: *mut T, len: usize) -> Option<&'a mut [T]> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: see above.
    Some(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}
