//! Exported C functions. Each one null-checks its arguments and forwards to
//! the reader behind the handle.

use crate::handle::{FileReader, PLYReaderWrapper, cstr_arg, guard, in_slice, out_slice, with_reader};
use crate::logging::LoggingConfig;
use plyhandle_data::{FileType, PlyReader, PropertyType};
use std::ffi::{c_char, c_int, c_void};
use std::ptr;
use tracing::{debug, info};

/// Opaque reader reference handed to C.
#[allow(clippy::upper_case_acronyms)]
pub type PLYReaderRef = *mut PLYReaderWrapper;

/// Open `filename` and parse its header. Returns null on any failure.
///
/// # Safety
///
/// `filename` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_create(filename: *const c_char) -> PLYReaderRef {
    // SAFETY: forwarded from the caller.
    let Some(path) = (unsafe { cstr_arg(filename) }) else {
        debug!("ply_reader_create: null or non-UTF-8 path");
        return ptr::null_mut();
    };

    guard(ptr::null_mut(), || match PlyReader::open(path) {
        Ok(reader) => Box::into_raw(Box::new(PLYReaderWrapper { reader })),
        Err(err) => {
            debug!("ply_reader_create({}): {}", path, err);
            ptr::null_mut()
        }
    })
}

/// Release a handle. Null is ignored.
///
/// # Safety
///
/// `reader` must be null or a handle from [`ply_reader_create`] that has not
/// been destroyed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_destroy(reader: PLYReaderRef) {
    if reader.is_null() {
        return;
    }
    // SAFETY: the handle came from Box::into_raw and is released exactly once.
    let wrapper = unsafe { Box::from_raw(reader) };
    guard((), move || drop(wrapper));
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_valid(reader: PLYReaderRef) -> bool {
    unsafe { with_reader(reader, false, |r| r.valid()) }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_has_element(reader: PLYReaderRef) -> bool {
    unsafe { with_reader(reader, false, |r| r.has_element()) }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_load_element(reader: PLYReaderRef) -> bool {
    unsafe { with_reader(reader, false, |r| r.load_element()) }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_next_element(reader: PLYReaderRef) {
    unsafe { with_reader(reader, (), |r| r.next_element()) }
}

/// # Safety
///
/// `reader` must be null or a live handle; `name` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_element_is(reader: PLYReaderRef, name: *const c_char) -> bool {
    unsafe {
        with_reader(reader, false, |r| {
            cstr_arg(name).is_some_and(|name| r.element_is(name))
        })
    }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_num_rows(reader: PLYReaderRef) -> u32 {
    unsafe { with_reader(reader, 0, |r| r.num_rows()) }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_num_elements(reader: PLYReaderRef) -> u32 {
    unsafe { with_reader(reader, 0, |r| r.num_elements()) }
}

/// 0 for ASCII, 1 for binary little endian, 2 for binary big endian, -1 for a null handle.
///
/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_file_type(reader: PLYReaderRef) -> c_int {
    unsafe {
        with_reader(reader, -1, |r| match r.file_type() {
            FileType::Ascii => 0,
            FileType::Binary => 1,
            FileType::BinaryBigEndian => 2,
        })
    }
}

/// Shared body of the `find_*` lookups writing `N` indices.
unsafe fn find_props<const N: usize>(
    reader: PLYReaderRef,
    prop_idxs: *mut u32,
    find: impl FnOnce(&FileReader, &mut [u32]) -> bool,
) -> bool {
    unsafe {
        with_reader(reader, false, |r| match out_slice(prop_idxs, N) {
            Some(idxs) => find(r, idxs),
            None => false,
        })
    }
}

/// Look up `x y z`, writing 3 indices.
///
/// # Safety
///
/// `reader` must be null or a live handle; `prop_idxs` must be null or
/// writable for 3 `uint32_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_find_pos(reader: PLYReaderRef, prop_idxs: *mut u32) -> bool {
    unsafe { find_props::<3>(reader, prop_idxs, |r, idxs| r.find_pos(idxs)) }
}

/// Look up a texture coordinate pair, writing 2 indices.
///
/// # Safety
///
/// `reader` must be null or a live handle; `prop_idxs` must be null or
/// writable for 2 `uint32_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_find_texcoord(reader: PLYReaderRef, prop_idxs: *mut u32) -> bool {
    unsafe { find_props::<2>(reader, prop_idxs, |r, idxs| r.find_texcoord(idxs)) }
}

/// Look up the face index list, writing 1 index.
///
/// # Safety
///
/// `reader` must be null or a live handle; `prop_idxs` must be null or
/// writable for 1 `uint32_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_find_indices(reader: PLYReaderRef, prop_idxs: *mut u32) -> bool {
    unsafe { find_props::<1>(reader, prop_idxs, |r, idxs| r.find_indices(idxs)) }
}

/// Look up `nx ny nz`, writing 3 indices.
///
/// # Safety
///
/// `reader` must be null or a live handle; `prop_idxs` must be null or
/// writable for 3 `uint32_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_find_normals(reader: PLYReaderRef, prop_idxs: *mut u32) -> bool {
    unsafe { find_props::<3>(reader, prop_idxs, |r, idxs| r.find_normal(idxs)) }
}

/// Look up `red green blue`, writing 3 indices.
///
/// # Safety
///
/// `reader` must be null or a live handle; `prop_idxs` must be null or
/// writable for 3 `uint32_t`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_find_color(reader: PLYReaderRef, prop_idxs: *mut u32) -> bool {
    unsafe { find_props::<3>(reader, prop_idxs, |r, idxs| r.find_color(idxs)) }
}

/// Copy `num_props` scalar properties of every row of the loaded element into
/// `dest`, converted to `dest_type`.
///
/// # Safety
///
/// `reader` must be null or a live handle. `prop_idxs` must be null or
/// readable for `num_props` entries. `dest` must be null or writable for
/// `num_rows * num_props` values of `dest_type`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_extract_properties(
    reader: PLYReaderRef,
    prop_idxs: *const u32,
    num_props: u32,
    dest_type: c_int,
    dest: *mut c_void,
) -> bool {
    unsafe {
        with_reader(reader, false, |r| {
            let Some(idxs) = in_slice(prop_idxs, num_props as usize) else {
                return false;
            };
            let dest_type = PropertyType::from_raw(dest_type);
            let len = r.properties_byte_len(idxs.len(), dest_type);
            match out_slice(dest.cast::<u8>(), len) {
                Some(dest) => r.extract_properties(idxs, dest_type, dest),
                None => false,
            }
        })
    }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_sum_of_list_counts(reader: PLYReaderRef, prop_idx: u32) -> u32 {
    unsafe { with_reader(reader, 0, |r| r.sum_of_list_counts(prop_idx)) }
}

/// Copy every item of a list property into `dest`, converted to `dest_type`.
///
/// # Safety
///
/// `reader` must be null or a live handle. `dest` must be null or writable
/// for `sum_of_list_counts` values of `dest_type`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_extract_list_property(
    reader: PLYReaderRef,
    prop_idx: u32,
    dest_type: c_int,
    dest: *mut c_void,
) -> bool {
    unsafe {
        with_reader(reader, false, |r| {
            let dest_type = PropertyType::from_raw(dest_type);
            let len = r.list_byte_len(prop_idx, dest_type);
            match out_slice(dest.cast::<u8>(), len) {
                Some(dest) => r.extract_list_property(prop_idx, dest_type, dest),
                None => false,
            }
        })
    }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_requires_triangulation(reader: PLYReaderRef, prop_idx: u32) -> bool {
    unsafe { with_reader(reader, false, |r| r.requires_triangulation(prop_idx)) }
}

/// # Safety
///
/// `reader` must be null or a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_num_triangles(reader: PLYReaderRef, prop_idx: u32) -> u32 {
    unsafe { with_reader(reader, 0, |r| r.num_triangles(prop_idx)) }
}

/// Write three vertex indices per triangle of a face list property.
///
/// `pos` is only read when some face needs triangulation and may be null
/// otherwise.
///
/// # Safety
///
/// `reader` must be null or a live handle. `pos` must be null or readable
/// for `num_verts * 3` floats. `dest` must be null or writable for
/// `num_triangles * 3` values of `dest_type`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_reader_extract_triangles(
    reader: PLYReaderRef,
    prop_idx: u32,
    pos: *const f32,
    num_verts: u32,
    dest_type: c_int,
    dest: *mut c_void,
) -> bool {
    unsafe {
        with_reader(reader, false, |r| {
            let positions = in_slice(pos, num_verts as usize * 3).unwrap_or(&[]);
            let dest_type = PropertyType::from_raw(dest_type);
            let len = r.triangles_byte_len(prop_idx, dest_type);
            match out_slice(dest.cast::<u8>(), len) {
                Some(dest) => r.extract_triangles(prop_idx, positions, num_verts, dest_type, dest),
                None => false,
            }
        })
    }
}

/// Install a stderr log subscriber. `RUST_LOG` overrides `level`; a null
/// `level` means `"info"`. Returns false if a subscriber was already set.
///
/// # Safety
///
/// `level` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ply_logging_init(level: *const c_char) -> bool {
    // SAFETY: forwarded from the caller.
    let config = match unsafe { cstr_arg(level) } {
        Some(level) => LoggingConfig::with_level(level),
        None => LoggingConfig::default(),
    };
    guard(false, || {
        let installed = config.try_init();
        if installed {
            info!("plyhandle logging enabled at '{}'", config.level);
        }
        installed
    })
}
