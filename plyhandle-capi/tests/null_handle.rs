use plyhandle_capi::*;
use std::ffi::CString;
use std::ptr;

#[test]
fn test_null_handle_defaults() {
    let null: PLYReaderRef = ptr::null_mut();
    let name = CString::new("vertex").unwrap();
    let mut idxs = [7u32; 3];
    let mut dest = [0u8; 16];
    let positions = [0f32; 9];

    unsafe {
        ply_reader_destroy(null);
        ply_reader_next_element(null);

        assert!(!ply_reader_valid(null));
        assert!(!ply_reader_has_element(null));
        assert!(!ply_reader_load_element(null));
        assert!(!ply_reader_element_is(null, name.as_ptr()));
        assert_eq!(ply_reader_num_rows(null), 0);
        assert_eq!(ply_reader_num_elements(null), 0);
        assert_eq!(ply_reader_file_type(null), -1);

        assert!(!ply_reader_find_pos(null, idxs.as_mut_ptr()));
        assert!(!ply_reader_find_texcoord(null, idxs.as_mut_ptr()));
        assert!(!ply_reader_find_indices(null, idxs.as_mut_ptr()));
        assert!(!ply_reader_find_normals(null, idxs.as_mut_ptr()));
        assert!(!ply_reader_find_color(null, idxs.as_mut_ptr()));

        assert!(!ply_reader_extract_properties(null, idxs.as_ptr(), 3, 6, dest.as_mut_ptr().cast()));
        assert_eq!(ply_reader_sum_of_list_counts(null, 0), 0);
        assert!(!ply_reader_extract_list_property(null, 0, 5, dest.as_mut_ptr().cast()));
        assert!(!ply_reader_requires_triangulation(null, 0));
        assert_eq!(ply_reader_num_triangles(null, 0), 0);
        assert!(!ply_reader_extract_triangles(
            null,
            0,
            positions.as_ptr(),
            3,
            5,
            dest.as_mut_ptr().cast()
        ));
    }

    // Nothing was written through the output pointers.
    assert_eq!(idxs, [7; 3]);
    assert_eq!(dest, [0; 16]);
}

#[test]
fn test_null_handle_with_null_arguments() {
    let null: PLYReaderRef = ptr::null_mut();
    unsafe {
        assert!(!ply_reader_element_is(null, ptr::null()));
        assert!(!ply_reader_find_pos(null, ptr::null_mut()));
        assert!(!ply_reader_extract_properties(null, ptr::null(), 0, 0, ptr::null_mut()));
        assert!(!ply_reader_extract_list_property(null, 0, 0, ptr::null_mut()));
        assert!(!ply_reader_extract_triangles(null, 0, ptr::null(), 0, 0, ptr::null_mut()));
    }
}
