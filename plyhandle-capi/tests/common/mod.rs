#![allow(dead_code)]

use std::ffi::CString;
use std::io::Write;
use tempfile::NamedTempFile;

/// A PLY file on disk plus its path as a C string.
pub struct Fixture {
    pub file: NamedTempFile,
    pub path: CString,
}

pub fn write_fixture(bytes: &[u8]) -> Fixture {
    let mut file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    let path = CString::new(file.path().to_str().unwrap()).unwrap();
    Fixture { file, path }
}

/// Binary little-endian mesh with float positions and a `uchar`/`uint` face list.
pub fn binary_le_mesh(positions: &[[f32; 3]], faces: &[&[u32]]) -> Vec<u8> {
    let mut bytes = format!(
        "ply\nformat binary_little_endian 1.0\ncomment generated\nelement vertex {}\n\
         property float x\nproperty float y\nproperty float z\nelement face {}\n\
         property list uchar uint vertex_indices\nend_header\n",
        positions.len(),
        faces.len()
    )
    .into_bytes();

    for p in positions {
        for v in p {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    for face in faces {
        bytes.push(face.len() as u8);
        for i in face.iter() {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
    }
    bytes
}

/// Deterministic, non-trivial vertex positions.
pub fn sample_positions(n: usize) -> Vec<[f32; 3]> {
    (0..n)
        .map(|i| {
            let f = i as f32;
            [f * 0.5, -f, f * f * 0.25 + 0.125]
        })
        .collect()
}

/// Vertex(3)/face(2) file in ASCII.
pub const TWO_ELEMENTS: &str = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 2
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
3 2 1 0
";
