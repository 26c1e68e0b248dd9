//! Triangle mesh loading on top of [`PlyReader`].

use crate::error::MeshError;
use crate::ply::PlyReader;
use glam::{Vec2, Vec3};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

/// Indexed triangle mesh read from a PLY file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlyMesh {
    pub positions: Vec<Vec3>,
    /// Unit normals, empty when the file has none.
    pub normals: Vec<Vec3>,
    pub texcoords: Vec<Vec2>,
    /// Three vertex indices per triangle.
    pub indices: Vec<u32>,
}

impl PlyMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Positions flattened to xyz triples.
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }
}

/// Load a triangle mesh from a PLY file with `vertex` and `face` elements.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<PlyMesh, MeshError> {
    let path = path.as_ref();
    info!("Loading PLY mesh");

    let reader = PlyReader::open(path).map_err(|source| MeshError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = load_mesh_from_reader(reader)?;

    info!(
        "PLY mesh loaded: {} vertices, {} triangles",
        mesh.positions.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load a triangle mesh from an already opened reader.
pub fn load_mesh_from_reader<R: BufRead>(mut reader: PlyReader<R>) -> Result<PlyMesh, MeshError> {
    if !reader.valid() {
        return Err(MeshError::Corrupted);
    }

    let mut mesh = PlyMesh::default();
    let mut prop_idxs = [0u32; 3];
    let mut got_verts = false;
    let mut got_faces = false;

    while reader.has_element() {
        if reader.element_is("vertex") && reader.load_element() && reader.find_pos(&mut prop_idxs) {
            let n = reader.num_rows() as usize;

            let mut raw = vec![0f32; n * 3];
            if !reader.extract_properties_into(&prop_idxs, &mut raw) {
                return Err(MeshError::Corrupted);
            }
            mesh.positions = raw.chunks_exact(3).map(Vec3::from_slice).collect();

            if reader.find_normal(&mut prop_idxs) && reader.extract_properties_into(&prop_idxs, &mut raw) {
                mesh.normals = raw
                    .chunks_exact(3)
                    .map(|n| Vec3::from_slice(n).normalize_or_zero())
                    .collect();
            }

            let mut uv_idxs = [0u32; 2];
            if reader.find_texcoord(&mut uv_idxs) {
                let mut uv = vec![0f32; n * 2];
                if reader.extract_properties_into(&uv_idxs, &mut uv) {
                    mesh.texcoords = uv.chunks_exact(2).map(Vec2::from_slice).collect();
                }
            }

            debug!(
                "Vertex element: {} positions, {} normals, {} texcoords",
                mesh.positions.len(),
                mesh.normals.len(),
                mesh.texcoords.len()
            );
            got_verts = true;
        } else if reader.element_is("face") && reader.load_element() && reader.find_indices(&mut prop_idxs) {
            let idx = prop_idxs[0];

            if reader.requires_triangulation(idx) {
                if !got_verts {
                    return Err(MeshError::TriangulationNeedsVerts);
                }
                let positions = mesh.flat_positions();
                let mut triangles = vec![0u32; reader.num_triangles(idx) as usize * 3];
                if !reader.extract_triangles_into(idx, &positions, mesh.positions.len() as u32, &mut triangles) {
                    return Err(MeshError::Corrupted);
                }
                mesh.indices = triangles;
            } else {
                let mut indices = vec![0u32; reader.sum_of_list_counts(idx) as usize];
                if !reader.extract_list_property_into(idx, &mut indices) {
                    return Err(MeshError::Corrupted);
                }
                mesh.indices = indices;
            }

            debug!("Face element: {} triangles", mesh.triangle_count());
            got_faces = true;
        }

        reader.next_element();
    }

    if !reader.valid() {
        return Err(MeshError::Corrupted);
    }
    if !got_verts {
        return Err(MeshError::VertexDataMissing);
    }
    if !got_faces {
        return Err(MeshError::FaceDataMissing);
    }

    Ok(mesh)
}
