//! Print the layout of a PLY file and the mesh it describes.
//!
//! Usage:
//!   cargo run -p plyhandle-data --example mesh_info -- <path_to_ply>

use plyhandle_data::{PlyReader, load_mesh};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let ply_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("Please provide a PLY file path")?;

    let reader = PlyReader::open(&ply_path)?;
    let header = reader.header();
    println!("{:?} {}", header.file_type, header.version);
    for comment in &header.comments {
        println!("comment {}", comment);
    }
    for element in &header.elements {
        println!("element {} ({} rows)", element.name, element.count);
        for property in &element.properties {
            match property.count_type {
                Some(count_type) => println!(
                    "  list {:?} {:?} {}",
                    count_type, property.value_type, property.name
                ),
                None => println!("  {:?} {}", property.value_type, property.name),
            }
        }
    }

    let mesh = load_mesh(&ply_path)?;
    info!(
        "{} vertices, {} triangles, normals: {}, texcoords: {}",
        mesh.positions.len(),
        mesh.triangle_count(),
        !mesh.normals.is_empty(),
        !mesh.texcoords.is_empty()
    );

    Ok(())
}
