/**
 * This module contains all logic for loading meshes and textures from files.
 */
pub mod mesh;
pub mod texture;

pub use mesh::{Mesh, MeshData, SubMesh, load_mesh, load_mesh_data};
pub use texture::{Texture, load_texture};
