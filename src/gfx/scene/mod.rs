//! # Scene Module
//!
//! The single shared object of the demo: a textured model, its vertex
//! formats, and the [`Transform`] every viewport renders it with.

pub mod model;
pub mod transform;
pub mod vertex;

pub use model::{load_mesh_data, DrawModel, Mesh, MeshData, Model};
pub use transform::Transform;
pub use vertex::{GizmoVertex, Vertex3D};
