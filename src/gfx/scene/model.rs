//! Textured OBJ model
//!
//! Loading is split in two: [`load_mesh_data`] reads the OBJ file into CPU-side
//! [`MeshData`], and [`Model::load`] uploads it next to the decoded texture.

use std::path::{Path, PathBuf};

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;
use crate::error::{QuadviewError, Result};
use crate::gfx::resources::TextureResource;

/// CPU-side mesh, one per OBJ object
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
}

impl MeshData {
    fn from_tobj(model: &tobj::Model) -> Self {
        let mesh = &model.mesh;
        let vertex_count = mesh.positions.len() / 3;

        let normals = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals.clone()
        } else {
            log::debug!("mesh '{}' has no normals, computing from faces", model.name);
            compute_normals(&mesh.positions, &mesh.indices)
        };
        let has_tex_coords = mesh.texcoords.len() / 2 == vertex_count;

        let vertices = (0..vertex_count)
            .map(|i| Vertex3D {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                // OBJ stores v bottom-up
                tex_coords: if has_tex_coords {
                    [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
            })
            .collect();

        Self {
            name: model.name.clone(),
            vertices,
            indices: mesh.indices.clone(),
        }
    }
}

/// Reads every object of an OBJ file as triangulated, single-indexed meshes.
///
/// Materials referenced by the file are ignored; the model is shaded with one
/// texture supplied separately.
pub fn load_mesh_data(path: &Path) -> Result<Vec<MeshData>> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| QuadviewError::ModelLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let meshes: Vec<MeshData> = models
        .iter()
        .map(MeshData::from_tobj)
        .filter(|mesh| !mesh.indices.is_empty())
        .collect();

    if meshes.is_empty() {
        return Err(QuadviewError::EmptyModel {
            path: path.to_path_buf(),
        });
    }
    Ok(meshes)
}

/// Smooth vertex normals from face normals, for OBJ files that have none
pub fn compute_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let position = |i: usize| Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);
    let mut accumulated = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len() / 3];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let face_normal = (position(i1) - position(i0)).cross(position(i2) - position(i0));
        for i in [i0, i1, i2] {
            accumulated[i] += face_normal;
        }
    }

    accumulated
        .into_iter()
        .flat_map(|n| {
            let n = if n.magnitude2() > 0.0 { n.normalize() } else { n };
            [n.x, n.y, n.z]
        })
        .collect()
}

/// Uploaded mesh buffers
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: data.name.clone(),
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

/// Textured model shared by all viewports
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub texture: TextureResource,
    pub source: PathBuf,
}

impl Model {
    /// Loads the OBJ geometry and its albedo texture. Either failing is fatal.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        obj_path: &Path,
        texture_path: &Path,
    ) -> Result<Self> {
        let mesh_data = load_mesh_data(obj_path)?;
        let texture = TextureResource::from_image_file(device, queue, texture_path)?;

        let meshes: Vec<Mesh> = mesh_data.iter().map(|data| Mesh::upload(device, data)).collect();
        log::info!(
            "loaded model '{}' ({} meshes, {} triangles)",
            obj_path.display(),
            meshes.len(),
            meshes.iter().map(|m| m.index_count / 3).sum::<u32>()
        );

        Ok(Self {
            meshes,
            texture,
            source: obj_path.to_path_buf(),
        })
    }

    /// Releases the texture memory; buffers go with the drop
    pub fn unload(self) {
        log::info!("unloading model '{}'", self.source.display());
        self.texture.texture.destroy();
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_model(&mut self, model: &'a Model);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_model(&mut self, model: &'b Model) {
        for mesh in &model.meshes {
            self.draw_mesh(mesh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_normals_for_flat_quad() {
        // Counter-clockwise quad in the XY plane
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let indices = [0, 1, 2, 0, 2, 3];

        let normals = compute_normals(&positions, &indices);
        assert_eq!(normals.len(), positions.len());
        for n in normals.chunks(3) {
            assert!((n[2] - 1.0).abs() < 1e-6);
            assert!(n[0].abs() < 1e-6 && n[1].abs() < 1e-6);
        }
    }

    #[test]
    fn test_unreferenced_vertex_keeps_zero_normal() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 5.0, 5.0];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        assert_eq!(&normals[9..12], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bundled_crate_model_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/models/crate_model.obj");
        let meshes = load_mesh_data(&path).expect("bundled model parses");
        let mesh = &meshes[0];

        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.tex_coords[0]));
            assert!((0.0..=1.0).contains(&v.tex_coords[1]));
            let n = Vector3::from(v.normal);
            assert!((n.magnitude() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_missing_model_is_a_load_error() {
        let err = load_mesh_data(Path::new("does/not/exist.obj")).unwrap_err();
        assert!(matches!(err, QuadviewError::ModelLoad { .. }));
    }
}
