//! Mesh asset loaders for the formats Bevy doesn't ship: STL and OBJ.
//!
//! glTF goes through Bevy's own loader; these two decode into an un-indexed
//! triangle list so every face keeps its flat normal.

mod obj;
mod stl;

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext};
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;

use crate::error::MeshParseError;

pub use obj::parse_obj;
pub use stl::parse_stl;

/// Decoded triangles before they become a Bevy `Mesh`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TriangleSoup {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Option<Vec<[f32; 2]>>,
}

impl TriangleSoup {
    fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 3),
            normals: Vec::with_capacity(triangles * 3),
            uvs: None,
        }
    }

    /// Appends one triangle. A missing or zero-length normal is replaced by
    /// the face normal from the counter-clockwise winding.
    fn push_triangle(&mut self, [a, b, c]: [Vec3; 3], normal: Option<Vec3>) {
        let normal = normal
            .filter(|n| n.length_squared() > f32::EPSILON)
            .map(Vec3::normalize)
            .unwrap_or_else(|| (b - a).cross(c - a).normalize_or_zero());
        for corner in [a, b, c] {
            self.positions.push(corner.to_array());
            self.normals.push(normal.to_array());
        }
    }

    fn push_uvs(&mut self, uvs: [Vec2; 3]) {
        self.uvs
            .get_or_insert_with(Vec::new)
            .extend(uvs.map(|uv| uv.to_array()));
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn non_empty(self) -> Result<Self, MeshParseError> {
        if self.positions.is_empty() {
            Err(MeshParseError::Empty)
        } else {
            Ok(self)
        }
    }

    pub fn into_mesh(self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);
        if let Some(uvs) = self.uvs {
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        }
        mesh
    }
}

#[derive(Default)]
pub struct StlLoader;

impl AssetLoader for StlLoader {
    type Asset = Mesh;
    type Settings = ();
    type Error = MeshParseError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Mesh, MeshParseError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        Ok(parse_stl(&bytes)?.into_mesh())
    }

    fn extensions(&self) -> &[&str] {
        &["stl"]
    }
}

#[derive(Default)]
pub struct ObjLoader;

impl AssetLoader for ObjLoader {
    type Asset = Mesh;
    type Settings = ();
    type Error = MeshParseError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Mesh, MeshParseError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(parse_obj(&text)?.into_mesh())
    }

    fn extensions(&self) -> &[&str] {
        &["obj"]
    }
}

pub fn mesh_loader_plugin(app: &mut App) {
    app.init_asset_loader::<StlLoader>()
        .init_asset_loader::<ObjLoader>();
}
