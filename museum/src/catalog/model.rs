// Catalog data types. ModelRecord lives on exhibit root entities as a component.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;
use bevy::prelude::*;

use crate::error::TransactionError;

/// Mesh formats the loader coordinator knows how to request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    Gltf,
    Stl,
    Obj,
}

impl SourceFormat {
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['#', '?']).next().unwrap_or(url);
        let (_, ext) = path.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "gltf" | "glb" => Some(Self::Gltf),
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }
}

/// Substitute surface applied to every mesh of an exhibit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialOverride {
    pub color: Color,
    pub roughness: f32,
}

impl MaterialOverride {
    pub fn srgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            color: Color::srgb_u8(r, g, b),
            roughness: 0.35,
        }
    }

    pub fn to_material(self) -> StandardMaterial {
        StandardMaterial {
            base_color: self.color,
            perceptual_roughness: self.roughness,
            ..default()
        }
    }
}

/// Display and pricing metadata for a mintable exhibit.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct ModelRecord {
    pub display_name: String,
    /// Decimal price in display units (ETH).
    pub price: String,
    pub available: u32,
    pub ownable: bool,
}

impl ModelRecord {
    pub fn new(display_name: impl Into<String>, price: impl Into<String>, available: u32) -> Self {
        Self {
            display_name: display_name.into(),
            price: price.into(),
            available,
            ownable: false,
        }
    }

    pub fn ownable(mut self) -> Self {
        self.ownable = true;
        self
    }

    pub fn tooltip_text(&self, symbol: &str) -> String {
        format!(
            "{}\nPrice: {} {symbol}\nAvailable: {}\nClick to mint!",
            self.display_name, self.price, self.available
        )
    }

    /// Price in wei. Parsed from the decimal string, never through floats.
    pub fn base_units(&self) -> Result<U256, TransactionError> {
        parse_ether(self.price.trim())
            .map_err(|_| TransactionError::InvalidPrice(self.price.clone()))
    }
}

/// One asset to load and place in the scene.
#[derive(Clone, Debug)]
pub struct ExhibitSpec {
    pub url: String,
    pub position: Vec3,
    pub scale: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub material: Option<MaterialOverride>,
    /// The first primary exhibit to load re-frames the camera.
    pub primary: bool,
    pub record: Option<ModelRecord>,
}

impl ExhibitSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            material: None,
            primary: false,
            record: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotated(mut self, euler: Vec3) -> Self {
        self.rotation = euler;
        self
    }

    pub fn with_material(mut self, material: MaterialOverride) -> Self {
        self.material = Some(material);
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn with_record(mut self, record: ModelRecord) -> Self {
        self.record = Some(record);
        self
    }

    pub fn format(&self) -> Option<SourceFormat> {
        SourceFormat::from_url(&self.url)
    }

    pub fn transform(&self) -> Transform {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Transform::from_translation(self.position)
            .with_rotation(rotation)
            .with_scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_taken_from_extension() {
        assert_eq!(SourceFormat::from_url("models/a.GLB"), Some(SourceFormat::Gltf));
        assert_eq!(SourceFormat::from_url("models/a.stl"), Some(SourceFormat::Stl));
        assert_eq!(SourceFormat::from_url("a.obj?v=2"), Some(SourceFormat::Obj));
        assert_eq!(SourceFormat::from_url("models/a.fbx"), None);
        assert_eq!(SourceFormat::from_url("models/noext"), None);
    }

    #[test]
    fn tooltip_lists_name_price_and_availability() {
        let record = ModelRecord::new("Tachikoma", "0.01", 100);
        assert_eq!(
            record.tooltip_text("ETH"),
            "Tachikoma\nPrice: 0.01 ETH\nAvailable: 100\nClick to mint!"
        );
    }

    #[test]
    fn base_units_are_exact_wei() {
        let record = ModelRecord::new("Swordfish II", "0.05", 1);
        assert_eq!(
            record.base_units().unwrap(),
            U256::from(50_000_000_000_000_000u128)
        );
    }

    #[test]
    fn unparseable_price_is_rejected() {
        let record = ModelRecord::new("Broken", "a lot", 1);
        assert_eq!(
            record.base_units(),
            Err(TransactionError::InvalidPrice("a lot".into()))
        );
    }

    #[test]
    fn transform_applies_position_rotation_and_scale() {
        let spec = ExhibitSpec::new("m.stl")
            .at(Vec3::new(0.0, 2.0, -5.0))
            .scaled(Vec3::splat(0.5))
            .rotated(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let transform = spec.transform();

        assert_eq!(transform.translation, Vec3::new(0.0, 2.0, -5.0));
        assert_eq!(transform.scale, Vec3::splat(0.5));
        let rotated = transform.rotation * Vec3::X;
        assert!((rotated - Vec3::NEG_Z).length() < 1e-5);
    }
}
