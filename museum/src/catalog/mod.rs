//! Exhibit catalog: which assets are loaded, where they sit, and what they cost.

mod model;

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

pub use model::{ExhibitSpec, MaterialOverride, ModelRecord, SourceFormat};

pub const SWORDFISH: &str = "Swordfish II";
pub const TACHIKOMA: &str = "Tachikoma";

/// The exhibits shown by default: two mintable models and the hall they stand in.
pub fn default_catalog() -> Vec<ExhibitSpec> {
    vec![
        ExhibitSpec::new("models/swordfishII_0104.gltf")
            .primary()
            .with_record(ModelRecord::new(SWORDFISH, "0.05", 100).ownable()),
        ExhibitSpec::new("models/tachikoma.stl")
            .at(Vec3::new(0.0, 2.0, -5.0))
            .scaled(Vec3::splat(1.0 / 3.0))
            .rotated(Vec3::new(-FRAC_PI_2, 0.0, -FRAC_PI_2))
            .with_material(MaterialOverride::srgb_u8(0x84, 0x93, 0xd6))
            .with_record(ModelRecord::new(TACHIKOMA, "0.01", 100).ownable()),
        ExhibitSpec::new("models/museum1.glb"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_covers_three_formats() {
        let catalog = default_catalog();
        let formats: Vec<_> = catalog.iter().map(|spec| spec.format()).collect();

        assert_eq!(
            formats,
            vec![
                Some(SourceFormat::Gltf),
                Some(SourceFormat::Stl),
                Some(SourceFormat::Gltf)
            ]
        );
        assert_eq!(catalog.iter().filter(|spec| spec.primary).count(), 1);
    }

    #[test]
    fn both_mintable_models_are_ownable() {
        let ownable: Vec<_> = default_catalog()
            .into_iter()
            .filter_map(|spec| spec.record)
            .filter(|record| record.ownable)
            .map(|record| record.display_name)
            .collect();

        assert_eq!(ownable, vec![SWORDFISH, TACHIKOMA]);
    }
}
