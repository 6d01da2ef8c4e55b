mod exhibits;
mod setup;
mod starfield;

use bevy::prelude::*;

pub use exhibits::{
    apply_material_overrides, attach_loaded_exhibits, frame_primary_exhibit, framing_for,
    request_exhibit_loads, union_boxes, world_aabb, AwaitingFraming, Exhibit, ExhibitCatalog,
    ExhibitHandle, FramingState, MaterialOverridePending, PendingExhibits,
};
pub use setup::{setup_scene, teardown_on_exit, viewport_resize_system, SceneFixture, Viewport};
pub use starfield::{
    star_positions, starfield_plugin, twinkle_opacity, Starfield, StarfieldSettings,
};

/// Camera, lights, exhibit loading and teardown.
pub fn scene_plugin(app: &mut App) {
    app.init_resource::<Viewport>()
        .init_resource::<ExhibitCatalog>()
        .init_resource::<PendingExhibits>()
        .init_resource::<FramingState>()
        .add_systems(Startup, (setup_scene, request_exhibit_loads))
        .add_systems(
            Update,
            (
                viewport_resize_system,
                attach_loaded_exhibits,
                apply_material_overrides,
                frame_primary_exhibit,
            ),
        )
        .add_systems(Last, teardown_on_exit);
}
