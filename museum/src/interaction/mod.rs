//! Pointer interaction: hover tooltip and click-to-mint over exhibits.

mod picking;
mod pointer;

use bevy::prelude::*;

pub use picking::{
    nearest_hit, ray_aabb_intersect, ray_hits_box, ray_hits_mesh, ray_triangle_intersect,
    screen_ray, top_level_ancestor, ExhibitPicker,
};
pub use pointer::{
    click_system, hover_system, is_click, track_ui_pointer, PointerOverUi, PointerPress,
    CLICK_SLOP,
};

/// Scene content that is never picked, like the starfield.
#[derive(Component, Default)]
pub struct Decoration;

/// Floating tooltip next to the pointer.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct TooltipState {
    pub visible: bool,
    pub text: String,
    pub screen_x: f32,
    pub screen_y: f32,
}

impl TooltipState {
    pub fn show(&mut self, text: String, at: Vec2) {
        self.visible = true;
        self.text = text;
        self.screen_x = at.x;
        self.screen_y = at.y;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.text.clear();
    }
}

pub fn interaction_plugin(app: &mut App) {
    app.init_resource::<TooltipState>()
        .init_resource::<PointerPress>()
        .init_resource::<PointerOverUi>()
        .add_systems(
            Update,
            (track_ui_pointer, hover_system, click_system).chain(),
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hiding_clears_text() {
        let mut tooltip = TooltipState::default();
        tooltip.show("Tachikoma".into(), Vec2::new(10.0, 20.0));
        assert!(tooltip.visible);
        assert_eq!((tooltip.screen_x, tooltip.screen_y), (10.0, 20.0));

        tooltip.hide();
        assert!(!tooltip.visible);
        assert!(tooltip.text.is_empty());
    }
}
