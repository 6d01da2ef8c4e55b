use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow};
use bevy_egui::EguiContexts;

use super::{ExhibitPicker, TooltipState};
use crate::mint::MintRequested;
use crate::wallet::NATIVE_SYMBOL;

/// Largest pointer travel between press and release that still counts as a
/// click rather than an orbit drag.
pub const CLICK_SLOP: f32 = 4.0;

/// Whether egui claimed the pointer this frame.
#[derive(Resource, Default, Debug)]
pub struct PointerOverUi(pub bool);

pub fn track_ui_pointer(mut contexts: EguiContexts, mut over_ui: ResMut<PointerOverUi>) {
    over_ui.0 = contexts.ctx_mut().is_pointer_over_area();
}

/// Where the left button went down, if it went down over the scene.
#[derive(Resource, Default, Debug)]
pub struct PointerPress {
    origin: Option<Vec2>,
}

pub fn is_click(pressed_at: Vec2, released_at: Vec2) -> bool {
    pressed_at.distance(released_at) <= CLICK_SLOP
}

/// Re-resolves the tooltip on every pointer move.
pub fn hover_system(
    mut moved: EventReader<CursorMoved>,
    mut left: EventReader<CursorLeft>,
    over_ui: Res<PointerOverUi>,
    picker: ExhibitPicker,
    mut tooltip: ResMut<TooltipState>,
) {
    for event in moved.read() {
        if over_ui.0 {
            tooltip.hide();
            continue;
        }
        match picker.pick(event.position) {
            Some(record) => tooltip.show(record.tooltip_text(NATIVE_SYMBOL), event.position),
            None => tooltip.hide(),
        }
    }
    if left.read().count() > 0 {
        tooltip.hide();
    }
}

pub fn click_system(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    over_ui: Res<PointerOverUi>,
    picker: ExhibitPicker,
    mut press: ResMut<PointerPress>,
    mut tooltip: ResMut<TooltipState>,
    mut requests: EventWriter<MintRequested>,
) {
    let cursor = windows
        .get_single()
        .ok()
        .and_then(Window::cursor_position);

    if mouse.just_pressed(MouseButton::Left) {
        press.origin = if over_ui.0 {
            None
        } else {
            cursor
        };
    }
    if !mouse.just_released(MouseButton::Left) {
        return;
    }

    let (Some(pressed_at), Some(released_at)) = (press.origin.take(), cursor) else {
        return;
    };
    if !is_click(pressed_at, released_at) {
        return;
    }

    match picker.pick(released_at) {
        Some(record) => {
            debug!("clicked {}", record.display_name);
            requests.send(MintRequested {
                record: record.clone(),
            });
        }
        None => tooltip.hide(),
    }
}
