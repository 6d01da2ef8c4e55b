use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::{apply_panel_style, panel_frame};
use crate::interaction::TooltipState;

const POINTER_OFFSET: egui::Vec2 = egui::vec2(10.0, -10.0);

pub fn tooltip_plugin(app: &mut App) {
    app.add_systems(Update, tooltip_system);
}

fn tooltip_system(mut contexts: EguiContexts, tooltip: Res<TooltipState>) {
    if !tooltip.visible {
        return;
    }
    let at = egui::pos2(tooltip.screen_x, tooltip.screen_y) + POINTER_OFFSET;

    egui::Area::new(egui::Id::new("exhibit-tooltip"))
        .fixed_pos(at)
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            panel_frame().show(ui, |ui| {
                apply_panel_style(ui);
                ui.label(&tooltip.text);
            });
        });
}
