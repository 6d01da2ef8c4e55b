//! Hangar: owned models, pilot controls and the distance reward.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::{apply_panel_style, hint, panel_frame};
use crate::ownership::{OwnershipRecord, PilotingState, REWARD_THRESHOLD};

pub fn hangar_plugin(app: &mut App) {
    app.add_systems(Update, hangar_panel_system);
}

fn hangar_panel_system(
    mut contexts: EguiContexts,
    ownership: Res<OwnershipRecord>,
    mut piloting: ResMut<PilotingState>,
) {
    let owned: Vec<String> = ownership.owned_names().map(str::to_string).collect();

    egui::Window::new("Hangar")
        .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
        .resizable(false)
        .collapsible(false)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            if owned.is_empty() {
                hint(ui, "Mint a model to pilot it.");
                return;
            }

            for name in &owned {
                ui.horizontal(|ui| {
                    ui.label(name);
                    let active = piloting.target() == Some(name.as_str());
                    if active {
                        ui.label(
                            egui::RichText::new("piloting")
                                .color(egui::Color32::from_rgb(100, 220, 180)),
                        );
                    } else if ui.button("Pilot").clicked() {
                        if let Err(err) = piloting.start(name, &ownership) {
                            warn!("cannot pilot {name}: {err}");
                        }
                    }
                });
            }

            if piloting.target().is_some() {
                ui.add_space(4.0);
                if ui.button("Stop").clicked() {
                    piloting.stop();
                }
                hint(ui, "Arrow keys / WASD to move");
            }

            ui.separator();
            let distance = piloting.distance_traveled();
            ui.label(format!("Distance  {distance:.0}"));
            ui.add(
                egui::ProgressBar::new((distance / REWARD_THRESHOLD).min(1.0))
                    .fill(egui::Color32::from_rgb(80, 180, 140)),
            );

            if piloting.reward_claimed() {
                ui.label("Reward claimed!");
            } else {
                let claim = ui.add_enabled(
                    piloting.reward_unlocked(),
                    egui::Button::new("Claim reward"),
                );
                if claim.clicked() {
                    if let Err(err) = piloting.claim_reward() {
                        warn!("reward not claimed: {err}");
                    }
                }
            }
        });
}
