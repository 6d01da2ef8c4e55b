//! Mint status line with a copy button for the transaction id.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::{apply_panel_style, panel_frame};
use crate::mint::MintLedger;

const COPIED_FEEDBACK_SECS: f32 = 2.0;

/// When the TX id was last copied, in app seconds.
#[derive(Resource, Default, Debug)]
pub struct CopyFeedback {
    copied_at: Option<f32>,
}

impl CopyFeedback {
    pub fn mark(&mut self, now: f32) {
        self.copied_at = Some(now);
    }

    pub fn is_visible(&self, now: f32) -> bool {
        self.copied_at
            .is_some_and(|at| now - at < COPIED_FEEDBACK_SECS)
    }
}

pub fn status_plugin(app: &mut App) {
    app.init_resource::<CopyFeedback>()
        .add_systems(Update, status_panel_system);
}

fn status_panel_system(
    mut contexts: EguiContexts,
    ledger: Res<MintLedger>,
    time: Res<Time>,
    mut feedback: ResMut<CopyFeedback>,
) {
    let status = ledger.status();
    let Some(text) = status.text() else {
        return;
    };
    let now = time.elapsed_secs();
    let color = if status.is_pending() {
        egui::Color32::from_rgb(240, 200, 90)
    } else {
        egui::Color32::from_rgb(200, 220, 240)
    };

    egui::Window::new("Mint status")
        .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);
            ui.set_max_width(420.0);
            ui.label(egui::RichText::new(text).color(color));

            if let Some(id) = status.tx_id() {
                ui.horizontal(|ui| {
                    if ui.button("Copy TX ID").clicked() {
                        ui.ctx().copy_text(id.to_string());
                        feedback.mark(now);
                    }
                    if feedback.is_visible(now) {
                        ui.label("(Copied!)");
                    }
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copied_note_expires_after_two_seconds() {
        let mut feedback = CopyFeedback::default();
        assert!(!feedback.is_visible(0.0));

        feedback.mark(10.0);

        assert!(feedback.is_visible(10.5));
        assert!(feedback.is_visible(11.9));
        assert!(!feedback.is_visible(12.0));
    }
}
