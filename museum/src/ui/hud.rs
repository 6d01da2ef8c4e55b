//! Wallet panel, signer note and FPS counter.

use alloy::primitives::Address;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::{apply_panel_style, hint, panel_frame};
use crate::wallet::WalletSession;

pub fn hud_plugin(app: &mut App) {
    app.add_systems(Update, (wallet_panel_system, signer_note_system));
}

fn wallet_panel_system(
    mut contexts: EguiContexts,
    mut wallet: ResMut<WalletSession>,
    diagnostics: Res<DiagnosticsStore>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed())
        .unwrap_or(0.0);

    egui::Window::new("Wallet")
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            match wallet.address() {
                Some(address) => {
                    ui.label(
                        egui::RichText::new(abbreviate(&address))
                            .color(egui::Color32::from_rgb(100, 220, 180)),
                    );
                    if ui.button("Disconnect").clicked() {
                        wallet.disconnect();
                    }
                }
                None => {
                    let connect =
                        ui.add_enabled(wallet.can_connect(), egui::Button::new("Connect Wallet"));
                    if connect.clicked() {
                        wallet.connect();
                    }
                    if !wallet.can_connect() {
                        hint(ui, "no signer configured");
                    }
                }
            }

            ui.separator();
            ui.label(format!("FPS  {fps:.0}"));
        });
}

fn signer_note_system(mut contexts: EguiContexts) {
    egui::Window::new("Signer")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);
            ui.label("Sector 77");
            hint(ui, "Local devnet signer. Drag to orbit, click a model to mint.");
        });
}

/// `0x1234...abcd`
fn abbreviate(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn address_is_shortened_to_prefix_and_suffix() {
        let addr = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(abbreviate(&addr), "0xf39F...2266");
    }
}
