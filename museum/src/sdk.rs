//! SDK entry points and builder for composing the museum app.

use bevy::prelude::*;

use crate::assets::mesh_loader_plugin;
use crate::camera::orbit_camera_plugin;
use crate::catalog::{default_catalog, ExhibitSpec};
use crate::config::{self, MuseumConfig};
use crate::interaction::interaction_plugin;
use crate::mint::{mint_plugin, TransferChannel};
use crate::ownership::{
    pilot_movement_system, JsonFileStore, OwnershipRecord, OwnershipStore, PilotingState,
};
use crate::scene::{scene_plugin, starfield_plugin, ExhibitCatalog};
use crate::ui::{egui_plugin, hangar_plugin, hud_plugin, status_plugin, tooltip_plugin};
use crate::wallet::{EvmTransferBackend, TransferBackend, WalletSession};

/// Builder for constructing a museum app with customizable plugins.
pub struct MuseumBuilder {
    config: Option<MuseumConfig>,
    catalog: Option<Vec<ExhibitSpec>>,
    store: Option<Box<dyn OwnershipStore>>,
    backend: Option<Box<dyn TransferBackend>>,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_starfield: bool,
    enable_ui: bool,
    enable_piloting: bool,
}

impl Default for MuseumBuilder {
    fn default() -> Self {
        Self {
            config: None,
            catalog: None,
            store: None,
            backend: None,
            window_title: "Sector 77 Museum".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::srgb_u8(0x10, 0x10, 0x14),
            enable_starfield: true,
            enable_ui: true,
            enable_piloting: true,
        }
    }
}

impl MuseumBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration instead of reading the environment.
    pub fn config(mut self, config: MuseumConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Add one exhibit on top of the current catalog.
    pub fn exhibit(mut self, spec: ExhibitSpec) -> Self {
        self.catalog.get_or_insert_with(default_catalog).push(spec);
        self
    }

    /// Replace the catalog entirely.
    pub fn exhibits(mut self, specs: impl IntoIterator<Item = ExhibitSpec>) -> Self {
        self.catalog = Some(specs.into_iter().collect());
        self
    }

    /// Persist ownership somewhere other than the configured JSON file.
    pub fn ownership_store(mut self, store: impl OwnershipStore) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Provide a custom transfer backend implementation.
    pub fn transfer_backend(mut self, backend: impl TransferBackend) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn disable_starfield(mut self) -> Self {
        self.enable_starfield = false;
        self
    }

    pub fn disable_ui(mut self) -> Self {
        self.enable_ui = false;
        self
    }

    pub fn disable_piloting(mut self) -> Self {
        self.enable_piloting = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        let config = self.config.unwrap_or_else(config::museum_config);
        let catalog = self.catalog.unwrap_or_else(default_catalog);
        let backend = self
            .backend
            .unwrap_or_else(|| Box::new(EvmTransferBackend::new(config.rpc_url.clone())));

        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }));

        // Loaded after DefaultPlugins so the log subscriber sees load errors.
        let store = self
            .store
            .unwrap_or_else(|| Box::new(JsonFileStore::new(&config.ownership_path)));
        let ownership = OwnershipRecord::load(store, &config.demo_owned);

        let mut wallet = WalletSession::new(config.signer.clone());
        if config.auto_connect && !wallet.connect() {
            warn!("wallet auto-connect requested but no signer is configured");
        }
        info!("devnet RPC {}", config.rpc_url);

        app.insert_resource(ClearColor(self.clear_color))
            .insert_resource(ExhibitCatalog(catalog))
            .insert_resource(ownership)
            .insert_resource(wallet)
            .insert_resource(TransferChannel::from_boxed(backend))
            .init_resource::<PilotingState>()
            .add_plugins((
                egui_plugin,
                mesh_loader_plugin,
                scene_plugin,
                orbit_camera_plugin,
                interaction_plugin,
                mint_plugin,
            ));

        if self.enable_starfield {
            app.add_plugins(starfield_plugin);
        }
        if self.enable_ui {
            app.add_plugins((hud_plugin, status_plugin, tooltip_plugin));
        }
        if self.enable_piloting {
            app.add_systems(Update, pilot_movement_system);
            if self.enable_ui {
                app.add_plugins(hangar_plugin);
            }
        }

        app
    }
}
