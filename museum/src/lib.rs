//! Sector 77 museum: a 3D showcase of imported models with devnet minting.
//!
//! Library root: catalog, scene, interaction, wallet, and ownership modules,
//! wired together by [`MuseumBuilder`].

pub mod assets;
pub mod camera;
pub mod catalog;
pub mod config;
pub mod error;
pub mod interaction;
pub mod mint;
pub mod ownership;
pub mod scene;
mod ui;
pub mod wallet;

pub mod prelude;
pub mod sdk;

pub use catalog::{default_catalog, ExhibitSpec, ModelRecord, SourceFormat};
pub use mint::{MintLedger, TransactionStatus};
pub use ownership::{JsonFileStore, MemoryStore, OwnershipRecord, OwnershipStore, PilotingState};
pub use sdk::MuseumBuilder;
pub use wallet::{execute_transfer, CancelToken, ChainClient, TransferDraft, Wallet};
