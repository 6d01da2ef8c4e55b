//! Minimal prelude for SDK consumers.

pub use crate::catalog::{default_catalog, ExhibitSpec, MaterialOverride, ModelRecord};
pub use crate::config::{museum_config, MuseumConfig};
pub use crate::ownership::{JsonFileStore, MemoryStore, OwnershipStore};
pub use crate::sdk::MuseumBuilder;
pub use crate::wallet::{EvmTransferBackend, TransferBackend};
