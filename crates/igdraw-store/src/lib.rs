//! In-memory campaign store and fair winner rotation.

pub mod error;
pub mod meta;
pub mod rotation;
pub mod store;

pub use error::DrawError;
pub use meta::{SyncMeta, SyncSource};
pub use rotation::{PickedWinner, RotationChange, RotationEngine, RotationState};
pub use store::{CampaignMap, CampaignStore, Draw, StoreSnapshot};
