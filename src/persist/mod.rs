//! Key-value records that survive restarts, and the section bridge on top.

mod bridge;
mod store;

pub use bridge::{merge_known_keys, PersistEvent, PersistRequest, PersistenceBridge, Section, SectionState, LEGACY_GRID_KEY};
pub use store::{JsonFileStore, MemoryStore, RecordStore, StoreError};
