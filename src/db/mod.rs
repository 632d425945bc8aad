pub mod memory;
pub mod seed;
pub mod snapshot;
pub mod source;

pub use memory::InMemoryCatalog;
pub use snapshot::{ResolvedInteraction, Snapshot, SnapshotBuilder};
pub use source::CatalogSource;

#[cfg(test)]
pub use source::MockCatalogSource;
