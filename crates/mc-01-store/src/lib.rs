//! # mc-01-store
//!
//! Storage Partition Manager and the storage boundary for Modular-Chain.
//!
//! ## Role in System
//!
//! - **Namespace Allocator**: [`PartitionManager`] hands out one opaque
//!   [`StoreKey`] per module per partition class and refuses duplicates.
//! - **Storage Boundary**: [`VersionedStore`] is the port to the external
//!   multi-version key-value store; [`InMemoryVersionedStore`] is the
//!   reference adapter.
//! - **Views**: [`MultiStore`] routes handles to the right class,
//!   [`CacheMultiStore`] buffers writes for one transaction or hook, and
//!   [`SnapshotStore`] serves read-only committed state.
//!
//! ## Partition Classes
//!
//! ```text
//! Persistent ──► VersionedStore (committed per height, queryable by version)
//! Transient  ──► cleared at begin-block and at commit
//! Memory     ──► never persisted; rebuilt from persistent state on restart
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
