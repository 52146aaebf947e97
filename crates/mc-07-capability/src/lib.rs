//! # mc-07-capability
//!
//! Object capabilities: unforgeable handles that modules create, pass to
//! each other and authenticate by name.
//!
//! ## Two-Level Storage
//!
//! | Partition | Content |
//! |-----------|---------|
//! | persistent `capability` | next index, owners (module, name) per index |
//! | memory `memory_capability` | forward `module ‖ index → name`, reverse `module ‖ name → index` |
//!
//! The memory partition is lost on restart and rebuilt from the persistent
//! owners by the first begin-block, which is why the capability module runs
//! first in the begin-block order.
//!
//! ## Scoping
//!
//! Each module gets one [`ScopedKeeper`] through
//! [`CapabilityKeeper::scope_to_module`]. After [`CapabilityKeeper::seal`] no
//! further scopes can be created.

pub mod errors;
pub mod genesis;
pub mod keeper;
pub mod module;
pub mod scoped;
pub mod types;

pub use errors::*;
pub use genesis::*;
pub use keeper::*;
pub use module::*;
pub use scoped::*;
pub use types::*;
