//! # mc-03-params
//!
//! Parameter Subspace Registry.
//!
//! Every module that owns configuration gets a [`Subspace`]: a named table in
//! the shared params partition, prefixed by the subspace name and bound once
//! to a [`KeyTable`] that fixes which keys exist, their [`ParamKind`], and the
//! rule each write must satisfy.
//!
//! ## Access Rules
//!
//! | Operation | Who | Failure |
//! |-----------|-----|---------|
//! | `get` | any keeper | `NotFound` (recoverable), `UnregisteredKey` (fatal) |
//! | `set` | owning module or governance | value rejected, previous value kept |
//! | `with_key_table` | construction | second bind is a construction error |

pub mod errors;
pub mod keeper;
pub mod module;
pub mod subspace;
pub mod types;

pub use errors::*;
pub use keeper::*;
pub use module::*;
pub use subspace::*;
pub use types::*;
