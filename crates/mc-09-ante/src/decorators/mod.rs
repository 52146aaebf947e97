//! The decorators of the admission chain, each one concern.

pub mod basic;
pub mod fee;
pub mod sigs;

pub use basic::*;
pub use fee::*;
pub use sigs::*;

use crate::{AnteError, AnteTx};
use mc_02_module::Context;

/// One step of the admission chain.
pub trait AnteDecorator: Send + Sync {
    fn name(&self) -> &'static str;

    fn ante(&self, ctx: &mut Context<'_>, tx: &AnteTx) -> Result<(), AnteError>;
}
