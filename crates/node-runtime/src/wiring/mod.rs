//! # Routing
//!
//! Connects transactions and queries to the modules that own them.
//!
//! ```text
//!   Tx ──► AnteHandler ──► MsgRouter ──► type URL ──► MessageHandler
//!                             ▲
//!                             └── MsgValidator (signers, stateless checks)
//!
//!   "bank/balance/<addr>/<denom>" ──► QueryRouter ──► "bank" ──► QueryHandler
//! ```

pub mod routers;

pub use routers::*;
