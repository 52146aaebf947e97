//! # Modular-Chain Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Keys, genesis documents, a block-driving harness
//! └── integration/      # Cross-crate scenarios through ChainApp
//!     ├── genesis.rs
//!     ├── transfers.rs
//!     ├── lifecycle.rs
//!     ├── assembly.rs
//!     ├── staking.rs
//!     └── determinism.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mc-tests
//! cargo test -p mc-tests integration::lifecycle
//! cargo bench -p mc-tests
//! ```

pub mod fixtures;
pub mod integration;
