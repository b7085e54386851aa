//! # Adapters Layer (Outer Hexagon)
//!
//! Implementations of the driven ports, plus the in-memory collaborators
//! used by the node binary and the tests.

pub mod call_gateway;
pub mod entry_point;
pub mod feed;
pub mod signer;

pub use call_gateway::*;
pub use entry_point::*;
pub use feed::*;
pub use signer::*;
