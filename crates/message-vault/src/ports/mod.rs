//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `VaultApi`
//! - **Driven Ports (Outbound)**: `SignerRecovery`, `EntryPointLedger`, `CallGateway`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
