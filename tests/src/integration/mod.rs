//! Cross-crate integration flows.

pub mod fixtures;

mod deposit_flows;
mod execution_flows;
mod message_flows;
mod validation_flows;
