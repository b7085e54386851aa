//! # Domain Layer (Inner Hexagon)
//!
//! Pure vault logic: state, policy, authorization and call-data codec.
//! No I/O, no async.

pub mod abi;
pub mod authorization;
pub mod entities;
pub mod invariants;
pub mod policy;
pub mod services;
pub mod value_objects;

pub use authorization::{Rejection, Validation};
pub use entities::*;
pub use policy::{Permission, EXECUTE_SELECTOR, SEND_MESSAGE_SELECTOR};
pub use services::*;
pub use value_objects::*;
