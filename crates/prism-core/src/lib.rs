//! PRISM Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the live entity view:
//! - Identifiers (EntityId, EntityIndex)
//! - Attribute values and update events (Position, Formula, Update)
//! - Commands sent to the remote ledger (CreateFormula)
//! - The error type

pub mod id;
pub mod attribute;
pub mod command;
pub mod error;

pub use id::*;
pub use attribute::*;
pub use command::*;
pub use error::*;
