//! PRISM Runtime - View orchestration and event loop
//!
//! Each turn of the loop:
//! 1. Receive one update (or a click)
//! 2. Resolve or create the entity's visual object
//! 3. Apply the attribute value or clear it
//! 4. Run the deferred style writes
//!
//! Everything runs on one thread. The view context is built explicitly at
//! startup and owned by the viewer.

pub mod command;
pub mod config;
pub mod context;
pub mod router;
pub mod telemetry;
pub mod viewer;

pub use command::*;
pub use config::*;
pub use context::*;
pub use router::*;
pub use telemetry::*;
pub use viewer::*;
