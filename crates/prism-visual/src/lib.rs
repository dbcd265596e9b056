//! PRISM Visual - entities as on-screen objects
//!
//! Every remote entity is shown as a single div-like node whose color and
//! shape come from its identifier, whose offsets come from its position
//! attribute and whose hover label is its formula attribute, decoded into
//! a readable equation.
//!
//! # Pieces
//!
//! - `identity`: identifier bytes → color, shape, rotation
//! - `formula`: packed big-integer pair → `1x + 5 = 2`
//! - `surface`: host render surface trait and an in-memory implementation
//! - `schedule`: deferred presentation tick for style writes
//! - `object`: one visual object per entity
//! - `registry`: get-or-create cache of visual objects

pub mod formula;
pub mod identity;
pub mod object;
pub mod registry;
pub mod schedule;
pub mod style;
pub mod surface;

pub use formula::*;
pub use identity::*;
pub use object::*;
pub use registry::*;
pub use schedule::*;
pub use style::*;
pub use surface::*;
