//! Live object graph the building tools operate on.
//!
//! Every placed structure and its owned sub-objects (connection components,
//! inventories) is a `GameObject` in an `ObjectGraph` arena. Objects carry an
//! explicit class with a per-type field descriptor list, so tools that need
//! to walk "save-relevant" state can do so without any reflection system.

pub mod graph;
pub mod transform;
pub mod types;

#[cfg(test)]
mod tests;

pub use graph::*;
pub use transform::*;
pub use types::*;
