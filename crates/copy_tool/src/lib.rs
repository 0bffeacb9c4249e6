//! Building copy/fill tool.
//!
//! Collects a selection of placed buildings together with everything they
//! transitively own or depend on, validates that the set is self-contained,
//! computes an oriented bounding box aligned to the group's dominant
//! rotation, and stamps out live preview copies whose internal references are
//! rewritten to stay inside each copy. The fill action arranges many such
//! copies in a grid.

pub mod bounds;
pub mod collector;
pub mod error;
pub mod fill;
pub mod manager;
pub mod plugin;
pub mod snapshot;
pub mod validate;


pub use bounds::RotatedBoundingBox;
pub use collector::{DeclaredDependencies, DependencySource};
pub use error::CopyError;
pub use fill::{FillAxis, FillCount, FillSettings, FillTool};
pub use manager::{BuildingCopier, CopyId};
pub use plugin::CopyToolPlugin;
