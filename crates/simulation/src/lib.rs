use bevy::prelude::*;

pub mod catalog;
pub mod config;
pub mod object_graph;

use object_graph::MaterialId;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Save-schema version and engine build identifier passed into the pre/post
/// save and load hooks, so hooks can apply version-specific migrations.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSession {
    pub save_version: u32,
    pub build_id: u32,
}

impl Default for SaveSession {
    fn default() -> Self {
        SaveSession {
            save_version: config::SAVE_VERSION,
            build_id: config::BUILD_ID,
        }
    }
}

/// Global factory rendering settings shared with the copy tool.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorySettings {
    /// Material applied to preview meshes to indicate a valid placement.
    pub valid_placement_material: MaterialId,
}

impl Default for FactorySettings {
    fn default() -> Self {
        FactorySettings {
            valid_placement_material: MaterialId(config::VALID_PLACEMENT_MATERIAL),
        }
    }
}
