//! Grid fill built on the copy manager.
//!
//! Fill stamps the selected group into a 3D grid: one copy per cell, stepped
//! by the group's bounding-box size plus a configurable border, with an
//! optional ramp raising each row. The cell at the origin is skipped; the
//! original buildings already occupy it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use simulation::object_graph::ObjectGraph;
use simulation::{FactorySettings, SaveSession};

use crate::error::CopyError;
use crate::manager::{BuildingCopier, CopyId};

/// Repetition along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillAxis {
    pub amount: u32,
    pub reversed: bool,
}

impl Default for FillAxis {
    fn default() -> Self {
        FillAxis {
            amount: 1,
            reversed: false,
        }
    }
}

impl FillAxis {
    /// A single, non-reversed cell: no repetition along the axis.
    pub const NONE: FillAxis = FillAxis {
        amount: 1,
        reversed: false,
    };
}

/// Repetition counts for all three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FillCount {
    pub x: FillAxis,
    pub y: FillAxis,
    pub z: FillAxis,
}

impl FillCount {
    /// Total number of grid cells, the original's included.
    pub fn cells(&self) -> u64 {
        self.x.amount as u64 * self.y.amount as u64 * self.z.amount as u64
    }
}

/// Fill parameters exchanged with the settings widget.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FillSettings {
    pub count: FillCount,
    /// Extra spacing between neighbouring cells, per axis.
    pub border: Vec3,
    /// Per-row height increase along the x and y axes.
    pub ramp: Vec2,
}

/// Fill state: which grid cell maps to which preview copy.
#[derive(Resource, Debug, Default)]
pub struct FillTool {
    pub settings: FillSettings,
    copies: HashMap<IVec3, CopyId>,
}

impl FillTool {
    pub fn copy_count(&self) -> usize {
        self.copies.len()
    }

    pub fn copy_at(&self, cell: IVec3) -> Option<CopyId> {
        self.copies.get(&cell).copied()
    }

    /// Rebuild the preview grid for the given settings. Any previous preview
    /// is removed first. Returns the number of copies placed.
    pub fn preview(
        &mut self,
        graph: &mut ObjectGraph,
        session: &SaveSession,
        factory: &FactorySettings,
        copier: &mut BuildingCopier,
        settings: FillSettings,
    ) -> Result<u32, CopyError> {
        self.cancel(graph, copier);
        self.settings = settings;

        let step = copier.bounds().size() + settings.border;
        let mut placed = 0u32;
        for iz in 0..settings.count.z.amount {
            for iy in 0..settings.count.y.amount {
                for ix in 0..settings.count.x.amount {
                    if ix == 0 && iy == 0 && iz == 0 {
                        continue;
                    }
                    let sx = signed_index(ix, settings.count.x.reversed);
                    let sy = signed_index(iy, settings.count.y.reversed);
                    let sz = signed_index(iz, settings.count.z.reversed);
                    let mut offset = Vec3::new(step.x * sx, step.y * sy, step.z * sz);
                    offset.z += settings.ramp.x * sx + settings.ramp.y * sy;

                    let copy_id =
                        copier.add_copy(graph, session, factory, offset, 0.0, Vec3::ZERO, true)?;
                    self.copies
                        .insert(IVec3::new(ix as i32, iy as i32, iz as i32), copy_id);
                    placed += 1;
                }
            }
        }
        info!("fill preview: {} copies", placed);
        Ok(placed)
    }

    /// Remove every fill copy.
    pub fn cancel(&mut self, graph: &mut ObjectGraph, copier: &mut BuildingCopier) {
        for (_, copy_id) in self.copies.drain() {
            if let Err(e) = copier.remove_copy(graph, copy_id) {
                warn!("fill cancel: {e}");
            }
        }
    }

    /// Commit the preview grid through the copier.
    pub fn finish(
        &mut self,
        graph: &mut ObjectGraph,
        session: &SaveSession,
        copier: &mut BuildingCopier,
    ) -> Result<(), CopyError> {
        self.copies.clear();
        copier.finish(graph, session)
    }
}

fn signed_index(index: u32, reversed: bool) -> f32 {
    if reversed {
        -(index as f32)
    } else {
        index as f32
    }
}
