//! Oriented bounding box of a building group.
//!
//! Grouped buildings are usually rotation-aligned in steps of 90 degrees, so
//! the box is aligned to the most common building yaw (mod 90) rather than
//! the world axes; downstream fill placement wastes far less padding that
//! way.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use simulation::config::YAW_ALIGN_DEG;
use simulation::object_graph::{rotate_yaw, unrotate_yaw, ActorTransform, ClassId, ObjectGraph, ObjectId};

/// Minimal box containing the group, axis-aligned in a frame rotated by
/// `yaw` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotatedBoundingBox {
    pub center: Vec3,
    /// Half-size along each axis of the rotated frame.
    pub extents: Vec3,
    /// Frame rotation in degrees (the group's dominant rotation).
    pub yaw: f32,
}

impl RotatedBoundingBox {
    /// The four ground-plane corners, counter-clockwise from +X+Y. Any other
    /// corner number returns the center.
    pub fn corner(&self, corner_num: u32) -> Vec3 {
        let local = match corner_num {
            0 => Vec3::new(self.extents.x, self.extents.y, 0.0),
            1 => Vec3::new(self.extents.x, -self.extents.y, 0.0),
            2 => Vec3::new(-self.extents.x, -self.extents.y, 0.0),
            3 => Vec3::new(-self.extents.x, self.extents.y, 0.0),
            _ => return self.center,
        };
        self.center + rotate_yaw(local, self.yaw)
    }

    /// Full size of the box along each axis of its frame.
    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }
}

/// Yaw reduced into [0, 90).
fn reduced_yaw(yaw: f32) -> f32 {
    ((yaw % YAW_ALIGN_DEG) + YAW_ALIGN_DEG) % YAW_ALIGN_DEG
}

/// Most frequent reduced yaw over the group's buildings, ties broken by
/// encounter order.
fn dominant_yaw(graph: &ObjectGraph, objects: &[ObjectId]) -> f32 {
    let mut histogram: Vec<(f32, u32)> = Vec::new();
    for &id in objects {
        if !graph.is_building(id) {
            continue;
        }
        let Some(transform) = graph.transform(id) else {
            continue;
        };
        let reduced = reduced_yaw(transform.yaw);
        match histogram.iter_mut().find(|(y, _)| (*y - reduced).abs() < 1e-3) {
            Some((_, count)) => *count += 1,
            None => histogram.push((reduced, 1)),
        }
    }
    let mut best = (0.0, 0u32);
    for &(yaw, count) in &histogram {
        if count > best.1 {
            best = (yaw, count);
        }
    }
    best.0
}

/// Temporary bounds-probe actor, destroyed when dropped so it can never leak
/// past the measurement, whichever path returns first.
struct ProbeActor<'g> {
    graph: &'g mut ObjectGraph,
    id: ObjectId,
}

impl<'g> ProbeActor<'g> {
    /// Spawn a non-colliding instance of `class` at the identity transform.
    fn spawn(graph: &'g mut ObjectGraph, class: ClassId) -> Self {
        let id = graph.spawn_actor(class, "BoundsProbe", ActorTransform::IDENTITY);
        graph.finish_spawning(id, true);
        ProbeActor { graph, id }
    }

    /// Default render bounds (origin, rounded extents) of the probe.
    fn render_bounds(&self) -> (Vec3, Vec3) {
        self.graph
            .get(self.id)
            .and_then(|o| o.actor.as_ref())
            .map(|a| a.render_bounds())
            .unwrap_or((Vec3::ZERO, Vec3::ZERO))
    }
}

impl Drop for ProbeActor<'_> {
    fn drop(&mut self) {
        self.graph.destroy(self.id);
    }
}

/// Compute the group's oriented bounding box.
///
/// Buildings with a clearance volume contribute its eight corners directly;
/// the rest are measured through a probe spawn of their class. All corners
/// are un-rotated into the dominant frame before min/max accumulation.
pub fn calculate_bounds(graph: &mut ObjectGraph, objects: &[ObjectId]) -> RotatedBoundingBox {
    let yaw = dominant_yaw(graph, objects);

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);

    for &id in objects {
        let (class, transform, clearance) = {
            let Some(obj) = graph.get(id) else {
                continue;
            };
            let class_def = graph.classes.get(obj.class);
            if !class_def.is_building {
                continue;
            }
            let Some(actor) = obj.actor.as_ref() else {
                continue;
            };
            (obj.class, actor.transform, class_def.clearance)
        };

        let (origin, extents) = match clearance {
            Some(volume) => (volume.offset, volume.extents),
            None => {
                let probe = ProbeActor::spawn(graph, class);
                probe.render_bounds()
            }
        };

        for i in 0..(1 << 3) {
            let sign = Vec3::new(
                if i & 1 != 0 { 1.0 } else { -1.0 },
                if i & 2 != 0 { 1.0 } else { -1.0 },
                if i & 4 != 0 { 1.0 } else { -1.0 },
            );
            let corner = origin + extents * sign;
            let world = transform.location + rotate_yaw(corner, transform.yaw);
            let aligned = unrotate_yaw(world, yaw);
            min = min.min(aligned);
            max = max.max(aligned);
        }
    }

    if min.x > max.x {
        // No building contributed any corner.
        return RotatedBoundingBox::default();
    }

    let min_world = rotate_yaw(min, yaw);
    let max_world = rotate_yaw(max, yaw);
    let center = (min_world + max_world) / 2.0;
    let extents = unrotate_yaw(max_world - center, yaw).round();

    RotatedBoundingBox {
        center,
        extents,
        yaw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_yaw_range() {
        assert_eq!(reduced_yaw(0.0), 0.0);
        assert_eq!(reduced_yaw(90.0), 0.0);
        assert_eq!(reduced_yaw(135.0), 45.0);
        assert_eq!(reduced_yaw(-45.0), 45.0);
        assert_eq!(reduced_yaw(-90.0), 0.0);
    }

    #[test]
    fn test_corner_rotates_with_frame() {
        let bounds = RotatedBoundingBox {
            center: Vec3::ZERO,
            extents: Vec3::new(2.0, 1.0, 5.0),
            yaw: 90.0,
        };
        let corner = bounds.corner(0);
        // (2,1,0) rotated 90 degrees -> (-1,2,0).
        assert!((corner.x + 1.0).abs() < 1e-5);
        assert!((corner.y - 2.0).abs() < 1e-5);
        assert_eq!(bounds.corner(7), bounds.center);
    }
}
