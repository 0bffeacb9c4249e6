//! Preview-copy manager.
//!
//! `BuildingCopier` owns the ordered original set and every outstanding
//! preview copy. A copy is a parallel object graph: each original maps to a
//! freshly spawned duplicate, kept consistent through the snapshot fix-up
//! pass. Lifecycle per copy id:
//! NonExistent -> Previewing -> (Moved)* -> Finalized | Removed.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

use simulation::object_graph::{
    rotate_yaw, transform_around_point, ActorTransform, MeshProxy, Mobility, ObjectGraph, ObjectId,
};
use simulation::{FactorySettings, SaveSession};

use crate::bounds::{calculate_bounds, RotatedBoundingBox};
use crate::collector::{collect_objects, sorted_object_set, DependencySource};
use crate::error::CopyError;
use crate::snapshot;
use crate::validate::validate_objects;

// =============================================================================
// Copy ids & mappings
// =============================================================================

/// Identifier of one preview copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CopyId(pub u32);

/// Monotonic copy-id allocator, owned by the copier instance.
#[derive(Debug, Clone, Default)]
pub struct CopyIdAllocator {
    next: u32,
}

impl CopyIdAllocator {
    pub fn next_id(&mut self) -> CopyId {
        let id = CopyId(self.next);
        self.next += 1;
        id
    }
}

/// Bidirectional original <-> copy object mapping for one preview copy.
#[derive(Debug, Clone, Default)]
pub struct CopyMap {
    forward: HashMap<ObjectId, ObjectId>,
    reverse: HashMap<ObjectId, ObjectId>,
}

impl CopyMap {
    pub fn insert(&mut self, original: ObjectId, copy: ObjectId) {
        self.forward.insert(original, copy);
        self.reverse.insert(copy, original);
    }

    pub fn copy_of(&self, original: ObjectId) -> Option<ObjectId> {
        self.forward.get(&original).copied()
    }

    pub fn original_of(&self, copy: ObjectId) -> Option<ObjectId> {
        self.reverse.get(&copy).copied()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

// =============================================================================
// BuildingCopier
// =============================================================================

/// Collects a building selection and stamps out live preview copies of it.
#[derive(Resource, Debug, Default)]
pub struct BuildingCopier {
    /// The collected closure, topologically sorted: every object's outer and
    /// every dependency appear at a lower index.
    original: Vec<ObjectId>,
    members: HashSet<ObjectId>,
    bounds: RotatedBoundingBox,
    preview: BTreeMap<CopyId, CopyMap>,
    ids: CopyIdAllocator,
}

impl BuildingCopier {
    pub fn original(&self) -> &[ObjectId] {
        &self.original
    }

    /// Whether an object belongs to the collected set.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.members.contains(&id)
    }

    pub fn bounds(&self) -> RotatedBoundingBox {
        self.bounds
    }

    pub fn copy_count(&self) -> usize {
        self.preview.len()
    }

    pub fn copy_ids(&self) -> Vec<CopyId> {
        self.preview.keys().copied().collect()
    }

    pub fn copy_map(&self, id: CopyId) -> Option<&CopyMap> {
        self.preview.get(&id)
    }

    /// Filter an arbitrary actor selection down to buildings and collect it.
    pub fn set_actors(
        &mut self,
        graph: &mut ObjectGraph,
        deps: &dyn DependencySource,
        actors: &[ObjectId],
    ) -> Result<(), CopyError> {
        let buildings: Vec<ObjectId> = actors
            .iter()
            .copied()
            .filter(|&id| graph.is_building(id))
            .collect();
        self.set_buildings(graph, deps, &buildings)
    }

    /// Collect the selection's closure, order it, validate it, and compute
    /// the group bounds. On any failure the copier keeps its previous state
    /// untouched.
    pub fn set_buildings(
        &mut self,
        graph: &mut ObjectGraph,
        deps: &dyn DependencySource,
        buildings: &[ObjectId],
    ) -> Result<(), CopyError> {
        if buildings.is_empty() {
            return Err(CopyError::NoSelection);
        }
        let collected = collect_objects(graph, buildings, deps);
        let sorted = sorted_object_set(graph, &collected, deps)?;
        let issues = validate_objects(graph, &sorted);
        if !issues.is_empty() {
            return Err(CopyError::ClosureViolation { buildings: issues });
        }
        // Outstanding previews are keyed by the outgoing original set and
        // would be orphaned once it is replaced.
        self.cancel(graph);
        self.members = sorted.iter().copied().collect();
        self.original = sorted;
        self.bounds = calculate_bounds(graph, &self.original);
        info!(
            "copy selection ready: {} objects, bounds center {:?} yaw {}",
            self.original.len(),
            self.bounds.center,
            self.bounds.yaw
        );
        Ok(())
    }

    /// The placement transform for one original actor. A `relative` offset is
    /// first rotated into the bounding box's own frame.
    fn preview_transform(
        &self,
        original: ActorTransform,
        offset: Vec3,
        rotation: f32,
        rotation_center: Vec3,
        relative: bool,
    ) -> ActorTransform {
        let offset = if relative {
            rotate_yaw(offset, self.bounds.yaw)
        } else {
            offset
        };
        transform_around_point(original, offset, rotation, rotation_center)
    }

    /// Spawn a full preview copy of the original set. Returns the new copy
    /// id after reference fix-up and preview rendering cues are applied.
    pub fn add_copy(
        &mut self,
        graph: &mut ObjectGraph,
        session: &SaveSession,
        settings: &FactorySettings,
        offset: Vec3,
        rotation: f32,
        rotation_center: Vec3,
        relative: bool,
    ) -> Result<CopyId, CopyError> {
        if self.original.is_empty() {
            return Err(CopyError::NoSelection);
        }
        let copy_id = self.ids.next_id();
        let mut map = CopyMap::default();

        // Sorted order guarantees outers are mapped before the objects they own.
        for &original in &self.original {
            let (class, name, outer, actor_transform) = {
                let Some(obj) = graph.get(original) else {
                    continue;
                };
                (
                    obj.class,
                    obj.name.clone(),
                    obj.outer,
                    obj.actor.as_ref().map(|a| a.transform),
                )
            };

            let copy = if let Some(transform) = actor_transform {
                let placed =
                    self.preview_transform(transform, offset, rotation, rotation_center, relative);
                let copy = graph.spawn_actor(class, &name, placed);
                graph.finish_spawning(copy, true);
                copy
            } else {
                let Some(outer_id) = outer else {
                    error!("copy {}: sub-object {} has no outer", copy_id.0, name);
                    continue;
                };
                let Some(copy_outer) = map.copy_of(outer_id) else {
                    error!(
                        "copy {}: outer of {} was not copied before it",
                        copy_id.0, name
                    );
                    continue;
                };
                match graph.find_child(copy_outer, &name) {
                    Some(existing) => existing,
                    None => graph.create_object(class, &name, copy_outer),
                }
            };
            map.insert(original, copy);
        }

        self.preview.insert(copy_id, map);
        self.fix_references_for_copy(graph, session, copy_id)?;

        // Deferred begin-play, then preview rendering cues: drop out of mesh
        // instancing and show the valid-placement material.
        if let Some(map) = self.preview.get(&copy_id) {
            for &original in &self.original {
                let Some(copy) = map.copy_of(original) else {
                    continue;
                };
                if graph.transform(copy).is_none() {
                    continue;
                }
                graph.begin_play(copy);
                if !graph.is_building(copy) {
                    continue;
                }
                if let Some(actor) = graph.get_mut(copy).and_then(|o| o.actor.as_mut()) {
                    for mesh in &mut actor.meshes {
                        mesh.instanced = false;
                    }
                    if let Some(mesh) = actor.meshes.first_mut() {
                        for material in &mut mesh.materials {
                            *material = settings.valid_placement_material;
                        }
                    }
                }
            }
        }
        info!(
            "copy {}: previewing {} objects",
            copy_id.0,
            self.preview.get(&copy_id).map_or(0, CopyMap::len)
        );
        Ok(copy_id)
    }

    /// Re-place an existing copy without re-spawning. The transform is applied
    /// to each copy actor's current state, so offsets accumulate across calls.
    pub fn move_copy(
        &self,
        graph: &mut ObjectGraph,
        copy_id: CopyId,
        offset: Vec3,
        rotation: f32,
        rotation_center: Vec3,
        relative: bool,
    ) -> Result<(), CopyError> {
        let map = self
            .preview
            .get(&copy_id)
            .ok_or(CopyError::UnknownCopyId(copy_id))?;
        for &original in &self.original {
            let Some(copy) = map.copy_of(original) else {
                continue;
            };
            let Some(current) = graph.transform(copy) else {
                continue;
            };
            let placed =
                self.preview_transform(current, offset, rotation, rotation_center, relative);
            let Some(mobility) = graph.mobility(copy) else {
                continue;
            };
            graph.set_mobility(copy, Mobility::Movable);
            graph.set_transform(copy, placed);
            graph.set_mobility(copy, mobility);
        }
        Ok(())
    }

    /// Destroy a preview copy. Sub-objects go down with their owning actors.
    pub fn remove_copy(&mut self, graph: &mut ObjectGraph, copy_id: CopyId) -> Result<(), CopyError> {
        let map = self
            .preview
            .remove(&copy_id)
            .ok_or(CopyError::UnknownCopyId(copy_id))?;
        for &original in &self.original {
            let Some(copy) = map.copy_of(original) else {
                continue;
            };
            if graph.transform(copy).is_some() {
                graph.destroy(copy);
            }
        }
        info!("copy {}: removed", copy_id.0);
        Ok(())
    }

    /// Remove every outstanding preview copy (the action-cancel path).
    pub fn cancel(&mut self, graph: &mut ObjectGraph) {
        for copy_id in self.copy_ids() {
            let _ = self.remove_copy(graph, copy_id);
        }
    }

    /// Commit every outstanding copy: re-run fix-up to pick up any original
    /// state changed since previewing, restore mesh instancing, and restore
    /// materials from the matching original mesh component. Afterwards the
    /// copies are permanent and no longer tracked; a second call is a no-op.
    pub fn finish(
        &mut self,
        graph: &mut ObjectGraph,
        session: &SaveSession,
    ) -> Result<(), CopyError> {
        for copy_id in self.copy_ids() {
            self.fix_references_for_copy(graph, session, copy_id)?;
            let Some(map) = self.preview.get(&copy_id) else {
                continue;
            };
            for &original in &self.original {
                let Some(copy) = map.copy_of(original) else {
                    continue;
                };
                if !graph.is_building(copy) || graph.transform(copy).is_none() {
                    continue;
                }
                let original_meshes: Vec<MeshProxy> = graph
                    .get(original)
                    .and_then(|o| o.actor.as_ref())
                    .map(|a| a.meshes.clone())
                    .unwrap_or_default();
                let copy_name = graph.get(copy).map(|o| o.name.clone()).unwrap_or_default();
                if let Some(actor) = graph.get_mut(copy).and_then(|o| o.actor.as_mut()) {
                    actor.preview = false;
                    for mesh in &mut actor.meshes {
                        mesh.instanced = true;
                        match original_meshes.iter().find(|m| m.name == mesh.name) {
                            Some(original_mesh) => {
                                mesh.materials = original_mesh.materials.clone();
                            }
                            None => error!(
                                "Mesh component {} of {} does not exist. This shouldn't happen!",
                                mesh.name, copy_name
                            ),
                        }
                    }
                }
            }
        }
        let committed = self.preview.len();
        self.preview.clear();
        if committed > 0 {
            info!("committed {} copies", committed);
        }
        Ok(())
    }

    /// The serialize/remap/deserialize pass keeping one copy's internal
    /// references pointed at the copy instead of the originals.
    fn fix_references_for_copy(
        &self,
        graph: &mut ObjectGraph,
        session: &SaveSession,
        copy_id: CopyId,
    ) -> Result<(), CopyError> {
        let map = self
            .preview
            .get(&copy_id)
            .ok_or(CopyError::UnknownCopyId(copy_id))?;

        for &original in &self.original {
            if let Some(copy) = map.copy_of(original) {
                graph.pre_load_game(copy, session.save_version, session.build_id);
            }
            graph.pre_save_game(original, session.save_version, session.build_id);
        }

        let bytes = snapshot::encode_set(graph, &self.original, map)?;
        let snapshots = snapshot::decode_set(&bytes)?;
        for snap in &snapshots {
            if let Some(copy) = map.copy_of(snap.source) {
                snapshot::apply_snapshot(graph, copy, snap, map)?;
            }
        }

        for &original in &self.original {
            if let Some(copy) = map.copy_of(original) {
                graph.post_load_game(copy, session.save_version, session.build_id);
            }
            graph.post_save_game(original, session.save_version, session.build_id);
        }
        Ok(())
    }
}
