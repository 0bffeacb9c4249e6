//! `ObjectGraph` arena: object storage, spawning, ownership, and hooks.

use bevy::prelude::*;
use std::collections::BTreeMap;

use super::transform::ActorTransform;
use super::types::{
    ClassId, ClassRegistry, FieldValue, MaterialId, ObjectClass, ObjectId, SaveHook,
};

// =============================================================================
// Objects
// =============================================================================

/// Whether an actor's root component may be moved after spawning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mobility {
    Static,
    Movable,
}

/// An instanced factory mesh component on a spawned actor.
#[derive(Debug, Clone)]
pub struct MeshProxy {
    pub name: String,
    /// Whether the mesh renders through the shared instance manager. Preview
    /// copies drop out of instancing so their materials can be overridden.
    pub instanced: bool,
    pub materials: Vec<MaterialId>,
    pub local_origin: Vec3,
    pub local_extents: Vec3,
}

/// Actor-side state for objects placed in the world.
#[derive(Debug, Clone)]
pub struct ActorState {
    pub transform: ActorTransform,
    pub mobility: Mobility,
    /// Deferred-construction spawns stay false until `begin_play`.
    pub begun_play: bool,
    /// True for preview spawns finished with physical interaction skipped.
    pub preview: bool,
    pub collision_enabled: bool,
    pub meshes: Vec<MeshProxy>,
}

impl ActorState {
    /// Default render bounds: union of the mesh-proxy local bounds, returned
    /// as (origin, extents) with extents rounded to whole units.
    pub fn render_bounds(&self) -> (Vec3, Vec3) {
        if self.meshes.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for mesh in &self.meshes {
            min = min.min(mesh.local_origin - mesh.local_extents);
            max = max.max(mesh.local_origin + mesh.local_extents);
        }
        let origin = (min + max) / 2.0;
        let extents = ((max - min) / 2.0).round();
        (origin, extents)
    }
}

/// A node in the live object graph.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub id: ObjectId,
    pub name: String,
    pub class: ClassId,
    /// Owning object; `None` for actors placed directly in the world.
    pub outer: Option<ObjectId>,
    /// Values parallel to the class's field descriptor list.
    pub fields: Vec<FieldValue>,
    /// Objects that must exist before this one, as declared by game code.
    /// Backs the default dependency-gathering capability.
    pub dependencies: Vec<ObjectId>,
    /// Present iff the object is an actor (has a world transform).
    pub actor: Option<ActorState>,
}

// =============================================================================
// Graph
// =============================================================================

/// Arena owning every live object plus the class registry.
///
/// Object ids are allocated monotonically and never reused, so a stale id
/// simply fails to resolve instead of aliasing a newer object.
#[derive(Resource, Debug, Default)]
pub struct ObjectGraph {
    pub classes: ClassRegistry,
    objects: BTreeMap<ObjectId, GameObject>,
    next_id: u32,
}

impl ObjectGraph {
    pub fn register_class(&mut self, class: ObjectClass) -> ClassId {
        self.classes.register(class)
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All live object ids in creation order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn class_of(&self, id: ObjectId) -> Option<&ObjectClass> {
        let obj = self.objects.get(&id)?;
        Some(self.classes.get(obj.class))
    }

    pub fn is_building(&self, id: ObjectId) -> bool {
        self.class_of(id).is_some_and(|c| c.is_building)
    }

    fn alloc(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn default_fields(&self, class: ClassId) -> Vec<FieldValue> {
        self.classes
            .get(class)
            .fields
            .iter()
            .map(|f| FieldValue::default_for(f.kind))
            .collect()
    }

    fn default_meshes(&self, class: ClassId) -> Vec<MeshProxy> {
        self.classes
            .get(class)
            .meshes
            .iter()
            .map(|spec| MeshProxy {
                name: spec.name.to_string(),
                instanced: true,
                materials: spec.materials.clone(),
                local_origin: spec.local_origin,
                local_extents: spec.local_extents,
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Spawning / lifecycle
    // -------------------------------------------------------------------------

    /// Deferred-construction actor spawn. The actor exists with its transform
    /// and default state, but collision is off and begin-play has not run
    /// until `finish_spawning` / `begin_play`.
    pub fn spawn_actor(&mut self, class: ClassId, name: &str, transform: ActorTransform) -> ObjectId {
        let id = self.alloc();
        let fields = self.default_fields(class);
        let meshes = self.default_meshes(class);
        self.objects.insert(
            id,
            GameObject {
                id,
                name: name.to_string(),
                class,
                outer: None,
                fields,
                dependencies: Vec::new(),
                actor: Some(ActorState {
                    transform,
                    mobility: Mobility::Static,
                    begun_play: false,
                    preview: false,
                    collision_enabled: false,
                    meshes,
                }),
            },
        );
        id
    }

    /// Complete a deferred spawn. `skip_collision` marks the actor as a
    /// non-interacting preview.
    pub fn finish_spawning(&mut self, id: ObjectId, skip_collision: bool) {
        if let Some(actor) = self.objects.get_mut(&id).and_then(|o| o.actor.as_mut()) {
            actor.collision_enabled = !skip_collision;
            actor.preview = skip_collision;
        }
    }

    /// Run deferred begin-play on an actor.
    pub fn begin_play(&mut self, id: ObjectId) {
        if let Some(actor) = self.objects.get_mut(&id).and_then(|o| o.actor.as_mut()) {
            actor.begun_play = true;
        }
    }

    /// Create a non-actor sub-object owned by `outer`.
    pub fn create_object(&mut self, class: ClassId, name: &str, outer: ObjectId) -> ObjectId {
        let id = self.alloc();
        let fields = self.default_fields(class);
        self.objects.insert(
            id,
            GameObject {
                id,
                name: name.to_string(),
                class,
                outer: Some(outer),
                fields,
                dependencies: Vec::new(),
                actor: None,
            },
        );
        id
    }

    /// Destroy an object and everything it transitively owns.
    pub fn destroy(&mut self, id: ObjectId) {
        for child in self.children(id) {
            self.destroy(child);
        }
        self.objects.remove(&id);
    }

    // -------------------------------------------------------------------------
    // Ownership
    // -------------------------------------------------------------------------

    /// Direct sub-objects of `id`, in creation order.
    pub fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.outer == Some(id))
            .map(|o| o.id)
            .collect()
    }

    /// Find a direct sub-object of `outer` by name.
    pub fn find_child(&self, outer: ObjectId, name: &str) -> Option<ObjectId> {
        self.objects
            .values()
            .find(|o| o.outer == Some(outer) && o.name == name)
            .map(|o| o.id)
    }

    /// Walk the ownership chain (starting at `id` itself) to the nearest
    /// object whose class is a building.
    pub fn nearest_building(&self, id: ObjectId) -> Option<ObjectId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let obj = self.objects.get(&cur)?;
            if self.classes.get(obj.class).is_building {
                return Some(cur);
            }
            current = obj.outer;
        }
        None
    }

    // -------------------------------------------------------------------------
    // Fields & dependencies
    // -------------------------------------------------------------------------

    pub fn field(&self, id: ObjectId, name: &str) -> Option<&FieldValue> {
        let obj = self.objects.get(&id)?;
        let idx = self.classes.get(obj.class).field_index(name)?;
        obj.fields.get(idx)
    }

    /// Set a field by name. Rejects unknown names and kind mismatches.
    pub fn set_field(&mut self, id: ObjectId, name: &str, value: FieldValue) -> bool {
        let Some(obj) = self.objects.get(&id) else {
            return false;
        };
        let class = self.classes.get(obj.class);
        let Some(idx) = class.field_index(name) else {
            warn!("{}: no field '{}' on class {}", obj.name, name, class.name);
            return false;
        };
        if class.fields[idx].kind != value.kind() {
            warn!("{}: field '{}' kind mismatch", obj.name, name);
            return false;
        }
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.fields[idx] = value;
        }
        true
    }

    /// Declare that `dep` must exist before `id`.
    pub fn add_dependency(&mut self, id: ObjectId, dep: ObjectId) {
        if let Some(obj) = self.objects.get_mut(&id) {
            if !obj.dependencies.contains(&dep) {
                obj.dependencies.push(dep);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Actor state
    // -------------------------------------------------------------------------

    pub fn transform(&self, id: ObjectId) -> Option<ActorTransform> {
        self.objects
            .get(&id)
            .and_then(|o| o.actor.as_ref())
            .map(|a| a.transform)
    }

    /// Move an actor in place. Fails (with a warning) unless the root
    /// component is currently movable.
    pub fn set_transform(&mut self, id: ObjectId, transform: ActorTransform) -> bool {
        let Some(actor) = self.objects.get_mut(&id).and_then(|o| o.actor.as_mut()) else {
            return false;
        };
        if actor.mobility != Mobility::Movable {
            warn!("set_transform on a static actor {:?} ignored", id);
            return false;
        }
        actor.transform = transform;
        true
    }

    pub fn mobility(&self, id: ObjectId) -> Option<Mobility> {
        self.objects
            .get(&id)
            .and_then(|o| o.actor.as_ref())
            .map(|a| a.mobility)
    }

    pub fn set_mobility(&mut self, id: ObjectId, mobility: Mobility) {
        if let Some(actor) = self.objects.get_mut(&id).and_then(|o| o.actor.as_mut()) {
            actor.mobility = mobility;
        }
    }

    // -------------------------------------------------------------------------
    // Save lifecycle hooks
    // -------------------------------------------------------------------------

    fn run_hook(&mut self, id: ObjectId, pick: fn(&super::types::SaveHooks) -> Option<SaveHook>, save_version: u32, build_id: u32) {
        let Some(obj) = self.objects.get(&id) else {
            return;
        };
        let Some(hook) = pick(&self.classes.get(obj.class).hooks) else {
            return;
        };
        if let Some(obj) = self.objects.get_mut(&id) {
            hook(obj, save_version, build_id);
        }
    }

    pub fn pre_save_game(&mut self, id: ObjectId, save_version: u32, build_id: u32) {
        self.run_hook(id, |h| h.pre_save, save_version, build_id);
    }

    pub fn post_save_game(&mut self, id: ObjectId, save_version: u32, build_id: u32) {
        self.run_hook(id, |h| h.post_save, save_version, build_id);
    }

    pub fn pre_load_game(&mut self, id: ObjectId, save_version: u32, build_id: u32) {
        self.run_hook(id, |h| h.pre_load, save_version, build_id);
    }

    pub fn post_load_game(&mut self, id: ObjectId, save_version: u32, build_id: u32) {
        self.run_hook(id, |h| h.post_load, save_version, build_id);
    }
}
