//! Identity, class, and field-table types for the object graph.
//!
//! Classes are registered once with an explicit field descriptor list
//! (`FieldDescriptor`); each live object holds a `FieldValue` per descriptor.
//! Reference-bearing values distinguish in-world targets from asset targets,
//! which is what lets the validator skip references into content packages.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use std::collections::HashMap;

use super::graph::GameObject;

// =============================================================================
// Identity
// =============================================================================

/// Identity of a live object in the graph. Never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
pub struct ObjectId(pub u32);

/// Index into the class registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct ClassId(pub usize);

/// Handle to a render material. Opaque to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// A reference stored in an object field.
///
/// `World` references name another live object; `Asset` references name
/// immutable content (recipes, mesh assets) and are never subject to the
/// closure check or to copy remapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub enum ObjectRef {
    World(ObjectId),
    Asset(String),
}

// =============================================================================
// Field tables
// =============================================================================

/// Shape of a field, declared once per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Int,
    Ref,
    RefArray,
    RefMap,
    RefSet,
}

/// One entry in a class's field descriptor list.
///
/// `save` marks the field as save-relevant: it participates in closure
/// validation and in the copy snapshot pass.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub save: bool,
}

/// A field's current value. Variants mirror `FieldKind`.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub enum FieldValue {
    Float(f32),
    Int(i64),
    Ref(Option<ObjectRef>),
    RefArray(Vec<ObjectRef>),
    RefMap(Vec<(ObjectRef, ObjectRef)>),
    RefSet(Vec<ObjectRef>),
}

impl FieldValue {
    /// The empty value for a field of the given kind.
    pub fn default_for(kind: FieldKind) -> FieldValue {
        match kind {
            FieldKind::Float => FieldValue::Float(0.0),
            FieldKind::Int => FieldValue::Int(0),
            FieldKind::Ref => FieldValue::Ref(None),
            FieldKind::RefArray => FieldValue::RefArray(Vec::new()),
            FieldKind::RefMap => FieldValue::RefMap(Vec::new()),
            FieldKind::RefSet => FieldValue::RefSet(Vec::new()),
        }
    }

    /// The kind this value satisfies.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Ref(_) => FieldKind::Ref,
            FieldValue::RefArray(_) => FieldKind::RefArray,
            FieldValue::RefMap(_) => FieldKind::RefMap,
            FieldValue::RefSet(_) => FieldKind::RefSet,
        }
    }
}

// =============================================================================
// Classes
// =============================================================================

/// Hook invoked around save/load passes, receiving the save-schema version
/// and engine build identifier so it can apply version-specific migrations.
pub type SaveHook = fn(&mut GameObject, save_version: u32, build_id: u32);

/// Optional save-lifecycle hooks for a class.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveHooks {
    pub pre_save: Option<SaveHook>,
    pub post_save: Option<SaveHook>,
    pub pre_load: Option<SaveHook>,
    pub post_load: Option<SaveHook>,
}

/// A building's collision clearance volume, in actor-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceBox {
    /// Box center relative to the actor location.
    pub offset: Vec3,
    /// Half-size along each local axis.
    pub extents: Vec3,
}

/// Default mesh component layout instantiated for each actor of a class.
#[derive(Debug, Clone)]
pub struct MeshSpec {
    pub name: &'static str,
    pub materials: Vec<MaterialId>,
    /// Local-space bounds center of the mesh.
    pub local_origin: Vec3,
    /// Local-space half-size of the mesh.
    pub local_extents: Vec3,
}

/// A registered object class: type tag, capabilities, and field table.
///
/// Classes without a clearance box are measured through a temporary probe
/// instance when the bounds of a building group are computed.
#[derive(Debug, Clone)]
pub struct ObjectClass {
    pub name: &'static str,
    pub is_building: bool,
    pub clearance: Option<ClearanceBox>,
    pub meshes: Vec<MeshSpec>,
    pub fields: Vec<FieldDescriptor>,
    pub hooks: SaveHooks,
}

impl ObjectClass {
    /// Position of a field in the descriptor list (and in every instance's
    /// value table).
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Registry of all object classes, populated during game setup.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: Vec<ObjectClass>,
    by_name: HashMap<&'static str, ClassId>,
}

impl ClassRegistry {
    /// Register a class, returning its id. Re-registering a name returns the
    /// existing id unchanged.
    pub fn register(&mut self, class: ObjectClass) -> ClassId {
        if let Some(&existing) = self.by_name.get(class.name) {
            warn!(
                "ClassRegistry: duplicate class '{}', keeping first registration",
                class.name
            );
            return existing;
        }
        let id = ClassId(self.classes.len());
        self.by_name.insert(class.name, id);
        self.classes.push(class);
        id
    }

    pub fn get(&self, id: ClassId) -> &ObjectClass {
        &self.classes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
