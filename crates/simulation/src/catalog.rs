//! Standard factory building classes and spawn helpers.
//!
//! These are the concrete classes the copy tool is exercised against: a
//! smelter (clearance box, connection + inventory sub-objects), a conveyor
//! belt (no clearance, so bounds come from a probe spawn) that references
//! connection components on other buildings, and a power pole whose
//! connection keeps a set of wired peers.

use bevy::prelude::*;

use crate::object_graph::{
    ActorTransform, ClassId, ClearanceBox, FieldDescriptor, FieldKind, FieldValue, MaterialId,
    MeshSpec, ObjectClass, ObjectGraph, ObjectId, ObjectRef, SaveHooks,
};

/// Class ids for the standard factory content.
#[derive(Debug, Clone, Copy)]
pub struct StandardClasses {
    pub smelter: ClassId,
    pub conveyor_belt: ClassId,
    pub conveyor_connection: ClassId,
    pub inventory: ClassId,
    pub power_pole: ClassId,
    pub power_connection: ClassId,
}

pub fn register_standard_classes(graph: &mut ObjectGraph) -> StandardClasses {
    let conveyor_connection = graph.register_class(ObjectClass {
        name: "ConveyorConnection",
        is_building: false,
        clearance: None,
        meshes: vec![],
        fields: vec![
            FieldDescriptor {
                name: "connected_to",
                kind: FieldKind::Ref,
                save: true,
            },
            FieldDescriptor {
                name: "direction",
                kind: FieldKind::Int,
                save: true,
            },
        ],
        hooks: SaveHooks::default(),
    });

    let inventory = graph.register_class(ObjectClass {
        name: "InventoryComponent",
        is_building: false,
        clearance: None,
        meshes: vec![],
        fields: vec![
            FieldDescriptor {
                name: "stacks",
                kind: FieldKind::Int,
                save: true,
            },
            // UI-only cache; deliberately not save-relevant.
            FieldDescriptor {
                name: "display_cache",
                kind: FieldKind::Ref,
                save: false,
            },
        ],
        hooks: SaveHooks::default(),
    });

    let smelter = graph.register_class(ObjectClass {
        name: "Smelter",
        is_building: true,
        clearance: Some(ClearanceBox {
            offset: Vec3::new(0.0, 0.0, 1.0),
            extents: Vec3::new(2.0, 3.0, 1.0),
        }),
        meshes: vec![MeshSpec {
            name: "Body",
            materials: vec![MaterialId(1), MaterialId(2)],
            local_origin: Vec3::new(0.0, 0.0, 1.0),
            local_extents: Vec3::new(2.0, 3.0, 1.0),
        }],
        fields: vec![
            FieldDescriptor {
                name: "recipe",
                kind: FieldKind::Ref,
                save: true,
            },
            FieldDescriptor {
                name: "progress",
                kind: FieldKind::Float,
                save: true,
            },
            FieldDescriptor {
                name: "paused",
                kind: FieldKind::Int,
                save: true,
            },
            FieldDescriptor {
                name: "port_assignments",
                kind: FieldKind::RefMap,
                save: true,
            },
        ],
        hooks: SaveHooks::default(),
    });

    let conveyor_belt = graph.register_class(ObjectClass {
        name: "ConveyorBelt",
        is_building: true,
        clearance: None,
        meshes: vec![MeshSpec {
            name: "Belt",
            materials: vec![MaterialId(3)],
            local_origin: Vec3::new(0.0, 0.0, 0.5),
            local_extents: Vec3::new(4.0, 1.0, 0.5),
        }],
        fields: vec![
            FieldDescriptor {
                name: "source",
                kind: FieldKind::Ref,
                save: true,
            },
            FieldDescriptor {
                name: "target",
                kind: FieldKind::Ref,
                save: true,
            },
            FieldDescriptor {
                name: "length",
                kind: FieldKind::Float,
                save: true,
            },
        ],
        hooks: SaveHooks::default(),
    });

    let power_connection = graph.register_class(ObjectClass {
        name: "PowerConnection",
        is_building: false,
        clearance: None,
        meshes: vec![],
        fields: vec![FieldDescriptor {
            name: "wired_to",
            kind: FieldKind::RefSet,
            save: true,
        }],
        hooks: SaveHooks::default(),
    });

    let power_pole = graph.register_class(ObjectClass {
        name: "PowerPole",
        is_building: true,
        clearance: Some(ClearanceBox {
            offset: Vec3::new(0.0, 0.0, 3.5),
            extents: Vec3::new(0.5, 0.5, 3.5),
        }),
        meshes: vec![MeshSpec {
            name: "Pole",
            materials: vec![MaterialId(4)],
            local_origin: Vec3::new(0.0, 0.0, 3.5),
            local_extents: Vec3::new(0.5, 0.5, 3.5),
        }],
        fields: vec![FieldDescriptor {
            name: "circuit_id",
            kind: FieldKind::Int,
            save: true,
        }],
        hooks: SaveHooks::default(),
    });

    StandardClasses {
        smelter,
        conveyor_belt,
        conveyor_connection,
        inventory,
        power_pole,
        power_connection,
    }
}

// =============================================================================
// Spawn helpers
// =============================================================================

/// A spawned smelter and its sub-objects.
#[derive(Debug, Clone, Copy)]
pub struct SmelterParts {
    pub building: ObjectId,
    pub input: ObjectId,
    pub output: ObjectId,
    pub inventory: ObjectId,
}

pub fn spawn_smelter(
    graph: &mut ObjectGraph,
    classes: &StandardClasses,
    name: &str,
    transform: ActorTransform,
) -> SmelterParts {
    let building = graph.spawn_actor(classes.smelter, name, transform);
    graph.finish_spawning(building, false);
    graph.begin_play(building);
    let input = graph.create_object(classes.conveyor_connection, "InputConnection", building);
    let output = graph.create_object(classes.conveyor_connection, "OutputConnection", building);
    let inventory = graph.create_object(classes.inventory, "Inventory", building);
    SmelterParts {
        building,
        input,
        output,
        inventory,
    }
}

/// Spawn a conveyor belt joining two connection components. The belt declares
/// both connections as dependencies, and each connection points back at the
/// belt through its save-relevant `connected_to` field.
pub fn spawn_conveyor_between(
    graph: &mut ObjectGraph,
    classes: &StandardClasses,
    name: &str,
    transform: ActorTransform,
    source: ObjectId,
    target: ObjectId,
) -> ObjectId {
    let belt = graph.spawn_actor(classes.conveyor_belt, name, transform);
    graph.finish_spawning(belt, false);
    graph.begin_play(belt);
    graph.set_field(belt, "source", FieldValue::Ref(Some(ObjectRef::World(source))));
    graph.set_field(belt, "target", FieldValue::Ref(Some(ObjectRef::World(target))));
    graph.add_dependency(belt, source);
    graph.add_dependency(belt, target);
    graph.set_field(
        source,
        "connected_to",
        FieldValue::Ref(Some(ObjectRef::World(belt))),
    );
    graph.set_field(
        target,
        "connected_to",
        FieldValue::Ref(Some(ObjectRef::World(belt))),
    );
    belt
}

/// A spawned power pole and its connection component.
#[derive(Debug, Clone, Copy)]
pub struct PowerPoleParts {
    pub building: ObjectId,
    pub connection: ObjectId,
}

pub fn spawn_power_pole(
    graph: &mut ObjectGraph,
    classes: &StandardClasses,
    name: &str,
    transform: ActorTransform,
) -> PowerPoleParts {
    let building = graph.spawn_actor(classes.power_pole, name, transform);
    graph.finish_spawning(building, false);
    graph.begin_play(building);
    let connection = graph.create_object(classes.power_connection, "PowerConnection", building);
    PowerPoleParts {
        building,
        connection,
    }
}

/// Wire two power connections together (both directions).
pub fn wire_connections(graph: &mut ObjectGraph, a: ObjectId, b: ObjectId) {
    push_set_ref(graph, a, "wired_to", b);
    push_set_ref(graph, b, "wired_to", a);
}

fn push_set_ref(graph: &mut ObjectGraph, object: ObjectId, field: &str, target: ObjectId) {
    if let Some(FieldValue::RefSet(mut set)) = graph.field(object, field).cloned() {
        let entry = ObjectRef::World(target);
        if !set.contains(&entry) {
            set.push(entry);
        }
        graph.set_field(object, field, FieldValue::RefSet(set));
    }
}
