//! Unit tests for the object graph arena and transform math.

use super::*;
use bevy::prelude::*;

fn widget_class() -> ObjectClass {
    ObjectClass {
        name: "Widget",
        is_building: true,
        clearance: None,
        meshes: vec![MeshSpec {
            name: "Mesh",
            materials: vec![MaterialId(7)],
            local_origin: Vec3::new(0.0, 0.0, 1.0),
            local_extents: Vec3::new(1.0, 2.0, 1.0),
        }],
        fields: vec![
            FieldDescriptor {
                name: "count",
                kind: FieldKind::Int,
                save: true,
            },
            FieldDescriptor {
                name: "peer",
                kind: FieldKind::Ref,
                save: true,
            },
        ],
        hooks: SaveHooks::default(),
    }
}

fn part_class() -> ObjectClass {
    ObjectClass {
        name: "Part",
        is_building: false,
        clearance: None,
        meshes: vec![],
        fields: vec![],
        hooks: SaveHooks::default(),
    }
}

#[test]
fn test_spawn_actor_is_deferred_until_finished() {
    let mut graph = ObjectGraph::default();
    let class = graph.register_class(widget_class());
    let id = graph.spawn_actor(class, "W", ActorTransform::IDENTITY);
    let actor = graph.get(id).unwrap().actor.as_ref().unwrap();
    assert!(!actor.begun_play);
    assert!(!actor.collision_enabled);

    graph.finish_spawning(id, false);
    graph.begin_play(id);
    let actor = graph.get(id).unwrap().actor.as_ref().unwrap();
    assert!(actor.begun_play);
    assert!(actor.collision_enabled);
    assert!(!actor.preview);
}

#[test]
fn test_finish_spawning_skip_collision_marks_preview() {
    let mut graph = ObjectGraph::default();
    let class = graph.register_class(widget_class());
    let id = graph.spawn_actor(class, "W", ActorTransform::IDENTITY);
    graph.finish_spawning(id, true);
    let actor = graph.get(id).unwrap().actor.as_ref().unwrap();
    assert!(actor.preview);
    assert!(!actor.collision_enabled);
}

#[test]
fn test_ids_are_never_reused() {
    let mut graph = ObjectGraph::default();
    let class = graph.register_class(widget_class());
    let first = graph.spawn_actor(class, "A", ActorTransform::IDENTITY);
    graph.destroy(first);
    let second = graph.spawn_actor(class, "B", ActorTransform::IDENTITY);
    assert_ne!(first, second);
    assert!(!graph.contains(first));
}

#[test]
fn test_destroy_removes_owned_subtree() {
    let mut graph = ObjectGraph::default();
    let widget = graph.register_class(widget_class());
    let part = graph.register_class(part_class());
    let building = graph.spawn_actor(widget, "W", ActorTransform::IDENTITY);
    let child = graph.create_object(part, "P", building);
    let grandchild = graph.create_object(part, "Q", child);
    graph.destroy(building);
    assert!(!graph.contains(building));
    assert!(!graph.contains(child));
    assert!(!graph.contains(grandchild));
    assert!(graph.is_empty());
}

#[test]
fn test_nearest_building_walks_outer_chain() {
    let mut graph = ObjectGraph::default();
    let widget = graph.register_class(widget_class());
    let part = graph.register_class(part_class());
    let building = graph.spawn_actor(widget, "W", ActorTransform::IDENTITY);
    let child = graph.create_object(part, "P", building);
    let grandchild = graph.create_object(part, "Q", child);
    assert_eq!(graph.nearest_building(grandchild), Some(building));
    assert_eq!(graph.nearest_building(building), Some(building));

    let orphan = graph.create_object(part, "Orphan", building);
    graph.get_mut(orphan).unwrap().outer = None;
    assert_eq!(graph.nearest_building(orphan), None);
}

#[test]
fn test_set_field_rejects_kind_mismatch() {
    let mut graph = ObjectGraph::default();
    let class = graph.register_class(widget_class());
    let id = graph.spawn_actor(class, "W", ActorTransform::IDENTITY);
    assert!(graph.set_field(id, "count", FieldValue::Int(3)));
    assert!(!graph.set_field(id, "count", FieldValue::Float(3.0)));
    assert!(!graph.set_field(id, "missing", FieldValue::Int(1)));
    assert_eq!(graph.field(id, "count"), Some(&FieldValue::Int(3)));
}

#[test]
fn test_set_transform_requires_movable() {
    let mut graph = ObjectGraph::default();
    let class = graph.register_class(widget_class());
    let id = graph.spawn_actor(class, "W", ActorTransform::IDENTITY);
    let moved = ActorTransform::from_location(Vec3::new(1.0, 2.0, 3.0));
    assert!(!graph.set_transform(id, moved));
    graph.set_mobility(id, Mobility::Movable);
    assert!(graph.set_transform(id, moved));
    assert_eq!(graph.transform(id), Some(moved));
}

#[test]
fn test_render_bounds_unions_and_rounds() {
    let mut graph = ObjectGraph::default();
    let class = graph.register_class(widget_class());
    let id = graph.spawn_actor(class, "W", ActorTransform::IDENTITY);
    let (origin, extents) = graph.get(id).unwrap().actor.as_ref().unwrap().render_bounds();
    assert_eq!(origin, Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(extents, Vec3::new(1.0, 2.0, 1.0));
}

#[test]
fn test_rotate_yaw_quarter_turn() {
    let v = rotate_yaw(Vec3::new(1.0, 0.0, 5.0), 90.0);
    assert!((v.x - 0.0).abs() < 1e-5);
    assert!((v.y - 1.0).abs() < 1e-5);
    assert_eq!(v.z, 5.0);

    let back = unrotate_yaw(v, 90.0);
    assert!((back.x - 1.0).abs() < 1e-5);
    assert!(back.y.abs() < 1e-5);
}

#[test]
fn test_transform_around_point_rotates_about_center() {
    let original = ActorTransform::from_location(Vec3::new(2.0, 0.0, 0.0));
    let center = Vec3::new(1.0, 0.0, 0.0);
    let moved = transform_around_point(original, Vec3::new(0.0, 0.0, 4.0), 90.0, center);
    // (2,0,0) rotated 90 degrees about (1,0,0) lands at (1,1,0), then +4 in z.
    assert!((moved.location.x - 1.0).abs() < 1e-5);
    assert!((moved.location.y - 1.0).abs() < 1e-5);
    assert!((moved.location.z - 4.0).abs() < 1e-5);
    assert_eq!(moved.yaw, 90.0);
}

#[test]
fn test_transform_around_point_offset_only() {
    let original = ActorTransform::from_location_yaw(Vec3::new(3.0, 4.0, 0.0), 45.0);
    let moved = transform_around_point(original, Vec3::new(10.0, 0.0, 0.0), 0.0, Vec3::ZERO);
    assert_eq!(moved.location, Vec3::new(13.0, 4.0, 0.0));
    assert_eq!(moved.yaw, 45.0);
    assert_eq!(moved.scale, Vec3::ONE);
}
