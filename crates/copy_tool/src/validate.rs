//! Closure validation over save-relevant reference fields.
//!
//! Every in-world reference reachable from a save-flagged field of a
//! collected object must point back into the collected set; otherwise copying
//! would leave the duplicate wired to the untouched originals. Offenders are
//! reported as their nearest owning building so the player sees which
//! structure to deselect or extend the selection around.

use bevy::prelude::*;
use std::collections::HashSet;

use simulation::object_graph::{FieldValue, ObjectGraph, ObjectId, ObjectRef};

/// True when the reference stays inside the set. Asset references are always
/// fine; they never name live world objects.
fn ref_is_internal(members: &HashSet<ObjectId>, reference: &ObjectRef) -> bool {
    match reference {
        ObjectRef::World(id) => members.contains(id),
        ObjectRef::Asset(_) => true,
    }
}

fn first_external<'a>(
    members: &HashSet<ObjectId>,
    refs: impl IntoIterator<Item = &'a ObjectRef>,
) -> Option<(usize, &'a ObjectRef)> {
    refs.into_iter()
        .enumerate()
        .find(|(_, r)| !ref_is_internal(members, r))
}

/// Check every save-flagged field of one object. Logs and returns false on
/// the first escaping reference.
pub fn validate_object(graph: &ObjectGraph, members: &HashSet<ObjectId>, id: ObjectId) -> bool {
    let Some(obj) = graph.get(id) else {
        return true;
    };
    let class = graph.classes.get(obj.class);

    for (desc, value) in class.fields.iter().zip(&obj.fields) {
        if !desc.save {
            continue;
        }
        let external = match value {
            FieldValue::Float(_) | FieldValue::Int(_) => None,
            FieldValue::Ref(r) => first_external(members, r.iter()),
            FieldValue::RefArray(refs) | FieldValue::RefSet(refs) => {
                first_external(members, refs.iter())
            }
            FieldValue::RefMap(entries) => first_external(
                members,
                entries.iter().flat_map(|(k, v)| [k, v]),
            ),
        };
        if let Some((index, target)) = external {
            error!(
                "{}.{}[{}] references {:?} outside the selection",
                obj.name, desc.name, index, target
            );
            return false;
        }
    }
    true
}

/// Validate the whole collected set. Returns the deduplicated, encounter-
/// ordered list of top-level buildings owning invalid objects; empty means
/// the set is closed.
pub fn validate_objects(graph: &ObjectGraph, original: &[ObjectId]) -> Vec<ObjectId> {
    let members: HashSet<ObjectId> = original.iter().copied().collect();
    let mut issues: Vec<ObjectId> = Vec::new();
    for &id in original {
        if !validate_object(graph, &members, id) {
            if let Some(building) = graph.nearest_building(id) {
                if !issues.contains(&building) {
                    issues.push(building);
                }
            }
        }
    }
    issues
}
