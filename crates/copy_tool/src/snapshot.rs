//! Snapshot codec for the reference fix-up pass.
//!
//! Copies are repaired by serializing every original object's save-relevant
//! fields into one byte buffer and deserializing that buffer into the copy
//! objects. Reference substitution happens through an explicit remap table:
//! in-set world references are rewritten to the corresponding object of the
//! copy being fixed, on the way into the buffer and again on the way out (a
//! reference already naming a copy passes through unchanged).

use bitcode::{Decode, Encode};

use simulation::object_graph::{ClassId, FieldValue, ObjectGraph, ObjectId, ObjectRef};

use crate::error::CopyError;
use crate::manager::CopyMap;

/// Save-relevant state of one object, in field-descriptor order.
#[derive(Debug, Clone, Encode, Decode)]
pub struct ObjectSnapshot {
    /// The original object this snapshot was captured from.
    pub source: ObjectId,
    pub class: ClassId,
    pub fields: Vec<FieldValue>,
}

fn remap_ref(reference: &ObjectRef, remap: &CopyMap) -> ObjectRef {
    match reference {
        ObjectRef::World(id) => match remap.copy_of(*id) {
            Some(copy) => ObjectRef::World(copy),
            None => reference.clone(),
        },
        ObjectRef::Asset(_) => reference.clone(),
    }
}

fn remap_value(value: &FieldValue, remap: &CopyMap) -> FieldValue {
    match value {
        FieldValue::Float(_) | FieldValue::Int(_) => value.clone(),
        FieldValue::Ref(r) => FieldValue::Ref(r.as_ref().map(|r| remap_ref(r, remap))),
        FieldValue::RefArray(refs) => {
            FieldValue::RefArray(refs.iter().map(|r| remap_ref(r, remap)).collect())
        }
        FieldValue::RefSet(refs) => {
            FieldValue::RefSet(refs.iter().map(|r| remap_ref(r, remap)).collect())
        }
        FieldValue::RefMap(entries) => FieldValue::RefMap(
            entries
                .iter()
                .map(|(k, v)| (remap_ref(k, remap), remap_ref(v, remap)))
                .collect(),
        ),
    }
}

/// Capture one object's save-flagged fields, substituting references through
/// the remap.
pub fn capture_snapshot(
    graph: &ObjectGraph,
    id: ObjectId,
    remap: &CopyMap,
) -> Option<ObjectSnapshot> {
    let obj = graph.get(id)?;
    let class = graph.classes.get(obj.class);
    let fields = class
        .fields
        .iter()
        .zip(&obj.fields)
        .filter(|(desc, _)| desc.save)
        .map(|(_, value)| remap_value(value, remap))
        .collect();
    Some(ObjectSnapshot {
        source: id,
        class: obj.class,
        fields,
    })
}

/// Serialize the whole original set into one buffer.
pub fn encode_set(
    graph: &ObjectGraph,
    objects: &[ObjectId],
    remap: &CopyMap,
) -> Result<Vec<u8>, CopyError> {
    let snapshots: Vec<ObjectSnapshot> = objects
        .iter()
        .filter_map(|&id| capture_snapshot(graph, id, remap))
        .collect();
    Ok(bitcode::encode(&snapshots))
}

/// Recover the snapshots from a buffer produced by [`encode_set`].
pub fn decode_set(bytes: &[u8]) -> Result<Vec<ObjectSnapshot>, CopyError> {
    Ok(bitcode::decode(bytes)?)
}

/// Write a snapshot's fields into `copy`, remapping any reference that still
/// names an original.
pub fn apply_snapshot(
    graph: &mut ObjectGraph,
    copy: ObjectId,
    snapshot: &ObjectSnapshot,
    remap: &CopyMap,
) -> Result<(), CopyError> {
    let save_indices: Vec<usize> = {
        let Some(obj) = graph.get(copy) else {
            return Ok(());
        };
        if obj.class != snapshot.class {
            return Err(CopyError::Snapshot(format!(
                "snapshot of {:?} does not match class of {:?}",
                snapshot.source, copy
            )));
        }
        graph
            .classes
            .get(obj.class)
            .fields
            .iter()
            .enumerate()
            .filter(|(_, desc)| desc.save)
            .map(|(i, _)| i)
            .collect()
    };
    if save_indices.len() != snapshot.fields.len() {
        return Err(CopyError::Snapshot(format!(
            "snapshot of {:?} carries {} fields, class expects {}",
            snapshot.source,
            snapshot.fields.len(),
            save_indices.len()
        )));
    }
    if let Some(obj) = graph.get_mut(copy) {
        for (&slot, value) in save_indices.iter().zip(&snapshot.fields) {
            obj.fields[slot] = remap_value(value, remap);
        }
    }
    Ok(())
}
