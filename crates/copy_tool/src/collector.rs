//! Dependency collection and topological ordering of the selected set.
//!
//! Starting from the selected buildings, the collector walks (a) ownership,
//! meaning the outer chain upward and owned sub-objects downward, and (b) a
//! host-provided dependency-gathering capability, producing the transitive
//! closure as a deduplicated list. The closure is then ordered so that every
//! object's outer and every declared dependency precede it.

use bevy::prelude::*;
use pathfinding::directed::topological_sort::topological_sort;
use std::collections::{HashMap, HashSet, VecDeque};

use simulation::object_graph::{ObjectGraph, ObjectId};

use crate::error::CopyError;

/// Host-provided capability answering "which objects must exist before this
/// one". The default implementation reads each object's declared list.
pub trait DependencySource {
    fn gather_dependencies(&self, graph: &ObjectGraph, object: ObjectId) -> Vec<ObjectId>;
}

/// Default dependency source backed by `GameObject::dependencies`.
pub struct DeclaredDependencies;

impl DependencySource for DeclaredDependencies {
    fn gather_dependencies(&self, graph: &ObjectGraph, object: ObjectId) -> Vec<ObjectId> {
        graph
            .get(object)
            .map(|o| o.dependencies.clone())
            .unwrap_or_default()
    }
}

/// Collect the transitive closure of the selection under ownership and
/// dependency edges. Duplicates and dead ids are dropped; output order is
/// deterministic for a fixed input ordering.
pub fn collect_objects(
    graph: &ObjectGraph,
    buildings: &[ObjectId],
    deps: &dyn DependencySource,
) -> Vec<ObjectId> {
    let mut seen: HashSet<ObjectId> = HashSet::new();
    let mut out: Vec<ObjectId> = Vec::new();
    let mut worklist: VecDeque<ObjectId> = VecDeque::new();

    let push = |id: ObjectId,
                    seen: &mut HashSet<ObjectId>,
                    out: &mut Vec<ObjectId>,
                    worklist: &mut VecDeque<ObjectId>| {
        if graph.contains(id) && seen.insert(id) {
            out.push(id);
            worklist.push_back(id);
        }
    };

    for &building in buildings {
        push(building, &mut seen, &mut out, &mut worklist);
    }

    while let Some(id) = worklist.pop_front() {
        let Some(obj) = graph.get(id) else {
            continue;
        };
        if let Some(outer) = obj.outer {
            push(outer, &mut seen, &mut out, &mut worklist);
        }
        for child in graph.children(id) {
            push(child, &mut seen, &mut out, &mut worklist);
        }
        for dep in deps.gather_dependencies(graph, id) {
            if graph.contains(dep) {
                if let (Some(d), Some(o)) = (graph.get(dep), graph.get(id)) {
                    warn!("{} is a dependency of {}", d.name, o.name);
                }
            }
            push(dep, &mut seen, &mut out, &mut worklist);
        }
    }

    out
}

/// Topologically sort a collected set so that outers and dependencies precede
/// the objects that need them.
///
/// Edges whose endpoints are not both members of the set are skipped, so
/// references leaking outside the collection (e.g. from cross-save state)
/// can never drag foreign objects into the ordering.
pub fn sorted_object_set(
    graph: &ObjectGraph,
    objects: &[ObjectId],
    deps: &dyn DependencySource,
) -> Result<Vec<ObjectId>, CopyError> {
    let members: HashSet<ObjectId> = objects.iter().copied().collect();
    let mut edges: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();

    let mut safe_add_edge = |from: ObjectId, to: ObjectId| {
        if members.contains(&from) && members.contains(&to) {
            edges.entry(from).or_default().push(to);
        }
    };

    for &id in objects {
        let Some(obj) = graph.get(id) else {
            continue;
        };
        if let Some(outer) = obj.outer {
            safe_add_edge(outer, id);
        }
        for dep in deps.gather_dependencies(graph, id) {
            safe_add_edge(dep, id);
        }
    }

    topological_sort(objects, |id| {
        edges.get(id).cloned().unwrap_or_default()
    })
    .map_err(|object| CopyError::CyclicDependency { object })
}
