//! Copy-tool events, systems, and Bevy plugin registration.
//!
//! The action/UI layer drives the tool entirely through request events and
//! listens for the response events; nothing else touches the copier state.

use bevy::prelude::*;

use simulation::object_graph::{ObjectGraph, ObjectId};
use simulation::{FactorySettings, SaveSession};

use crate::bounds::RotatedBoundingBox;
use crate::collector::{DeclaredDependencies, DependencySource};
use crate::error::CopyError;
use crate::fill::FillTool;
use crate::manager::{BuildingCopier, CopyId};

/// Host-provided dependency-query capability, replaceable by the game.
#[derive(Resource)]
pub struct DependencyProvider(pub Box<dyn DependencySource + Send + Sync>);

impl Default for DependencyProvider {
    fn default() -> Self {
        DependencyProvider(Box::new(DeclaredDependencies))
    }
}

// =============================================================================
// Events
// =============================================================================

/// Event to collect and validate a building selection.
#[derive(Event)]
pub struct SelectBuildingsForCopy {
    pub buildings: Vec<ObjectId>,
}

/// Event fired when a selection was collected, validated, and measured.
#[derive(Event)]
pub struct CopySelectionReady {
    pub bounds: RotatedBoundingBox,
}

/// Event fired when a selection was rejected; carries the buildings holding
/// references outside the selection (empty on other failures).
#[derive(Event)]
pub struct CopySelectionRejected {
    pub buildings: Vec<ObjectId>,
}

/// Event to spawn a new preview copy of the current selection.
#[derive(Event)]
pub struct AddCopyRequest {
    pub offset: Vec3,
    pub rotation: f32,
    pub rotation_center: Vec3,
    pub relative: bool,
}

/// Event fired after a preview copy was spawned.
#[derive(Event)]
pub struct CopyAdded {
    pub copy_id: CopyId,
}

/// Event to re-place an existing preview copy.
#[derive(Event)]
pub struct MoveCopyRequest {
    pub copy_id: CopyId,
    pub offset: Vec3,
    pub rotation: f32,
    pub rotation_center: Vec3,
    pub relative: bool,
}

/// Event to destroy one preview copy.
#[derive(Event)]
pub struct RemoveCopyRequest {
    pub copy_id: CopyId,
}

/// Event to commit every outstanding preview copy.
#[derive(Event)]
pub struct FinishCopies;

/// Event to abandon every outstanding preview copy (action cancelled).
#[derive(Event)]
pub struct CancelCopies;

// =============================================================================
// Systems
// =============================================================================

fn handle_select(
    mut events: EventReader<SelectBuildingsForCopy>,
    mut copier: ResMut<BuildingCopier>,
    mut graph: ResMut<ObjectGraph>,
    deps: Res<DependencyProvider>,
    mut ready: EventWriter<CopySelectionReady>,
    mut rejected: EventWriter<CopySelectionRejected>,
) {
    for ev in events.read() {
        match copier.set_buildings(&mut graph, deps.0.as_ref(), &ev.buildings) {
            Ok(()) => {
                ready.send(CopySelectionReady {
                    bounds: copier.bounds(),
                });
            }
            Err(CopyError::ClosureViolation { buildings }) => {
                warn!(
                    "copy selection rejected: {} building(s) with external references",
                    buildings.len()
                );
                rejected.send(CopySelectionRejected { buildings });
            }
            Err(e) => {
                error!("copy selection failed: {e}");
                rejected.send(CopySelectionRejected {
                    buildings: Vec::new(),
                });
            }
        }
    }
}

fn handle_add_copy(
    mut events: EventReader<AddCopyRequest>,
    mut copier: ResMut<BuildingCopier>,
    mut graph: ResMut<ObjectGraph>,
    session: Res<SaveSession>,
    settings: Res<FactorySettings>,
    mut added: EventWriter<CopyAdded>,
) {
    for ev in events.read() {
        match copier.add_copy(
            &mut graph,
            &session,
            &settings,
            ev.offset,
            ev.rotation,
            ev.rotation_center,
            ev.relative,
        ) {
            Ok(copy_id) => {
                added.send(CopyAdded { copy_id });
            }
            Err(e) => error!("add copy failed: {e}"),
        }
    }
}

fn handle_move_copy(
    mut events: EventReader<MoveCopyRequest>,
    copier: Res<BuildingCopier>,
    mut graph: ResMut<ObjectGraph>,
) {
    for ev in events.read() {
        if let Err(e) = copier.move_copy(
            &mut graph,
            ev.copy_id,
            ev.offset,
            ev.rotation,
            ev.rotation_center,
            ev.relative,
        ) {
            warn!("move copy failed: {e}");
        }
    }
}

fn handle_remove_copy(
    mut events: EventReader<RemoveCopyRequest>,
    mut copier: ResMut<BuildingCopier>,
    mut graph: ResMut<ObjectGraph>,
) {
    for ev in events.read() {
        if let Err(e) = copier.remove_copy(&mut graph, ev.copy_id) {
            warn!("remove copy failed: {e}");
        }
    }
}

fn handle_finish(
    mut events: EventReader<FinishCopies>,
    mut copier: ResMut<BuildingCopier>,
    mut graph: ResMut<ObjectGraph>,
    session: Res<SaveSession>,
    mut fill: ResMut<FillTool>,
) {
    for _ in events.read() {
        if let Err(e) = fill.finish(&mut graph, &session, &mut copier) {
            error!("finish copies failed: {e}");
        }
    }
}

fn handle_cancel(
    mut events: EventReader<CancelCopies>,
    mut copier: ResMut<BuildingCopier>,
    mut graph: ResMut<ObjectGraph>,
    mut fill: ResMut<FillTool>,
) {
    for _ in events.read() {
        fill.cancel(&mut graph, &mut copier);
        copier.cancel(&mut graph);
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct CopyToolPlugin;

impl Plugin for CopyToolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObjectGraph>()
            .init_resource::<SaveSession>()
            .init_resource::<FactorySettings>()
            .init_resource::<BuildingCopier>()
            .init_resource::<FillTool>()
            .init_resource::<DependencyProvider>()
            .add_event::<SelectBuildingsForCopy>()
            .add_event::<CopySelectionReady>()
            .add_event::<CopySelectionRejected>()
            .add_event::<AddCopyRequest>()
            .add_event::<CopyAdded>()
            .add_event::<MoveCopyRequest>()
            .add_event::<RemoveCopyRequest>()
            .add_event::<FinishCopies>()
            .add_event::<CancelCopies>()
            .add_systems(
                Update,
                (
                    handle_select,
                    handle_add_copy,
                    handle_move_copy,
                    handle_remove_copy,
                    handle_finish,
                    handle_cancel,
                ),
            );
    }
}
