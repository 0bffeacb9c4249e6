/// Buildings snap to this rotation step when placed; the dominant-rotation
/// histogram reduces building yaws modulo this angle.
pub const YAW_ALIGN_DEG: f32 = 90.0;

/// Current save-schema version stamped into save/load hook invocations.
pub const SAVE_VERSION: u32 = 46;

/// Engine build changelist stamped into save/load hook invocations.
pub const BUILD_ID: u32 = 211_839;

/// Material handle swapped onto preview meshes while a copy is previewing.
pub const VALID_PLACEMENT_MATERIAL: u32 = 900;
