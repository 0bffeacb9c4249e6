// ---------------------------------------------------------------------------
// CopyError: typed errors for the copy tool
// ---------------------------------------------------------------------------

use std::fmt;

use simulation::object_graph::ObjectId;

use crate::manager::CopyId;

/// Errors surfaced by the copy tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    /// The dependency graph over the collected objects contains a cycle;
    /// `object` is a member of it.
    CyclicDependency { object: ObjectId },
    /// A save-relevant reference escapes the collected set. Carries the
    /// top-level buildings owning the offending references.
    ClosureViolation { buildings: Vec<ObjectId> },
    /// The copy id does not name an outstanding preview copy.
    UnknownCopyId(CopyId),
    /// No buildings were selected (or no selection has been made yet).
    NoSelection,
    /// The snapshot byte buffer failed to decode.
    Snapshot(String),
}

impl fmt::Display for CopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyError::CyclicDependency { object } => {
                write!(f, "dependency cycle involving object {}", object.0)
            }
            CopyError::ClosureViolation { buildings } => write!(
                f,
                "{} building(s) hold references outside the selection",
                buildings.len()
            ),
            CopyError::UnknownCopyId(id) => write!(f, "unknown copy id {}", id.0),
            CopyError::NoSelection => write!(f, "no buildings selected"),
            CopyError::Snapshot(msg) => write!(f, "snapshot error: {msg}"),
        }
    }
}

impl std::error::Error for CopyError {}

impl From<bitcode::Error> for CopyError {
    fn from(e: bitcode::Error) -> Self {
        CopyError::Snapshot(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_error_display() {
        let err = CopyError::CyclicDependency {
            object: ObjectId(9),
        };
        assert!(format!("{err}").contains("cycle"));

        let err = CopyError::ClosureViolation {
            buildings: vec![ObjectId(1), ObjectId(2)],
        };
        assert!(format!("{err}").contains("2 building(s)"));

        let err = CopyError::UnknownCopyId(CopyId(4));
        assert!(format!("{err}").contains('4'));
    }

    #[test]
    fn test_copy_error_is_error_trait() {
        let err = CopyError::NoSelection;
        let _: &dyn std::error::Error = &err;
        assert!(std::error::Error::source(&err).is_none());
    }
}
