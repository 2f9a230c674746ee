//! VortexError: Unified error type for vortex-sieve public APIs
//!
//! Every fallible operation in the crate (mesh access, extraction, temporal
//! relation, transition building, point-cloud I/O) reports through this type.
//! An unlocated zero, a trace reaching the mesh boundary, and an ambiguous
//! correspondence are handled in place and never surface here.

use thiserror::Error;

use crate::mesh::ids::ElemId;

/// Unified error type for vortex-sieve operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VortexError {
    /// The mesh provider has no element with this id.
    #[error("Mesh error: element `{0}` is not present in the mesh")]
    MissingElement(ElemId),
    /// A local face index exceeded the element's face count.
    #[error("Mesh error: element `{elem}` has {n_faces} faces, face {face} requested")]
    FaceOutOfRange {
        elem: ElemId,
        face: usize,
        n_faces: usize,
    },
    /// A face with fewer than three vertices, or an element with too many faces.
    #[error("Mesh error: malformed face on element `{elem}`: {reason}")]
    MalformedFace { elem: ElemId, reason: String },
    /// The per-node field arrays do not match the node count.
    #[error("Field error: expected {expected} nodal values, got {found}")]
    FieldLength { expected: usize, found: usize },
    /// Degenerate or inconsistent geometry handed to the mesh builder.
    #[error("Geometry error: {0}")]
    InvalidGeometry(String),
    /// A vortex object id that the transition has never issued.
    #[error("Transition error: unknown vortex object `{0}`")]
    UnknownObject(usize),
    /// A lifecycle event applied to an object in a state that forbids it.
    #[error("Transition error: object `{object}` cannot go from {from} via {event}")]
    IllegalTransition {
        object: usize,
        from: &'static str,
        event: &'static str,
    },
    /// A time relation whose line counts disagree with the lines it is applied to.
    #[error("Transition error: relation expects {expected} lines at step {timestep}, got {found}")]
    RelationMismatch {
        timestep: i32,
        expected: usize,
        found: usize,
    },
    /// A correspondence naming a line index out of range, a line used twice, or
    /// an event kind that does not fit its line counts.
    #[error("Transition error: malformed relation at step {timestep}: {reason}")]
    MalformedRelation { timestep: i32, reason: String },
    /// Steps must be added in strictly increasing order.
    #[error("Transition error: step {found} does not follow step {last}")]
    StepOrder { last: i32, found: i32 },
    /// Raw point-cloud bytes that do not follow the count + xyz layout.
    #[error("Point cloud error: {0}")]
    PointCloudFormat(String),
    /// Underlying filesystem failure, carried as text so the error stays `Clone`.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for VortexError {
    fn from(e: std::io::Error) -> Self {
        VortexError::Io(e.to_string())
    }
}
