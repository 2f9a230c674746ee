#![cfg_attr(docsrs, feature(doc_cfg))]
//! # vortex-sieve
//!
//! vortex-sieve finds and tracks topological phase singularities ("vortices")
//! of a two-component order parameter `(u, v)` sampled at the nodes of an
//! unstructured finite-element mesh.
//!
//! ## Pipeline
//! - Per step, every element side gets a winding number from the wrapped
//!   phase differences around its boundary (optionally gauge corrected).
//!   Sides with `|winding| > 0.5` are *punctured*; the zero of the
//!   interpolated field is located inside them.
//! - Punctured sides of neighboring elements are joined into filaments
//!   ([`trace::VortexLine`]) by walking the side adjacency.
//! - Filaments of consecutive steps are related by proximity and folded into
//!   persistent objects with birth, death, continuation, split, merge, and
//!   recombination events.
//!
//! The mesh itself stays behind the [`mesh::FieldMesh`] and
//! [`mesh::FaceAdjacency`] traits; [`mesh::InMemoryMesh`] and
//! [`mesh::meshgen`] are provided for tests and small drivers.
//!
//! ## Determinism
//!
//! Every per-step structure iterates in ascending element order, so two runs
//! on the same input produce identical indices, point clouds, and lines. The
//! `rayon` feature parallelizes extraction and the temporal candidate search
//! without changing any result.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! vortex-sieve = "0.3"
//! # Optional features:
//! # features = ["rayon", "check-invariants"]
//! ```

pub mod config;
pub mod debug_invariants;
pub mod extract;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod trace;
pub mod vortex_error;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::config::{ExtractorConfig, RelateConfig};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::extract::{PuncturedElem, PuncturedIndex, StepExtraction, VortexExtractor};
    pub use crate::io::PointCloud;
    pub use crate::mesh::ids::{ElemId, FaceKey};
    pub use crate::mesh::meshgen::{StructuredCellType, structured_box_3d};
    pub use crate::mesh::{ElemKind, FaceAdjacency, FieldMesh, InMemoryMesh};
    pub use crate::trace::{
        EventKind, SpaceTracer, TimeRelation, VortexLine, VortexObject, VortexState,
        VortexTransition, relate, trace_over_space,
    };
    pub use crate::vortex_error::VortexError;
}
