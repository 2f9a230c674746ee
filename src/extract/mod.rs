//! Per-step puncture extraction.
//!
//! Winding numbers on every element side ([`puncture`], with the phase
//! helpers in [`phase`]), sub-face location of the zero ([`zero`]), the
//! per-element record ([`punctured_elem`]) and its per-step index ([`index`]),
//! and the pass that ties them together over a mesh ([`extractor`]).

pub mod extractor;
pub mod index;
pub mod phase;
pub mod puncture;
pub mod punctured_elem;
pub mod zero;

pub use extractor::{StepExtraction, VortexExtractor};
pub use index::PuncturedIndex;
pub use punctured_elem::PuncturedElem;
