//! Filaments in space and identities in time.
//!
//! [`space`] joins the punctured sides of one step into [`VortexLine`]s,
//! [`time`] relates the lines of two consecutive steps, and [`transition`]
//! folds those relations into persistent vortex objects.

pub mod line;
pub mod space;
pub mod time;
pub mod transition;

pub use line::VortexLine;
pub use space::{SpaceTracer, trace_over_space};
pub use time::{EventKind, TimeRelation, relate};
pub use transition::{VortexObject, VortexState, VortexTransition};
