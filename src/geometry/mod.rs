//! Geometry utilities for vortex-sieve.
//!
//! Vector helpers shared by the zero locator, the element reorientation in
//! the in-memory mesh, and the distance measure of the time relator.

pub mod metrics;
