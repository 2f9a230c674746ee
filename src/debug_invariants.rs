//! Invariant checks for the per-step and cross-step records.
//!
//! Extraction and transition building call `debug_assert_invariants` on what
//! they produce; the checks compile away in release builds unless the
//! `check-invariants` or `strict-invariants` feature is enabled.

use crate::vortex_error::VortexError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), VortexError>;

    /// Validate and hand the value back, for use at the end of a builder chain.
    fn validated(self) -> Result<Self, VortexError>
    where
        Self: Sized,
    {
        self.validate_invariants()?;
        Ok(self)
    }
}

/// Run a fallible check and panic on error when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
