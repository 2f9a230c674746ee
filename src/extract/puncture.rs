//! Puncture detection: winding number of the phase around one face.
//!
//! The phase `φ = atan2(v, u)` is walked around the face boundary. Each edge
//! difference (optionally gauge corrected) is wrapped into `[-π, π)`, the
//! wrapped differences and the reserved flux term are summed, and the total is
//! divided by `2π`. A face is punctured when that criterion exceeds `0.5` in
//! magnitude; its chirality is the nearest integer winding number.

use std::f64::consts::TAU;

use crate::config::ExtractorConfig;
use crate::extract::phase::{gauge_transformation, wrap_phase};
use crate::mesh::{FaceSamples, FieldSample};

/// Phase bookkeeping of one face boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Winding {
    /// Raw vertex phases.
    pub phases: Vec<f64>,
    /// Wrapped (and gauge corrected) difference of edge `i → i+1`.
    pub wrapped: Vec<f64>,
    /// Total phase shift divided by `2π`.
    pub criterion: f64,
}

/// A punctured face.
#[derive(Clone, Debug, PartialEq)]
pub struct Puncture {
    pub chirality: i32,
    pub criterion: f64,
    /// Samples for zero location; gauge consistent when correction is on.
    pub samples: FaceSamples,
}

/// Compute the wrapped edge differences and the winding criterion of a face.
pub fn winding(face: &FaceSamples, cfg: &ExtractorConfig) -> Winding {
    let verts = face.vertices();
    let n = verts.len();
    let phases: Vec<f64> = verts.iter().map(FieldSample::phase).collect();
    let wrapped: Vec<f64> = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            let mut delta = phases[j] - phases[i];
            if cfg.gauge {
                delta -= gauge_transformation(
                    verts[i].pos,
                    verts[j].pos,
                    cfg.kex,
                    cfg.magnetic_field,
                );
            }
            wrap_phase(delta)
        })
        .collect();
    let phase_shift = wrapped.iter().sum::<f64>() + cfg.flux;
    Winding {
        phases,
        wrapped,
        criterion: phase_shift / TAU,
    }
}

/// Map a winding criterion to a chirality.
///
/// `|criterion| <= 0.5` is not a puncture, so an exact half turn stays
/// unpunctured; anything larger rounds half away from zero. A NaN criterion
/// (non-finite field values) is never a puncture.
#[inline]
pub fn classify_criterion(criterion: f64) -> Option<i32> {
    if criterion.is_nan() || criterion.abs() <= 0.5 {
        None
    } else {
        Some(criterion.round() as i32)
    }
}

/// Decide whether `face` is punctured and with which chirality.
///
/// With gauge correction enabled the returned samples are rebuilt from the
/// wrapped differences (`φₖ = φₖ₋₁ + wrappedₖ₋₁`, magnitudes kept), so the
/// zero locator sees a field that is continuous along the boundary walk.
pub fn detect_puncture(face: &FaceSamples, cfg: &ExtractorConfig) -> Option<Puncture> {
    let w = winding(face, cfg);
    let chirality = classify_criterion(w.criterion)?;

    let mut samples = face.clone();
    if cfg.gauge {
        let mut phi = w.phases[0];
        for (k, s) in samples.vertices_mut().iter_mut().enumerate().skip(1) {
            phi += w.wrapped[k - 1];
            let rho = s.magnitude();
            s.u = rho * phi.cos();
            s.v = rho * phi.sin();
        }
    }

    Some(Puncture {
        chirality,
        criterion: w.criterion,
        samples,
    })
}
