//! Phase arithmetic: modular wrapping and the gauge term of an edge.

use num_traits::{Float, FloatConst};

/// Euclidean remainder of `x` modulo `2π`, in `[0, 2π)`.
#[inline]
pub fn mod2pi<T: Float + FloatConst>(x: T) -> T {
    let two_pi = T::TAU();
    let r = x % two_pi;
    if r < T::zero() { r + two_pi } else { r }
}

/// Shift a phase difference into `[-π, π)` as `mod2π(δ + π) − π`.
#[inline]
pub fn wrap_phase<T: Float + FloatConst>(delta: T) -> T {
    mod2pi(delta + T::PI()) - T::PI()
}

/// Line integral of the background vector potential along the edge `x0 → x1`,
/// approximated with the midpoint rule.
///
/// The potential is `A = (Kex, x·Bz, y·Bx − x·By)` (Y–Z gauge) when `B_y > 0`
/// and `A = (Kex − y·Bz + z·By, 0, y·Bx)` (X–Z gauge) otherwise; both satisfy
/// `∇×A = B`. Reversing the edge negates the result.
pub fn gauge_transformation(x0: [f64; 3], x1: [f64; 3], kex: f64, b: [f64; 3]) -> f64 {
    let d = [x1[0] - x0[0], x1[1] - x0[1], x1[2] - x0[2]];
    let x = x0[0] + 0.5 * d[0];
    let y = x0[1] + 0.5 * d[1];
    let z = x0[2] + 0.5 * d[2];

    let a = if b[1] > 0.0 {
        [kex, x * b[2], y * b[0] - x * b[1]]
    } else {
        [kex - y * b[2] + z * b[1], 0.0, y * b[0]]
    };
    a[0] * d[0] + a[1] * d[1] + a[2] * d[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn wrap_lands_in_half_open_interval() {
        for &(x, want) in &[
            (0.0, 0.0),
            (PI / 2.0, PI / 2.0),
            (3.0 * PI / 2.0, -PI / 2.0),
            (-3.0 * PI / 2.0, PI / 2.0),
            (4.0 * PI / 3.0, -2.0 * PI / 3.0),
            (-4.0 * PI / 3.0, 2.0 * PI / 3.0),
        ] {
            let got = wrap_phase(x);
            assert!((got - want).abs() < 1e-12, "wrap({x}) = {got}");
        }
        // the shift convention maps both +π and −π to −π
        assert!((wrap_phase(PI) + PI).abs() < 1e-12);
        assert!((wrap_phase(-PI) + PI).abs() < 1e-12);
    }

    #[test]
    fn mod2pi_is_euclidean() {
        assert!((mod2pi(-0.5f64) - (TAU - 0.5)).abs() < 1e-12);
        assert!((mod2pi(TAU + 0.25f64) - 0.25).abs() < 1e-12);
        assert!((mod2pi(1.0f32) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gauge_is_antisymmetric_and_zero_without_field() {
        let a = [0.1, 0.7, -0.3];
        let c = [0.9, -0.2, 0.4];
        assert_eq!(gauge_transformation(a, c, 0.0, [0.0; 3]), 0.0);
        for b in [[0.3, 0.5, -1.0], [0.3, -0.5, 2.0], [1.0, 0.0, 0.0]] {
            let fwd = gauge_transformation(a, c, 0.2, b);
            let bwd = gauge_transformation(c, a, 0.2, b);
            assert!((fwd + bwd).abs() < 1e-12);
        }
    }

    #[test]
    fn gauge_circulation_equals_enclosed_flux() {
        // unit square in the xy plane, counter-clockwise: circulation of A is Bz * area
        let sq = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        for b in [[0.0, 0.0, 0.8], [0.2, 0.4, 0.8], [0.2, -0.4, 0.8]] {
            let circ: f64 = (0..4)
                .map(|i| gauge_transformation(sq[i], sq[(i + 1) % 4], 0.3, b))
                .sum();
            assert!((circ - b[2]).abs() < 1e-12, "B={b:?} circulation={circ}");
        }
    }
}
