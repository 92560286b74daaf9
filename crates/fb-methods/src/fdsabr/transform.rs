//! Coordinate transform between the latent coordinate `z`, the intermediate
//! variable `y` and the forward `F`.
//!
//! ```text
//! y(z) = α/ν · (sinh(νz) + ρ(cosh(νz) − 1))
//! F(y) = sign(u)|u|^(1/(1−β)),   u = sign(f)|f|^(1−β) + (1−β)y
//! ```
//!
//! The forward map depends on the boundary treatment: the free-boundary
//! variant lets the forward cross zero, the absorbing variant stops it there.

use fb_core::Real;

/// Sign convention used by the signed power maps: `+1` for `x >= 0`
/// (including `-0.0`), `-1` otherwise.
#[inline]
pub fn sign(x: Real) -> Real {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// `sign(x)·|x|^p`.
#[inline]
fn signed_pow(x: Real, p: Real) -> Real {
    sign(x) * x.abs().powf(p)
}

/// Behaviour of the forward at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SabrBoundary {
    /// Free-boundary SABR: the forward may go negative, powers are signed.
    #[default]
    Free,
    /// Arbitrage-free SABR with absorption at zero: the forward stays
    /// non-negative and the latent domain is cut where `F` reaches 0.
    Absorbing,
}

impl SabrBoundary {
    /// Map the intermediate variable `y` to the forward, given the spot
    /// forward `forward` and CEV exponent `beta` (`beta < 1`).
    pub fn to_forward(self, forward: Real, beta: Real, y: Real) -> Real {
        let one_minus_beta = 1.0 - beta;
        match self {
            SabrBoundary::Free => {
                let u = signed_pow(forward, one_minus_beta) + one_minus_beta * y;
                signed_pow(u, 1.0 / one_minus_beta)
            }
            SabrBoundary::Absorbing => {
                let u = forward.powf(one_minus_beta) + one_minus_beta * y;
                u.max(0.0).powf(1.0 / one_minus_beta)
            }
        }
    }

    /// Element-wise [`SabrBoundary::to_forward`].
    pub fn to_forwards(self, forward: Real, beta: Real, ys: &[Real]) -> Vec<Real> {
        ys.iter().map(|&y| self.to_forward(forward, beta, y)).collect()
    }

    /// Intermediate variable reached when the forward equals `strike`.
    pub fn intermediate_of_strike(self, strike: Real, forward: Real, beta: Real) -> Real {
        let one_minus_beta = 1.0 - beta;
        match self {
            SabrBoundary::Free => {
                (signed_pow(strike, one_minus_beta) - signed_pow(forward, one_minus_beta))
                    / one_minus_beta
            }
            SabrBoundary::Absorbing => {
                (strike.max(0.0).powf(one_minus_beta) - forward.powf(one_minus_beta))
                    / one_minus_beta
            }
        }
    }
}

/// `y(z) = α/ν · (sinh(νz) + ρ(cosh(νz) − 1))`.
#[inline]
pub fn to_intermediate(alpha: Real, nu: Real, rho: Real, z: Real) -> Real {
    let nz = nu * z;
    alpha / nu * (nz.sinh() + rho * (nz.cosh() - 1.0))
}

/// Element-wise [`to_intermediate`].
pub fn to_intermediates(alpha: Real, nu: Real, rho: Real, zs: &[Real]) -> Vec<Real> {
    zs.iter().map(|&z| to_intermediate(alpha, nu, rho, z)).collect()
}

/// Closed-form inverse of [`to_intermediate`]:
///
/// ```text
/// z = −1/ν · ln((√(1 − ρ² + (ρ + νy/α)²) − ρ − νy/α) / (1 − ρ))
/// ```
///
/// For large positive `y` the numerator is evaluated as
/// `(1 − ρ²)/(√(…) + ρ + νy/α)` so it never cancels to zero or below.
pub fn latent_of_intermediate(alpha: Real, nu: Real, rho: Real, y: Real) -> Real {
    let a = rho + nu * y / alpha;
    let c = 1.0 - rho * rho;
    let root = (c + a * a).sqrt();
    let numerator = if a > 0.0 { c / (root + a) } else { root - a };
    -(numerator / (1.0 - rho)).ln() / nu
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn sign_treats_zero_as_positive() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(-0.0), 1.0);
        assert_eq!(sign(-2.0), -1.0);
    }

    #[test]
    fn intermediate_vanishes_at_origin() {
        assert_abs_diff_eq!(to_intermediate(0.3, 0.4, -0.2, 0.0), 0.0);
    }

    #[test]
    fn intermediate_small_z_is_linear_in_alpha() {
        // y ≈ α z for small z
        let z = 1e-6;
        assert_abs_diff_eq!(to_intermediate(0.3, 0.4, -0.2, z), 0.3 * z, epsilon = 1e-12);
    }

    #[test]
    fn forward_at_zero_intermediate_is_spot() {
        for boundary in [SabrBoundary::Free, SabrBoundary::Absorbing] {
            assert_abs_diff_eq!(boundary.to_forward(100.0, 0.5, 0.0), 100.0, epsilon = 1e-10);
        }
        assert_abs_diff_eq!(
            SabrBoundary::Free.to_forward(-0.004, 0.3, 0.0),
            -0.004,
            epsilon = 1e-15
        );
    }

    #[test]
    fn free_forward_crosses_zero() {
        // u = 10 + 0.5 y is negative for y < -20
        let f = SabrBoundary::Free.to_forward(100.0, 0.5, -24.0);
        assert_abs_diff_eq!(f, -4.0, epsilon = 1e-12);
    }

    #[test]
    fn absorbing_forward_stops_at_zero() {
        assert_eq!(SabrBoundary::Absorbing.to_forward(100.0, 0.5, -24.0), 0.0);
    }

    #[test]
    fn strike_inverts_forward_map() {
        for boundary in [SabrBoundary::Free, SabrBoundary::Absorbing] {
            for y in [-3.0, -0.5, 0.0, 0.7, 4.0] {
                let f = boundary.to_forward(100.0, 0.5, y);
                assert_abs_diff_eq!(
                    boundary.intermediate_of_strike(f, 100.0, 0.5),
                    y,
                    epsilon = 1e-10
                );
            }
        }
    }

    #[test]
    fn latent_inverse_handles_extreme_intermediates() {
        let z = latent_of_intermediate(0.3, 0.4, -0.2, 1e300);
        assert!(z.is_finite() || z == f64::INFINITY);
        assert!(z > 0.0);
        let z = latent_of_intermediate(0.3, 0.4, -0.2, -1e300);
        assert!(z < 0.0);
    }

    proptest! {
        #[test]
        fn latent_inverse_round_trip(
            z in -6.0f64..6.0,
            alpha in 0.01f64..1.0,
            nu in 0.05f64..1.5,
            rho in -0.95f64..0.95,
        ) {
            let y = to_intermediate(alpha, nu, rho, z);
            let back = latent_of_intermediate(alpha, nu, rho, y);
            prop_assert!((back - z).abs() < 1e-8, "z = {z}, back = {back}");
        }

        #[test]
        fn intermediate_is_increasing(
            z in -6.0f64..6.0,
            rho in -0.95f64..0.95,
        ) {
            let a = to_intermediate(0.3, 0.4, rho, z);
            let b = to_intermediate(0.3, 0.4, rho, z + 1e-3);
            prop_assert!(b > a);
        }
    }
}
