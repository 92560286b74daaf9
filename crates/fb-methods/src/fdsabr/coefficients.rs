//! Per-cell coefficients of the density PDE.

use fb_core::{errors::Result, Real};
use fb_math::SabrParameters;

use super::{mesh::FdSabrMesh, model::FdSabrModel, transform::sign};

/// Local volatility `C = √(α² + 2ραν·y + ν²y²) · |F|^β`.
#[inline]
pub fn local_volatility(params: &SabrParameters, y: Real, forward: Real) -> Real {
    let SabrParameters {
        alpha,
        beta,
        nu,
        rho,
    } = *params;
    (alpha * alpha + 2.0 * rho * alpha * nu * y + nu * nu * y * y).sqrt() * forward.abs().powf(beta)
}

/// Drift correction `Γ = (|F|^β − |f|^β)/(F − f)` away from the spot.
///
/// Undefined at `F = f`; use [`drift_correction_at_spot`] there.
#[inline]
pub fn drift_correction(forward_cell: Real, forward: Real, beta: Real) -> Real {
    (forward_cell.abs().powf(beta) - forward.abs().powf(beta)) / (forward_cell - forward)
}

/// Limit of [`drift_correction`] as `F → f`: `sign(f)·β·|f|^(β−1)`.
#[inline]
pub fn drift_correction_at_spot(forward: Real, beta: Real) -> Real {
    sign(forward) * beta * forward.abs().powf(beta - 1.0)
}

/// Local volatility and drift correction on every cell of a mesh. Fixed for
/// the whole time integration.
#[derive(Debug, Clone)]
pub struct Coefficients {
    /// Local volatility, boundary cells copied from their neighbours.
    pub cm: Vec<Real>,
    /// Drift correction.
    pub gammam: Vec<Real>,
}

impl Coefficients {
    /// Evaluate the coefficients of `model` on `mesh`.
    ///
    /// # Errors
    /// [`fb_core::Error::NumericalFailure`] if a coefficient is not finite.
    pub fn new(model: &FdSabrModel, mesh: &FdSabrMesh) -> Result<Self> {
        let params = &model.params;
        let f = model.shifted_forward();
        let last = mesh.cells() - 1;

        let mut cm: Vec<Real> = mesh
            .ym
            .iter()
            .zip(&mesh.fm)
            .map(|(&y, &fc)| local_volatility(params, y, fc))
            .collect();
        cm[0] = cm[1];
        cm[last] = cm[last - 1];

        let gammam: Vec<Real> = mesh
            .fm
            .iter()
            .enumerate()
            .map(|(i, &fc)| {
                if i == mesh.j0 {
                    drift_correction_at_spot(f, params.beta)
                } else {
                    drift_correction(fc, f, params.beta)
                }
            })
            .collect();

        fb_core::ensure_post!(
            cm.iter().all(|c| c.is_finite()),
            "non-finite local volatility"
        );
        fb_core::ensure_post!(
            gammam.iter().all(|g| g.is_finite()),
            "non-finite drift correction"
        );
        Ok(Self { cm, gammam })
    }

    /// Drift rates `ρνα·Γ` per cell.
    pub fn drift_rates(&self, params: &SabrParameters) -> Vec<Real> {
        let scale = params.rho * params.nu * params.alpha;
        self.gammam.iter().map(|g| scale * g).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fdsabr::settings::FdSabrSettings;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn params() -> SabrParameters {
        SabrParameters::new(0.3, 0.5, 0.4, -0.2)
    }

    #[test]
    fn local_volatility_at_spot_is_alpha_f_beta() {
        assert_abs_diff_eq!(local_volatility(&params(), 0.0, 100.0), 3.0, epsilon = 1e-12);
        // √(0.09 − 0.048 + 0.16) · 2
        assert_abs_diff_eq!(
            local_volatility(&params(), 1.0, 4.0),
            0.202f64.sqrt() * 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn drift_correction_approaches_its_limit() {
        let limit = drift_correction_at_spot(100.0, 0.5);
        assert_abs_diff_eq!(limit, 0.05, epsilon = 1e-15);
        assert_relative_eq!(drift_correction(100.0 + 1e-6, 100.0, 0.5), limit, max_relative = 1e-6);
        assert_relative_eq!(drift_correction(100.0 - 1e-6, 100.0, 0.5), limit, max_relative = 1e-6);
    }

    #[test]
    fn negative_forward_limit_keeps_sign() {
        assert!(drift_correction_at_spot(-0.01, 0.3) < 0.0);
        assert_relative_eq!(
            drift_correction(-0.01 + 1e-9, -0.01, 0.3),
            drift_correction_at_spot(-0.01, 0.3),
            max_relative = 1e-5
        );
    }

    #[test]
    fn coefficients_on_mesh() {
        let model = FdSabrModel::new(params(), 100.0, 1.0).unwrap();
        let mesh = FdSabrMesh::new(&model, &FdSabrSettings::new(60, 1)).unwrap();
        let coeffs = Coefficients::new(&model, &mesh).unwrap();
        let n = mesh.cells();
        assert_eq!(coeffs.cm.len(), n);
        assert_eq!(coeffs.gammam.len(), n);
        assert_eq!(coeffs.cm[0], coeffs.cm[1]);
        assert_eq!(coeffs.cm[n - 1], coeffs.cm[n - 2]);
        assert!(coeffs.cm.iter().all(|&c| c > 0.0));
        assert_eq!(coeffs.gammam[mesh.j0], drift_correction_at_spot(100.0, 0.5));

        let rates = coeffs.drift_rates(&model.params);
        assert_abs_diff_eq!(rates[mesh.j0], -0.2 * 0.4 * 0.3 * 0.05, epsilon = 1e-15);
    }
}
