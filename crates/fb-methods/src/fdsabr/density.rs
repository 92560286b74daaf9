//! Terminal density of a free-boundary SABR model.

use fb_core::{errors::Result, Real, Size};
use fb_math::close;
use tracing::{debug, warn};

use super::{
    coefficients::Coefficients,
    mesh::FdSabrMesh,
    model::FdSabrModel,
    pricing::{price_call, price_put},
    scheme::integrate,
    settings::FdSabrSettings,
    step::{DensityState, ImplicitStep},
};

/// Deviation of the total mass from one above which a build is logged as
/// suspicious.
const MASS_TOLERANCE: Real = 1e-3;

/// Result of a density solve: the mesh, its coefficients and the terminal
/// state. Immutable; price as many strikes as needed from it.
#[derive(Debug, Clone)]
pub struct FdSabrDensity {
    model: FdSabrModel,
    mesh: FdSabrMesh,
    coefficients: Coefficients,
    state: DensityState,
}

impl FdSabrDensity {
    /// Model the density was built for.
    pub fn model(&self) -> &FdSabrModel {
        &self.model
    }

    /// Mesh of the solve.
    pub fn mesh(&self) -> &FdSabrMesh {
        &self.mesh
    }

    /// Coefficients of the solve.
    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    /// Terminal state.
    pub fn state(&self) -> &DensityState {
        &self.state
    }

    /// Terminal latent density per cell, ghost cells included.
    pub fn p(&self) -> &[Real] {
        &self.state.p
    }

    /// Mass absorbed below the domain.
    pub fn pl(&self) -> Real {
        self.state.pl
    }

    /// Mass absorbed above the domain.
    pub fn pr(&self) -> Real {
        self.state.pr
    }

    /// Left edge of the latent domain.
    pub fn zmin(&self) -> Real {
        self.mesh.zmin
    }

    /// Right edge of the latent domain.
    pub fn zmax(&self) -> Real {
        self.mesh.zmax
    }

    /// Latent step.
    pub fn h(&self) -> Real {
        self.mesh.h
    }

    /// Latent cell centres.
    pub fn zm(&self) -> &[Real] {
        &self.mesh.zm
    }

    /// Shifted cell forwards.
    pub fn fm(&self) -> &[Real] {
        &self.mesh.fm
    }

    /// Local volatility per cell.
    pub fn cm(&self) -> &[Real] {
        &self.coefficients.cm
    }

    /// Unshifted cell forwards.
    pub fn forwards(&self) -> Vec<Real> {
        let shift = self.model.shift;
        self.mesh.fm.iter().map(|f| f - shift).collect()
    }

    /// Density of the forward per cell, `P/C`. `C` is `dF/dz`, so this
    /// converts the latent density to one in forward space.
    pub fn probability_density(&self) -> Vec<Real> {
        self.state
            .p
            .iter()
            .zip(&self.coefficients.cm)
            .map(|(p, c)| p / c)
            .collect()
    }

    /// `h·ΣP + PL + PR` over all cells.
    pub fn total_mass(&self) -> Real {
        self.state.mass(self.mesh.h)
    }

    /// `h·ΣP + PL + PR` over the interior cells.
    pub fn interior_mass(&self) -> Real {
        self.state.interior_mass(self.mesh.h)
    }

    /// Undiscounted call price at an unshifted strike.
    pub fn call_price(&self, strike: Real) -> Real {
        price_call(strike, self)
    }

    /// Undiscounted put price at an unshifted strike.
    pub fn put_price(&self, strike: Real) -> Real {
        price_put(strike, self)
    }
}

/// Solve the density of `model` to its expiry.
///
/// # Errors
/// [`fb_core::Error::InvalidParameter`] for invalid model or settings,
/// checked before any grid is built; [`fb_core::Error::NumericalFailure`]
/// if the grid or a step solve breaks down.
pub fn build_density(model: &FdSabrModel, settings: &FdSabrSettings) -> Result<FdSabrDensity> {
    build_density_observed(model, settings, |_, _| {})
}

/// [`build_density`], calling `observer` with the 1-based period index and
/// the state after every period.
pub fn build_density_observed<O>(
    model: &FdSabrModel,
    settings: &FdSabrSettings,
    observer: O,
) -> Result<FdSabrDensity>
where
    O: FnMut(Size, &DensityState),
{
    let mesh = FdSabrMesh::new(model, settings)?;
    let coefficients = Coefficients::new(model, &mesh)?;
    debug!(
        size = mesh.cells(),
        time_steps = settings.time_steps,
        j0 = mesh.j0,
        h = mesh.h,
        zmin = mesh.zmin,
        zmax = mesh.zmax,
        fmin = mesh.fmin,
        fmax = mesh.fmax,
        scheme = ?settings.scheme,
        "building free-boundary SABR density"
    );

    let dt = model.expiry / settings.time_steps as Real;
    let scheme = settings
        .scheme
        .build(dt, &coefficients.drift_rates(&model.params));
    let step = ImplicitStep::new(&mesh.fm, &coefficients.cm, mesh.h)?;
    let mut em = vec![1.0; mesh.cells()];
    let state = integrate(
        scheme.as_ref(),
        &step,
        &mut em,
        DensityState::dirac(mesh.cells(), mesh.j0, mesh.h),
        settings.time_steps,
        observer,
    )?;

    let mass = state.mass(mesh.h);
    if !close(mass, 1.0, MASS_TOLERANCE) {
        warn!(mass, "density mass drifted from one; widen or refine the grid");
    }
    debug!(mass, pl = state.pl, pr = state.pr, "density built");

    Ok(FdSabrDensity {
        model: *model,
        mesh,
        coefficients,
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fdsabr::{scheme::FdmScheme, transform::SabrBoundary};
    use approx::assert_abs_diff_eq;
    use fb_math::SabrParameters;

    fn model() -> FdSabrModel {
        FdSabrModel::new(SabrParameters::new(0.3, 0.5, 0.4, -0.2), 100.0, 1.0).unwrap()
    }

    #[test]
    fn mass_is_conserved_at_every_period() {
        let settings = FdSabrSettings::new(200, 20);
        let h = FdSabrMesh::new(&model(), &settings).unwrap().h;
        let mut periods = 0;
        let mut worst: Real = 0.0;
        let density = build_density_observed(&model(), &settings, |period, s| {
            periods = period;
            worst = worst.max((s.mass(h) - 1.0).abs());
        })
        .unwrap();
        assert_eq!(periods, 20);
        assert!(worst < 1e-3, "worst mass error {worst}");
        assert_abs_diff_eq!(density.total_mass(), 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(density.interior_mass(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn exposes_arrays_of_one_length() {
        let density = build_density(&model(), &FdSabrSettings::new(80, 5)).unwrap();
        let n = 80;
        assert_eq!(density.p().len(), n);
        assert_eq!(density.zm().len(), n);
        assert_eq!(density.fm().len(), n);
        assert_eq!(density.cm().len(), n);
        assert_eq!(density.forwards().len(), n);
        assert_eq!(density.probability_density().len(), n);
        assert!(density.zmin() < 0.0 && density.zmax() > 0.0);
        assert!(density.pl() >= 0.0 && density.pr() >= 0.0);
    }

    #[test]
    fn forward_density_integrates_to_interior_mass() {
        let density = build_density(&model(), &FdSabrSettings::new(300, 30)).unwrap();
        let q = density.probability_density();
        let fm = density.fm();
        let n = fm.len();
        // midpoint rule in F: ΔF ≈ C·h
        let integral: Real = (1..n - 1).map(|i| q[i] * density.cm()[i] * density.h()).sum();
        assert_abs_diff_eq!(
            integral + density.pl() + density.pr(),
            1.0,
            epsilon = 1e-10
        );
        // density peaks near the forward
        let peak = (1..n - 1)
            .max_by(|&a, &b| q[a].total_cmp(&q[b]))
            .unwrap();
        assert!((fm[peak] - 100.0).abs() < 10.0);
    }

    #[test]
    fn shifted_model_reports_unshifted_forwards() {
        let model = FdSabrModel::new(SabrParameters::new(0.01, 0.3, 0.3, 0.1), -0.002, 2.0)
            .unwrap()
            .with_shift(0.02)
            .unwrap();
        let density = build_density(&model, &FdSabrSettings::new(100, 10)).unwrap();
        for (f, fs) in density.forwards().iter().zip(density.fm()) {
            assert_abs_diff_eq!(f + 0.02, fs, epsilon = 1e-14);
        }
        assert_abs_diff_eq!(density.forwards()[density.mesh().j0], -0.002, epsilon = 1e-9);
    }

    #[test]
    fn implicit_euler_and_absorbing_variants_build() {
        let euler = build_density(
            &model(),
            &FdSabrSettings::new(100, 10).with_scheme(FdmScheme::ImplicitEuler),
        )
        .unwrap();
        assert_abs_diff_eq!(euler.interior_mass(), 1.0, epsilon = 1e-10);

        let absorbing = model().with_boundary(SabrBoundary::Absorbing).unwrap();
        let density = build_density(&absorbing, &FdSabrSettings::new(100, 10)).unwrap();
        assert_abs_diff_eq!(density.interior_mass(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn invalid_inputs_fail_before_solving() {
        let err = build_density(&model(), &FdSabrSettings::new(100, 0)).unwrap_err();
        assert!(err.is_invalid_parameter());
        let mut bad = model();
        bad.params.nu = -0.1;
        let err = build_density(&bad, &FdSabrSettings::default()).unwrap_err();
        assert!(err.is_invalid_parameter());
    }
}
