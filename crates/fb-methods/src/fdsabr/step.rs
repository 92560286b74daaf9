//! One implicit step of the density PDE.
//!
//! Interior rows discretise `P_t = ½ ∂²(C·E·P)/∂F²` in conservative form on
//! the non-uniform forward spacing. The first and last rows are zero-flux
//! conditions on the ghost cells. Mass leaving the interior through either
//! edge is moved into the boundary buckets `PL` and `PR`.

use fb_core::{errors::Result, Real, Size};

use crate::finite_differences::TridiagonalOperator;

// ─── Density state ────────────────────────────────────────────────────────────

/// Discrete density per cell plus the mass absorbed at each edge.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityState {
    /// Density per cell, including the two ghost cells.
    pub p: Vec<Real>,
    /// Mass absorbed at the left edge.
    pub pl: Real,
    /// Mass absorbed at the right edge.
    pub pr: Real,
}

impl DensityState {
    /// Unit mass concentrated in cell `j0` of width `h`.
    pub fn dirac(cells: Size, j0: Size, h: Real) -> Self {
        let mut p = vec![0.0; cells];
        p[j0] = 1.0 / h;
        Self { p, pl: 0.0, pr: 0.0 }
    }

    /// `h·ΣP + PL + PR` over all cells.
    pub fn mass(&self, h: Real) -> Real {
        h * self.p.iter().sum::<Real>() + self.pl + self.pr
    }

    /// `h·ΣP + PL + PR` over the interior cells only. The step conserves
    /// this quantity up to rounding.
    pub fn interior_mass(&self, h: Real) -> Real {
        let n = self.p.len();
        h * self.p[1..n - 1].iter().sum::<Real>() + self.pl + self.pr
    }

    /// `a·self + b·other`, element-wise and on both buckets.
    pub fn combine(&self, a: Real, other: &DensityState, b: Real) -> DensityState {
        DensityState {
            p: self
                .p
                .iter()
                .zip(&other.p)
                .map(|(x, y)| a * x + b * y)
                .collect(),
            pl: a * self.pl + b * other.pl,
            pr: a * self.pr + b * other.pr,
        }
    }
}

// ─── Implicit step ────────────────────────────────────────────────────────────

/// Backward-Euler step on a fixed mesh.
#[derive(Debug, Clone)]
pub struct ImplicitStep<'a> {
    cm: &'a [Real],
    df: Vec<Real>,
    h: Real,
}

impl<'a> ImplicitStep<'a> {
    /// Step over the cell forwards `fm` with local volatility `cm` and
    /// latent step `h`.
    ///
    /// # Errors
    /// [`fb_core::Error::InvalidParameter`] on mismatched lengths, fewer
    /// than three cells, or a non-positive step.
    pub fn new(fm: &[Real], cm: &'a [Real], h: Real) -> Result<Self> {
        fb_core::ensure!(
            fm.len() == cm.len(),
            "{} cell forwards but {} volatilities",
            fm.len(),
            cm.len()
        );
        fb_core::ensure!(fm.len() >= 3, "need at least 3 cells, got {}", fm.len());
        fb_core::ensure!(h.is_finite() && h > 0.0, "latent step must be > 0, got {h}");
        let df = fm.windows(2).map(|w| w[1] - w[0]).collect();
        Ok(Self { cm, df, h })
    }

    /// Number of cells.
    pub fn cells(&self) -> Size {
        self.cm.len()
    }

    /// Latent step.
    pub fn h(&self) -> Real {
        self.h
    }

    /// Advance `state` by `dt` with decay weights `em`.
    ///
    /// The edge fluxes use the weights passed in, i.e. the weights after the
    /// caller's update for this sub-step.
    ///
    /// # Errors
    /// [`fb_core::Error::NumericalFailure`] if the tridiagonal solve breaks
    /// down or produces non-finite values.
    pub fn advance(&self, em: &[Real], dt: Real, state: &DensityState) -> Result<DensityState> {
        let m = self.cells();
        fb_core::ensure!(
            em.len() == m && state.p.len() == m,
            "expected {m} weights and densities, got {} and {}",
            em.len(),
            state.p.len()
        );
        let df = &self.df;
        let ce: Vec<Real> = self.cm.iter().zip(em).map(|(c, e)| c * e).collect();
        let frac = 0.5 * dt / self.h;

        let mut op = TridiagonalOperator::new(m);
        op.diag[0] = ce[0] / df[0];
        op.upper[0] = ce[1] / df[0];
        for i in 1..m - 1 {
            op.lower[i] = -frac * ce[i - 1] / df[i - 1];
            op.diag[i] = 1.0 + frac * ce[i] * (1.0 / df[i] + 1.0 / df[i - 1]);
            op.upper[i] = -frac * ce[i + 1] / df[i];
        }
        op.lower[m - 1] = ce[m - 2] / df[m - 2];
        op.diag[m - 1] = ce[m - 1] / df[m - 2];

        let mut rhs = state.p.clone();
        rhs[0] = 0.0;
        rhs[m - 1] = 0.0;
        let p = op.solve(&rhs)?;

        let pl = state.pl + dt * ce[1] / df[0] * p[1];
        let pr = state.pr + dt * ce[m - 2] / df[m - 2] * p[m - 2];
        fb_core::ensure_post!(
            pl.is_finite() && pr.is_finite(),
            "non-finite boundary mass ({pl}, {pr})"
        );
        Ok(DensityState { p, pl, pr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn uniform_grid(n: usize) -> (Vec<Real>, Vec<Real>) {
        let fm: Vec<Real> = (0..n).map(|i| 90.0 + i as Real).collect();
        let cm = vec![2.0; n];
        (fm, cm)
    }

    #[test]
    fn dirac_has_unit_mass() {
        let state = DensityState::dirac(12, 5, 0.25);
        assert_abs_diff_eq!(state.mass(0.25), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(state.interior_mass(0.25), 1.0, epsilon = 1e-15);
        assert_eq!(state.p[5], 4.0);
    }

    #[test]
    fn combine_is_linear() {
        let a = DensityState {
            p: vec![1.0, 2.0],
            pl: 0.5,
            pr: 1.0,
        };
        let b = DensityState {
            p: vec![3.0, -1.0],
            pl: 0.0,
            pr: 2.0,
        };
        let c = a.combine(2.0, &b, -1.0);
        assert_eq!(c.p, vec![-1.0, 5.0]);
        assert_eq!(c.pl, 1.0);
        assert_eq!(c.pr, 0.0);
    }

    #[test]
    fn step_conserves_interior_mass() {
        let (fm, cm) = uniform_grid(21);
        let em = vec![1.0; 21];
        let h = 0.1;
        let step = ImplicitStep::new(&fm, &cm, h).unwrap();
        let mut state = DensityState::dirac(21, 3, h);
        for _ in 0..50 {
            state = step.advance(&em, 0.5, &state).unwrap();
            assert_abs_diff_eq!(state.interior_mass(h), 1.0, epsilon = 1e-12);
        }
        assert!(state.pl > 0.0 && state.pr > 0.0);
        // mass starts closer to the left edge
        assert!(state.pl > state.pr);
    }

    #[test]
    fn ghost_cells_mirror_their_neighbours() {
        let (fm, cm) = uniform_grid(15);
        let em = vec![1.0; 15];
        let step = ImplicitStep::new(&fm, &cm, 0.2).unwrap();
        let state = step
            .advance(&em, 1.0, &DensityState::dirac(15, 7, 0.2))
            .unwrap();
        assert_abs_diff_eq!(state.p[0], -state.p[1], epsilon = 1e-14);
        assert_abs_diff_eq!(state.p[14], -state.p[13], epsilon = 1e-14);
    }

    #[test]
    fn step_diffuses_symmetric_initial_mass_symmetrically() {
        let (fm, cm) = uniform_grid(21);
        let em = vec![1.0; 21];
        let step = ImplicitStep::new(&fm, &cm, 0.1).unwrap();
        let state = step
            .advance(&em, 2.0, &DensityState::dirac(21, 10, 0.1))
            .unwrap();
        for i in 1..10 {
            assert_abs_diff_eq!(state.p[10 - i], state.p[10 + i], epsilon = 1e-12);
        }
        assert!(state.p[10] < 10.0);
        assert_abs_diff_eq!(state.pl, state.pr, epsilon = 1e-14);
    }

    #[test]
    fn rejects_inconsistent_inputs() {
        let (fm, cm) = uniform_grid(10);
        assert!(ImplicitStep::new(&fm, &cm[..9], 0.1).unwrap_err().is_invalid_parameter());
        assert!(ImplicitStep::new(&fm, &cm, 0.0).unwrap_err().is_invalid_parameter());
        let step = ImplicitStep::new(&fm, &cm, 0.1).unwrap();
        let err = step
            .advance(&[1.0; 9], 0.1, &DensityState::dirac(10, 4, 0.1))
            .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn degenerate_spacing_is_a_numerical_failure() {
        let fm = vec![1.0, 1.0, 2.0, 3.0];
        let cm = vec![1.0; 4];
        let step = ImplicitStep::new(&fm, &cm, 0.1).unwrap();
        let err = step
            .advance(&[1.0; 4], 0.1, &DensityState::dirac(4, 2, 0.1))
            .unwrap_err();
        assert!(err.is_numerical_failure());
    }
}
