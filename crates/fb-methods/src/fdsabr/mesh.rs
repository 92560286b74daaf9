//! Latent grid and the cell arrays mapped from it.
//!
//! The latent coordinate is discretised uniformly. The step is adjusted so
//! that the centre of cell `j0` sits exactly at `z = 0`, where the initial
//! Dirac mass is injected.

use fb_core::{errors::Result, Real, Size};
use fb_math::comparison::is_strictly_increasing;

use super::{model::FdSabrModel, settings::FdSabrSettings, transform::to_intermediates};

// ─── Latent nodes ─────────────────────────────────────────────────────────────

/// Uniform latent nodes with the spot at a cell centre.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentMesh {
    /// Adjusted step.
    pub h: Real,
    /// Index of the cell whose centre is `z = 0`.
    pub j0: Size,
    /// Nodes `z[i] = zmin + i·h`, `i = 0..J+2`.
    pub z: Vec<Real>,
}

impl LatentMesh {
    /// Number of interior cells `J`.
    pub fn interior_cells(&self) -> Size {
        self.z.len() - 2
    }

    /// Left edge of the domain.
    pub fn zmin(&self) -> Real {
        self.z[0]
    }

    /// Right edge of the domain, `z[J]`. Differs from the requested bound
    /// because `j0` is an integer.
    pub fn zmax(&self) -> Real {
        self.z[self.interior_cells()]
    }
}

/// Build `size` uniform latent nodes from `zmin`, with `J = size − 2`
/// interior cells and the spot at the centre of cell `j0`.
///
/// ```text
/// h0 = (zmax − zmin)/J,  j0 = ⌊−zmin/h0⌋,  h = −zmin/(j0 − ½)
/// ```
///
/// # Errors
/// [`fb_core::Error::InvalidParameter`] if `size < 4` or the bounds do not
/// straddle zero; [`fb_core::Error::NumericalFailure`] if zero falls in
/// the first half-cell, so no `j0 >= 1` exists.
pub fn uniform_latent_mesh(zmin: Real, zmax: Real, size: Size) -> Result<LatentMesh> {
    fb_core::ensure!(size >= 4, "grid size must be >= 4, got {size}");
    fb_core::ensure!(
        zmin.is_finite() && zmax.is_finite() && zmin < 0.0 && zmax > 0.0,
        "latent bounds must straddle zero, got [{zmin}, {zmax}]"
    );

    let interior = size - 2;
    let h0 = (zmax - zmin) / interior as Real;
    let j0 = (-zmin / h0) as Size;
    fb_core::ensure_post!(
        j0 >= 1,
        "spot lies in the first half-cell of [{zmin}, {zmax}] with {size} cells"
    );
    let h = -zmin / (j0 as Real - 0.5);
    fb_core::ensure_post!(h.is_finite() && h > 0.0, "invalid latent step {h}");

    let z: Vec<Real> = (0..size).map(|i| zmin + i as Real * h).collect();
    fb_core::ensure_post!(
        is_strictly_increasing(&z),
        "latent nodes are not strictly increasing"
    );
    Ok(LatentMesh { h, j0, z })
}

/// Requested latent bounds `±nd·√T`. With an absorbing boundary the lower
/// bound is raised to the point where the forward reaches zero.
pub fn latent_bounds(model: &FdSabrModel, std_devs: Real) -> (Real, Real) {
    let half_width = std_devs * model.expiry.sqrt();
    let zmin = match model.absorption_point() {
        Some(zbar) => (-half_width).max(zbar),
        None => -half_width,
    };
    (zmin, half_width)
}

// ─── Cell arrays ──────────────────────────────────────────────────────────────

/// Latent grid plus the cell-centre arrays of the density solve.
///
/// All forwards are shifted. Boundary cells `0` and `J+1` carry forwards
/// extrapolated linearly from the domain edges.
#[derive(Debug, Clone)]
pub struct FdSabrMesh {
    /// Left edge of the domain.
    pub zmin: Real,
    /// Right edge of the domain.
    pub zmax: Real,
    /// Latent step.
    pub h: Real,
    /// Cell holding the spot.
    pub j0: Size,
    /// Latent nodes.
    pub z: Vec<Real>,
    /// Latent cell centres `z − h/2`.
    pub zm: Vec<Real>,
    /// Intermediate variable at the cell centres.
    pub ym: Vec<Real>,
    /// Shifted forward per cell.
    pub fm: Vec<Real>,
    /// Shifted forward at `zmin`.
    pub fmin: Real,
    /// Shifted forward at `zmax`.
    pub fmax: Real,
}

impl FdSabrMesh {
    /// Build the mesh for `model`.
    ///
    /// # Errors
    /// [`fb_core::Error::InvalidParameter`] for invalid inputs;
    /// [`fb_core::Error::NumericalFailure`] if the cell forwards are not
    /// finite and strictly increasing.
    pub fn new(model: &FdSabrModel, settings: &FdSabrSettings) -> Result<Self> {
        model.validate()?;
        settings.validate()?;

        let (zmin, zmax) = latent_bounds(model, settings.std_devs);
        let LatentMesh { h, j0, z } = uniform_latent_mesh(zmin, zmax, settings.size)?;
        let last = z.len() - 1;
        let zmax = z[last - 1];

        let zm: Vec<Real> = z.iter().map(|&zi| zi - 0.5 * h).collect();
        let p = &model.params;
        let ym = to_intermediates(p.alpha, p.nu, p.rho, &zm);
        let mut fm =
            model
                .boundary
                .to_forwards(model.shifted_forward(), p.beta, &ym);
        let fmin = model.make_forward(zmin);
        let fmax = model.make_forward(zmax);
        fm[0] = 2.0 * fmin - fm[1];
        fm[last] = 2.0 * fmax - fm[last - 1];

        fb_core::ensure_post!(
            is_strictly_increasing(&fm),
            "cell forwards are not finite and strictly increasing on [{fmin}, {fmax}]"
        );

        Ok(Self {
            zmin,
            zmax,
            h,
            j0,
            z,
            zm,
            ym,
            fm,
            fmin,
            fmax,
        })
    }

    /// Number of cells `J + 2`.
    pub fn cells(&self) -> Size {
        self.fm.len()
    }

    /// Number of interior cells `J`.
    pub fn interior_cells(&self) -> Size {
        self.fm.len() - 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fdsabr::transform::SabrBoundary;
    use approx::assert_abs_diff_eq;
    use fb_math::SabrParameters;
    use proptest::prelude::*;

    fn model() -> FdSabrModel {
        FdSabrModel::new(SabrParameters::new(0.3, 0.5, 0.4, -0.2), 100.0, 1.0).unwrap()
    }

    #[test]
    fn latent_mesh_hand_computed() {
        // J = 8, h0 = 1, j0 = 4, h = 4/3.5
        let mesh = uniform_latent_mesh(-4.0, 4.0, 10).unwrap();
        assert_eq!(mesh.j0, 4);
        assert_eq!(mesh.z.len(), 10);
        assert_eq!(mesh.interior_cells(), 8);
        assert_abs_diff_eq!(mesh.h, 8.0 / 7.0, epsilon = 1e-15);
        assert_abs_diff_eq!(mesh.zmin(), -4.0);
        assert_abs_diff_eq!(mesh.zmax(), 36.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mesh.z[mesh.j0] - 0.5 * mesh.h, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn latent_mesh_asymmetric_bounds() {
        // h0 = 0.5, j0 = trunc(2.6) = 2
        let mesh = uniform_latent_mesh(-1.3, 2.7, 10).unwrap();
        assert_eq!(mesh.j0, 2);
        assert_abs_diff_eq!(mesh.h, 1.3 / 1.5, epsilon = 1e-15);
    }

    #[test]
    fn latent_mesh_rejects_bad_inputs() {
        assert!(uniform_latent_mesh(-4.0, 4.0, 3).unwrap_err().is_invalid_parameter());
        assert!(uniform_latent_mesh(0.5, 4.0, 10).unwrap_err().is_invalid_parameter());
        assert!(uniform_latent_mesh(-4.0, f64::NAN, 10)
            .unwrap_err()
            .is_invalid_parameter());
        // zero inside the first cell
        assert!(uniform_latent_mesh(-0.01, 4.0, 10).unwrap_err().is_numerical_failure());
    }

    #[test]
    fn spot_sits_at_cell_j0() {
        let mesh = FdSabrMesh::new(&model(), &FdSabrSettings::new(200, 10)).unwrap();
        assert_eq!(mesh.cells(), 200);
        assert_eq!(mesh.interior_cells(), 198);
        assert_abs_diff_eq!(mesh.zm[mesh.j0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mesh.fm[mesh.j0], 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mesh.zmin, -4.0);
        assert_abs_diff_eq!(mesh.zmax, mesh.z[mesh.cells() - 2]);
    }

    #[test]
    fn boundary_cells_are_extrapolated() {
        let mesh = FdSabrMesh::new(&model(), &FdSabrSettings::new(50, 10)).unwrap();
        let n = mesh.cells();
        assert_abs_diff_eq!(mesh.fm[0], 2.0 * mesh.fmin - mesh.fm[1], epsilon = 1e-12);
        assert_abs_diff_eq!(
            mesh.fm[n - 1],
            2.0 * mesh.fmax - mesh.fm[n - 2],
            epsilon = 1e-12
        );
        assert!(mesh.fm[0] < mesh.fmin && mesh.fmin < mesh.fm[1]);
        assert!(mesh.fm[n - 2] < mesh.fmax && mesh.fmax < mesh.fm[n - 1]);
    }

    #[test]
    fn absorbing_mesh_starts_at_zero_forward() {
        let model = FdSabrModel::new(SabrParameters::new(0.3, 0.5, 0.4, -0.2), 1.0, 1.0)
            .unwrap()
            .with_boundary(SabrBoundary::Absorbing)
            .unwrap();
        let zbar = model.absorption_point().unwrap();
        let mesh = FdSabrMesh::new(&model, &FdSabrSettings::new(100, 10)).unwrap();
        assert_abs_diff_eq!(mesh.zmin, zbar, epsilon = 1e-15);
        assert_abs_diff_eq!(mesh.fmin, 0.0, epsilon = 1e-10);
        assert!(mesh.fm[1..].iter().all(|&f| f > 0.0));
    }

    #[test]
    fn invalid_settings_fail_before_grid_construction() {
        let err = FdSabrMesh::new(&model(), &FdSabrSettings::new(2, 10)).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    proptest! {
        #[test]
        fn cell_forwards_are_strictly_increasing(
            alpha in 0.05f64..1.0,
            beta in 0.1f64..0.9,
            nu in 0.1f64..1.0,
            rho in -0.9f64..0.9,
            forward in 0.01f64..200.0,
            expiry in 0.25f64..3.0,
            size in 10usize..300,
        ) {
            let model = FdSabrModel::new(SabrParameters::new(alpha, beta, nu, rho), forward, expiry)
                .unwrap();
            let mesh = FdSabrMesh::new(&model, &FdSabrSettings::new(size, 1)).unwrap();
            prop_assert!(is_strictly_increasing(&mesh.z));
            prop_assert!(is_strictly_increasing(&mesh.zm));
            prop_assert!(is_strictly_increasing(&mesh.fm));
        }
    }
}
