//! European option prices from a terminal density.
//!
//! The call payoff is integrated cell by cell above the strike. The cell
//! straddling the strike contributes the triangle between the strike and
//! its upper edge, with the forward linearised over the upper half-cell.
//! Mass absorbed above the domain pays off at `Fmax`.

use fb_core::{Real, Size};

use super::density::FdSabrDensity;

/// Below this distance between the strike and the upper edge of its cell,
/// the straddling-cell triangle is dropped.
const PARTIAL_CELL_THRESHOLD: Real = 1e-5;

/// Undiscounted call price at an unshifted strike.
///
/// Strikes below the domain price at intrinsic `forward − strike`, strikes
/// above it at zero. A NaN strike yields NaN.
///
/// Whole cells are summed from the one above the strike's cell up to the
/// last interior cell `J`. A strike in cell `J` therefore gets no whole-cell
/// sum, only the partial-cell triangle and the `PR` term. Summing a
/// reversed range there would also pick up `J` and the ghost cell `J+1`,
/// which adds terms of the order of the discretisation error.
pub fn price_call(strike: Real, density: &FdSabrDensity) -> Real {
    if strike.is_nan() {
        return Real::NAN;
    }
    let model = density.model();
    let mesh = density.mesh();
    let k = strike + model.shift;

    let zstrike = model.latent_of_strike(k);
    if zstrike <= mesh.zmin {
        return model.forward - strike;
    }
    if zstrike >= mesh.zmax {
        return 0.0;
    }

    let h = mesh.h;
    let last = mesh.interior_cells();
    let p = density.p();

    let mut price = (mesh.fmax - k) * density.pr();

    let k0 = (((zstrike - mesh.zmin) / h).ceil() as Size).clamp(1, last);
    let ftilde = model.make_forward(mesh.zmin + k0 as Real * h);
    let term = ftilde - k;
    if term > PARTIAL_CELL_THRESHOLD {
        let dfdz = (ftilde - mesh.fm[k0]) / (0.5 * h);
        price += 0.5 * term * term * p[k0] / dfdz;
    }

    // whole cells above the straddling one, up to the last interior cell
    price += h * (k0 + 1..=last)
        .map(|i| (mesh.fm[i] - k) * p[i])
        .sum::<Real>();
    price
}

/// Undiscounted put price at an unshifted strike, by parity with
/// [`price_call`].
pub fn price_put(strike: Real, density: &FdSabrDensity) -> Real {
    price_call(strike, density) - (density.model().forward - strike)
}
