//! Undiscounted Black formula and its inversion.
//!
//! ```text
//! C = F·N(d₁) − K·N(d₂),   d₁,₂ = ln(F/K)/s ± s/2
//! ```
//!
//! where `s = σ√T` is the total standard deviation. Shifted-lognormal
//! quotes use the same formula on `F + shift`, `K + shift`.

use fb_core::{
    errors::{Error, Result},
    Real,
};
use fb_math::{close_enough, normal_cdf, normal_pdf};
use tracing::trace;

/// Lower end of the implied standard deviation bracket.
const MIN_STD_DEV: Real = 1e-12;
/// Upper end of the implied standard deviation bracket.
const MAX_STD_DEV: Real = 10.0;
/// Absolute accuracy of the implied standard deviation.
const STD_DEV_ACCURACY: Real = 1e-12;
const MAX_ITERATIONS: usize = 100;

fn d1(forward: Real, strike: Real, std_dev: Real) -> Real {
    (forward / strike).ln() / std_dev + 0.5 * std_dev
}

/// Undiscounted Black call price with total standard deviation `std_dev`.
///
/// Degenerates to intrinsic value for a non-positive forward, strike or
/// standard deviation.
pub fn black_formula(forward: Real, strike: Real, std_dev: Real) -> Real {
    let intrinsic = (forward - strike).max(0.0);
    if std_dev <= 0.0 || forward <= 0.0 || strike <= 0.0 {
        return intrinsic;
    }
    let d1 = d1(forward, strike, std_dev);
    let d2 = d1 - std_dev;
    forward * normal_cdf(d1) - strike * normal_cdf(d2)
}

/// Sensitivity of [`black_formula`] to the total standard deviation,
/// `F·φ(d₁)`. Zero wherever the price degenerates to intrinsic value.
pub fn black_std_dev_derivative(forward: Real, strike: Real, std_dev: Real) -> Real {
    if std_dev <= 0.0 || forward <= 0.0 || strike <= 0.0 {
        return 0.0;
    }
    forward * normal_pdf(d1(forward, strike, std_dev))
}

/// Total standard deviation `σ√T` reproducing an undiscounted call price.
///
/// A price within a few ulps of intrinsic value gives zero.
///
/// # Errors
/// [`fb_core::Error::InvalidParameter`] for a non-positive forward or
/// strike, or a price outside `[max(F − K, 0), F)` or above the Black price
/// at the largest admitted standard deviation;
/// [`fb_core::Error::NumericalFailure`] if the search does not settle.
pub fn implied_std_dev(forward: Real, strike: Real, price: Real) -> Result<Real> {
    fb_core::ensure!(
        forward > 0.0 && strike > 0.0,
        "Black implied volatility needs positive forward and strike, got {forward} and {strike}"
    );
    let intrinsic = (forward - strike).max(0.0);
    fb_core::ensure!(
        price.is_finite() && price >= intrinsic && price < forward,
        "call price {price} outside the no-arbitrage range [{intrinsic}, {forward})"
    );
    if close_enough(price, intrinsic, 4) {
        return Ok(0.0);
    }
    fb_core::ensure!(
        black_formula(forward, strike, MAX_STD_DEV) > price,
        "call price {price} needs a standard deviation above {MAX_STD_DEV}"
    );

    let std_dev = search_std_dev(forward, strike, price)?;
    trace!(forward, strike, price, std_dev, "implied standard deviation");
    Ok(std_dev)
}

/// Newton iteration on the Black price, kept inside a bracket that shrinks
/// every step.
///
/// The price increases with the standard deviation, so the sign of the
/// residual tells which side of the root an iterate lies on. Steps leaving
/// the bracket, or taken where the derivative has underflowed, fall back to
/// bisection. The start `√(2|ln F/K|)` is the inflection point of the price,
/// from where Newton converges monotonically.
fn search_std_dev(forward: Real, strike: Real, price: Real) -> Result<Real> {
    let (mut lo, mut hi) = (MIN_STD_DEV, MAX_STD_DEV);
    let mut s = (2.0 * (forward / strike).ln().abs()).sqrt().clamp(lo, hi);

    for _ in 0..MAX_ITERATIONS {
        let residual = black_formula(forward, strike, s) - price;
        if residual == 0.0 {
            return Ok(s);
        }
        if residual > 0.0 {
            hi = s;
        } else {
            lo = s;
        }

        let slope = black_std_dev_derivative(forward, strike, s);
        let newton = s - residual / slope;
        let next = if slope > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        if (next - s).abs() <= STD_DEV_ACCURACY || hi - lo <= STD_DEV_ACCURACY {
            return Ok(next);
        }
        s = next;
    }
    Err(Error::NumericalFailure(format!(
        "implied standard deviation for price {price} at strike {strike} did not settle \
         within {MAX_ITERATIONS} iterations"
    )))
}
