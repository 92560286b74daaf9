//! Smile section backed by a finite-difference SABR density.
//!
//! The density is solved once at construction. Prices, densities and
//! implied volatilities at any strike are then read off that single solve.

use fb_core::{errors::Result, Real, Time, Volatility};
use fb_math::{Interpolation1D, LinearInterpolation};
use fb_methods::{build_density, FdSabrDensity, FdSabrModel, FdSabrSettings};

use crate::{black_formula::implied_std_dev, hagan::HaganSabrSection};

/// Free-boundary SABR smile at one expiry.
#[derive(Debug, Clone)]
pub struct FdSabrSmileSection {
    density: FdSabrDensity,
    forward_density: LinearInterpolation,
}

impl FdSabrSmileSection {
    /// Solve the density of `model` with `settings`.
    ///
    /// # Errors
    /// Whatever [`build_density`] reports.
    pub fn new(model: FdSabrModel, settings: &FdSabrSettings) -> Result<Self> {
        let density = build_density(&model, settings)?;
        let forwards = density.forwards();
        let q = density.probability_density();
        let last = forwards.len() - 1;
        let forward_density = LinearInterpolation::new(&forwards[1..last], &q[1..last])?;
        Ok(Self {
            density,
            forward_density,
        })
    }

    /// The model.
    pub fn model(&self) -> &FdSabrModel {
        self.density.model()
    }

    /// The solved density.
    pub fn density_solution(&self) -> &FdSabrDensity {
        &self.density
    }

    /// The forward (unshifted).
    pub fn forward(&self) -> Real {
        self.model().forward
    }

    /// Time to expiry.
    pub fn exercise_time(&self) -> Time {
        self.model().expiry
    }

    /// Displacement of the shifted-lognormal quotes.
    pub fn shift(&self) -> Real {
        self.model().shift
    }

    /// Undiscounted call price.
    pub fn call_price(&self, strike: Real) -> Real {
        self.density.call_price(strike)
    }

    /// Undiscounted put price.
    pub fn put_price(&self, strike: Real) -> Real {
        self.density.put_price(strike)
    }

    /// Density of the forward at `strike`, interpolated linearly between
    /// interior cells; zero outside them.
    pub fn density(&self, strike: Real) -> Real {
        if self.forward_density.is_in_range(strike) {
            self.forward_density.operator(strike)
        } else {
            0.0
        }
    }

    /// Shifted-lognormal implied volatility of the PDE call price.
    ///
    /// # Errors
    /// [`fb_core::Error::InvalidParameter`] if the shifted strike is not
    /// positive or the price admits no Black volatility.
    pub fn volatility(&self, strike: Real) -> Result<Volatility> {
        let shift = self.shift();
        let std_dev = implied_std_dev(
            self.forward() + shift,
            strike + shift,
            self.call_price(strike),
        )?;
        Ok(std_dev / self.exercise_time().sqrt())
    }

    /// Hagan expansion volatility for the same model.
    ///
    /// # Errors
    /// [`fb_core::Error::InvalidParameter`] if the shifted forward is not
    /// positive.
    pub fn hagan_volatility(&self, strike: Real) -> Result<Volatility> {
        let model = self.model();
        let hagan = HaganSabrSection::new(model.params, model.forward, model.expiry)?
            .with_shift(model.shift)?;
        Ok(hagan.volatility(strike))
    }
}
