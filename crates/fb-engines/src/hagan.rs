//! Closed-form SABR smile from the Hagan et al. (2002) expansion.
//!
//! Prices are Black prices at the expansion's implied volatility, and the
//! density is their second strike difference. This section is independent
//! of the PDE solve; it serves as the reference PDE results are compared
//! with.

use fb_core::{errors::Result, Real, Time, Volatility};
use fb_math::{sabr_volatility, SabrParameters};

use crate::black_formula::black_formula;

/// Hagan SABR smile at one expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaganSabrSection {
    params: SabrParameters,
    forward: Real,
    expiry: Time,
    shift: Real,
}

impl HaganSabrSection {
    /// Create an unshifted section.
    ///
    /// # Errors
    /// [`fb_core::Error::InvalidParameter`] for invalid parameters, a
    /// non-positive expiry or a non-positive forward.
    pub fn new(params: SabrParameters, forward: Real, expiry: Time) -> Result<Self> {
        let section = Self {
            params,
            forward,
            expiry,
            shift: 0.0,
        };
        section.validate()?;
        Ok(section)
    }

    /// Return a copy quoting shifted-lognormal volatilities.
    pub fn with_shift(mut self, shift: Real) -> Result<Self> {
        self.shift = shift;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        self.params.validate()?;
        fb_core::ensure!(
            self.expiry.is_finite() && self.expiry > 0.0,
            "expiry must be > 0, got {}",
            self.expiry
        );
        fb_core::ensure!(
            self.shift.is_finite() && self.shift >= 0.0,
            "shift must be finite and >= 0, got {}",
            self.shift
        );
        let f = self.forward + self.shift;
        fb_core::ensure!(
            f.is_finite() && f > 0.0,
            "Hagan expansion needs a positive shifted forward, got {f}"
        );
        Ok(())
    }

    /// The forward.
    pub fn forward(&self) -> Real {
        self.forward
    }

    /// Time to expiry.
    pub fn exercise_time(&self) -> Time {
        self.expiry
    }

    /// Shifted-lognormal implied volatility. Zero for strikes at or below
    /// `−shift`.
    pub fn volatility(&self, strike: Real) -> Volatility {
        let k = strike + self.shift;
        if k <= 0.0 {
            return 0.0;
        }
        sabr_volatility(self.forward + self.shift, k, self.expiry, &self.params)
    }

    /// Undiscounted call price.
    pub fn call_price(&self, strike: Real) -> Real {
        let std_dev = self.volatility(strike) * self.expiry.sqrt();
        black_formula(self.forward + self.shift, strike + self.shift, std_dev)
    }

    /// Undiscounted put price.
    pub fn put_price(&self, strike: Real) -> Real {
        self.call_price(strike) - (self.forward - strike)
    }

    /// Density implied by the call prices, `∂²C/∂K²`. Negative where the
    /// expansion admits butterfly arbitrage.
    pub fn density(&self, strike: Real) -> Real {
        let eps = (strike + self.shift).max(1e-3) * 1e-3;
        (self.call_price(strike + eps) - 2.0 * self.call_price(strike)
            + self.call_price(strike - eps))
            / (eps * eps)
    }
}
