//! Free-boundary SABR model definition: parameters, forward, expiry, shift
//! and boundary treatment.

use fb_core::{errors::Result, Real, Time};
use fb_math::SabrParameters;

use super::transform::{latent_of_intermediate, to_intermediate, SabrBoundary};

/// A SABR model instance to be solved on a finite-difference grid.
///
/// All grid work happens on the shifted forward `forward + shift`; prices
/// and strikes exchanged with callers are unshifted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdSabrModel {
    /// SABR parameters (α, β, ν, ρ).
    pub params: SabrParameters,
    /// Spot forward (unshifted).
    pub forward: Real,
    /// Time to expiry in years.
    pub expiry: Time,
    /// Displacement added to forward and strikes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shift: Real,
    /// Treatment of the forward at zero.
    #[cfg_attr(feature = "serde", serde(default))]
    pub boundary: SabrBoundary,
}

impl FdSabrModel {
    /// Create an unshifted free-boundary model.
    ///
    /// # Errors
    /// [`fb_core::Error::InvalidParameter`] if the parameters are outside
    /// the supported domain (see [`FdSabrModel::validate`]).
    pub fn new(params: SabrParameters, forward: Real, expiry: Time) -> Result<Self> {
        let model = Self {
            params,
            forward,
            expiry,
            shift: 0.0,
            boundary: SabrBoundary::Free,
        };
        model.validate()?;
        Ok(model)
    }

    /// Return a copy with the given displacement.
    pub fn with_shift(mut self, shift: Real) -> Result<Self> {
        self.shift = shift;
        self.validate()?;
        Ok(self)
    }

    /// Return a copy with the given boundary treatment.
    pub fn with_boundary(mut self, boundary: SabrBoundary) -> Result<Self> {
        self.boundary = boundary;
        self.validate()?;
        Ok(self)
    }

    /// Check every precondition of the density solve.
    pub fn validate(&self) -> Result<()> {
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
        let f = self.shifted_forward();
        fb_core::ensure!(
            f.is_finite() && f != 0.0,
            "shifted forward must be finite and non-zero, got {f}"
        );
        if self.boundary == SabrBoundary::Absorbing {
            fb_core::ensure!(
                f > 0.0,
                "absorbing boundary needs a positive shifted forward, got {f}"
            );
        }
        Ok(())
    }

    /// `forward + shift`.
    #[inline]
    pub fn shifted_forward(&self) -> Real {
        self.forward + self.shift
    }

    /// Intermediate variable at latent coordinate `z`.
    #[inline]
    pub fn intermediate(&self, z: Real) -> Real {
        let p = &self.params;
        to_intermediate(p.alpha, p.nu, p.rho, z)
    }

    /// Shifted forward at latent coordinate `z`.
    #[inline]
    pub fn make_forward(&self, z: Real) -> Real {
        self.boundary
            .to_forward(self.shifted_forward(), self.params.beta, self.intermediate(z))
    }

    /// Latent coordinate at which the shifted forward equals `shifted_strike`.
    pub fn latent_of_strike(&self, shifted_strike: Real) -> Real {
        let p = &self.params;
        let y = self
            .boundary
            .intermediate_of_strike(shifted_strike, self.shifted_forward(), p.beta);
        latent_of_intermediate(p.alpha, p.nu, p.rho, y)
    }

    /// Latent coordinate where an absorbing forward reaches zero, if the
    /// boundary absorbs.
    pub fn absorption_point(&self) -> Option<Real> {
        match self.boundary {
            SabrBoundary::Free => None,
            SabrBoundary::Absorbing => Some(self.latent_of_strike(0.0)),
        }
    }
}
