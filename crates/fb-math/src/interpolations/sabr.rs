//! SABR (Stochastic Alpha Beta Rho) parameters and the Hagan et al. (2002)
//! implied-volatility expansion.
//!
//! The finite-difference solver never evaluates the expansion. It is kept
//! here as the closed-form reference that PDE prices are cross-checked
//! against.

use fb_core::{errors::Result, Real, Time, Volatility};

/// SABR model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SabrParameters {
    /// Alpha (initial volatility level)
    pub alpha: Real,
    /// Beta (CEV exponent, 0 = normal, 1 = log-normal)
    pub beta: Real,
    /// Nu (vol-of-vol)
    pub nu: Real,
    /// Rho (correlation between asset and vol increments)
    pub rho: Real,
}

impl SabrParameters {
    /// Create a parameter set without validation.
    pub fn new(alpha: Real, beta: Real, nu: Real, rho: Real) -> Self {
        Self {
            alpha,
            beta,
            nu,
            rho,
        }
    }

    /// Check the parameters against the domain the PDE solver supports:
    /// `alpha > 0`, `0 < beta < 1`, `nu > 0`, `|rho| < 1`.
    pub fn validate(&self) -> Result<()> {
        fb_core::ensure!(
            self.alpha.is_finite() && self.alpha > 0.0,
            "SABR: alpha must be > 0, got {}",
            self.alpha
        );
        fb_core::ensure!(
            self.beta > 0.0 && self.beta < 1.0,
            "SABR: beta must lie in (0, 1), got {}",
            self.beta
        );
        fb_core::ensure!(
            self.nu.is_finite() && self.nu > 0.0,
            "SABR: nu must be > 0, got {}",
            self.nu
        );
        fb_core::ensure!(
            self.rho.abs() < 1.0,
            "SABR: |rho| must be < 1, got {}",
            self.rho
        );
        Ok(())
    }
}

/// Compute the SABR implied (Black) volatility using the Hagan et al. (2002) formula.
///
/// # Arguments
/// * `f`: forward rate (> 0)
/// * `k`: strike (> 0)
/// * `t`: time to expiry (years)
/// * `p`: SABR parameters
///
/// Returns implied Black volatility σ_B(K).
pub fn sabr_volatility(f: Real, k: Real, t: Time, p: &SabrParameters) -> Volatility {
    let alpha = p.alpha;
    let beta = p.beta;
    let nu = p.nu;
    let rho = p.rho;

    // Handle ATM case (f ≈ K)
    let fk = f * k;
    if (f - k).abs() < 1e-12 * f.abs().max(1e-30) {
        return sabr_volatility_atm(f, t, p);
    }

    let one_minus_beta = 1.0 - beta;

    let fk_beta = fk.powf(one_minus_beta);
    let log_fk = (f / k).ln();
    let fk_half_beta = fk.powf(one_minus_beta / 2.0);

    // z = (nu / alpha) * (f*k)^((1-β)/2) * ln(f/k)
    let z = (nu / alpha) * fk_half_beta * log_fk;

    // x(z) = ln((√(1 - 2ρz + z²) + z - ρ) / (1 - ρ))
    let sqrt_arg = 1.0 - 2.0 * rho * z + z * z;
    let sqrt_val = sqrt_arg.max(0.0).sqrt();
    let xz = ((sqrt_val + z - rho) / (1.0 - rho)).ln();

    if xz.abs() < 1e-15 {
        return sabr_volatility_atm(f, t, p);
    }

    let a = one_minus_beta * one_minus_beta;

    let numer = alpha;
    let denom = fk_half_beta * (1.0 + a / 24.0 * log_fk * log_fk + a * a / 1920.0 * log_fk.powi(4));

    let ratio = z / xz;

    let correction = 1.0
        + (a / 24.0 * alpha * alpha / fk_beta
            + 0.25 * rho * beta * nu * alpha / fk_half_beta
            + (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu)
            * t;

    numer / denom * ratio * correction
}

/// SABR ATM volatility (f = K).
fn sabr_volatility_atm(f: Real, t: Time, p: &SabrParameters) -> Volatility {
    let alpha = p.alpha;
    let beta = p.beta;
    let nu = p.nu;
    let rho = p.rho;

    let one_minus_beta = 1.0 - beta;
    let f_beta = f.powf(one_minus_beta);

    let term1 = one_minus_beta * one_minus_beta / 24.0 * alpha * alpha / (f_beta * f_beta);
    let term2 = 0.25 * rho * beta * nu * alpha / f_beta;
    let term3 = (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu;

    alpha / f_beta * (1.0 + (term1 + term2 + term3) * t)
}
