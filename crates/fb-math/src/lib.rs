//! # fb-math
//!
//! Mathematical utilities: floating-point comparison, the normal
//! distribution (via statrs), linear interpolation and the Hagan SABR
//! implied-volatility expansion.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Floating-point comparison utilities.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

/// 1D interpolation schemes and the SABR smile formula.
pub mod interpolations;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use comparison::{close, close_enough};
pub use distributions::{normal_cdf, normal_pdf};
pub use interpolations::sabr::{sabr_volatility, SabrParameters};
pub use interpolations::{Interpolation1D, LinearInterpolation};
