//! # fbsabr
//!
//! Free-boundary SABR densities and option prices from a finite-difference
//! solve of the SABR Fokker-Planck equation.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `fb-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! fbsabr = "0.1"
//! ```
//!
//! ```rust
//! use fbsabr::math::SabrParameters;
//! use fbsabr::methods::{build_density, FdSabrModel, FdSabrSettings};
//!
//! let params = SabrParameters::new(0.3, 0.5, 0.4, -0.2);
//! let model = FdSabrModel::new(params, 100.0, 1.0)?;
//! let density = build_density(&model, &FdSabrSettings::new(200, 20))?;
//! assert!((density.total_mass() - 1.0).abs() < 1e-3);
//! let call = density.call_price(105.0);
//! assert!(call > 0.0 && call < density.call_price(100.0));
//! # Ok::<(), fbsabr::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use fb_core as core;

/// Mathematical utilities: comparison, distributions, interpolation,
/// Hagan SABR expansion.
pub use fb_math as math;

/// Tridiagonal operator and the free-boundary SABR density PDE.
pub use fb_methods as methods;

/// Black formula and SABR smile sections.
pub use fb_engines as engines;
