//! # fb-engines
//!
//! Smile sections and the Black formula on top of the free-boundary SABR
//! density.
//!
//! ## Engines
//!
//! - [`FdSabrSmileSection`]: prices, density and implied volatility from one PDE solve
//! - [`HaganSabrSection`]: Hagan et al. (2002) closed-form smile, for cross-checks
//! - [`black_formula`] / [`implied_std_dev`]: undiscounted Black call and its inverse

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_formula;
pub mod fd_sabr_engine;
pub mod hagan;

pub use black_formula::{black_formula, black_std_dev_derivative, implied_std_dev};
pub use fd_sabr_engine::FdSabrSmileSection;
pub use hagan::HaganSabrSection;
