//! # fb-methods
//!
//! Numerical methods for the free-boundary SABR model: a tridiagonal
//! operator with a Thomas-algorithm solver, and the finite-difference
//! machinery that evolves the SABR probability density on a transformed
//! grid and integrates it into option prices.
//!
//! # Modules
//!
//! * [`finite_differences`]: tridiagonal operator and solver
//! * [`fdsabr`]: coordinate transform, mesh, coefficients, implicit step,
//!   time schemes, density construction and call pricing

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Finite difference building blocks: the tridiagonal operator.
pub mod finite_differences;

/// Free-boundary SABR density PDE.
pub mod fdsabr;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use fdsabr::{
    build_density, build_density_observed, price_call, price_put, Coefficients, DensityState,
    FdSabrDensity, FdSabrMesh, FdSabrModel, FdSabrSettings, FdmScheme, ImplicitEuler,
    ImplicitStep, LatentMesh, LawsonSwayne, SabrBoundary, TimeScheme,
};
pub use finite_differences::TridiagonalOperator;
