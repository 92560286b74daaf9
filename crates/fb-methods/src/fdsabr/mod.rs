//! Finite-difference density of the free-boundary SABR model.
//!
//! The SABR forward is written as a deterministic function of a latent
//! coordinate `z`. The Fokker-Planck equation for the probability mass in
//! `z` is solved on a uniform `z` grid, whose cells map to a non-uniform
//! forward grid. Mass leaving the truncated domain is accumulated in two
//! boundary buckets. Calls are priced by integrating the terminal density
//! against the payoff.
//!
//! Pipeline, leaves first:
//!
//! 1. [`transform`]: `z → y → F` maps and their inverses
//! 2. [`mesh`]: latent grid with the spot at a cell centre, cell forwards
//! 3. [`coefficients`]: local volatility `Cm` and drift correction `Gammam`
//! 4. [`step`]: one implicit step: tridiagonal solve and boundary fluxes
//! 5. [`scheme`]: time schemes (Lawson-Swayne composition, implicit Euler)
//! 6. [`density`]: builds the terminal density
//! 7. [`pricing`]: call and put prices from the density
//!
//! # Example
//! ```
//! use fb_math::SabrParameters;
//! use fb_methods::fdsabr::{build_density, FdSabrModel, FdSabrSettings};
//!
//! let params = SabrParameters::new(0.3, 0.5, 0.4, -0.2);
//! let model = FdSabrModel::new(params, 100.0, 1.0).unwrap();
//! let density = build_density(&model, &FdSabrSettings::new(100, 10)).unwrap();
//! let atm = density.call_price(100.0);
//! assert!(atm > 0.0 && atm < 100.0);
//! ```

pub mod coefficients;
pub mod density;
pub mod mesh;
pub mod model;
pub mod pricing;
pub mod scheme;
pub mod settings;
pub mod step;
pub mod transform;

pub use coefficients::Coefficients;
pub use density::{build_density, build_density_observed, FdSabrDensity};
pub use mesh::{FdSabrMesh, LatentMesh};
pub use model::FdSabrModel;
pub use pricing::{price_call, price_put};
pub use scheme::{integrate, FdmScheme, ImplicitEuler, LawsonSwayne, TimeScheme};
pub use settings::FdSabrSettings;
pub use step::{DensityState, ImplicitStep};
pub use transform::SabrBoundary;
