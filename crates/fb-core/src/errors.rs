//! Error types for fbsabr.
//!
//! A single `thiserror`-derived enum covers the whole workspace. Input
//! validation goes through `ensure!` (an [`Error::InvalidParameter`]), checks
//! on computed grids and solves go through `ensure_post!` (an
//! [`Error::NumericalFailure`]), and `fail!` covers everything else.

use thiserror::Error;

/// The top-level error type used throughout fbsabr.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A model or grid parameter is outside its domain. Raised before any
    /// grid is built.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A grid or linear solve produced a non-monotonic or non-finite result.
    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),
}

impl Error {
    /// `true` for [`Error::InvalidParameter`].
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Error::InvalidParameter(_))
    }

    /// `true` for [`Error::NumericalFailure`].
    pub fn is_numerical_failure(&self) -> bool {
        matches!(self, Error::NumericalFailure(_))
    }
}

/// Shorthand `Result` type used throughout fbsabr.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Precondition check on inputs.
///
/// Returns `Err(Error::InvalidParameter(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fb_core::{ensure, errors::Error};
/// fn positive(x: f64) -> fb_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidParameter(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidParameter(
                format!($($msg)*)
            ));
        }
    };
}

/// Postcondition check on computed values.
///
/// Returns `Err(Error::NumericalFailure(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fb_core::{ensure_post, errors::Error};
/// fn halve(x: f64) -> fb_core::errors::Result<f64> {
///     let result = x / 2.0;
///     ensure_post!(result.is_finite(), "result must be finite, got {result}");
///     Ok(result)
/// }
/// assert!(halve(1.0).is_ok());
/// assert!(matches!(halve(f64::NAN), Err(Error::NumericalFailure(_))));
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::NumericalFailure(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use fb_core::{fail, errors::Error};
/// fn always_err() -> fb_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
