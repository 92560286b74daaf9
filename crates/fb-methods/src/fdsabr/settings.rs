//! Grid and time-stepping configuration.

use fb_core::{errors::Result, Real, Size};

use super::scheme::FdmScheme;

/// Numerical settings of a density solve.
///
/// With the `serde` feature every field is optional in a config document;
/// missing fields take their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FdSabrSettings {
    /// Total number of cells `N`, boundary cells included (`J = N − 2`
    /// interior cells).
    pub size: Size,
    /// Number of time periods over the expiry.
    pub time_steps: Size,
    /// Half-width of the latent domain in units of `√T`.
    pub std_devs: Real,
    /// Time-stepping scheme.
    pub scheme: FdmScheme,
}

impl Default for FdSabrSettings {
    fn default() -> Self {
        Self {
            size: 200,
            time_steps: 100,
            std_devs: 4.0,
            scheme: FdmScheme::LawsonSwayne,
        }
    }
}

impl FdSabrSettings {
    /// Settings with the given grid size and number of time steps, default
    /// domain width and scheme.
    pub fn new(size: Size, time_steps: Size) -> Self {
        Self {
            size,
            time_steps,
            ..Self::default()
        }
    }

    /// Set the latent half-width multiplier.
    pub fn with_std_devs(mut self, std_devs: Real) -> Self {
        self.std_devs = std_devs;
        self
    }

    /// Set the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Number of interior cells `J`.
    pub fn interior_cells(&self) -> Size {
        self.size.saturating_sub(2)
    }

    /// Check the grid and time-step counts.
    pub fn validate(&self) -> Result<()> {
        fb_core::ensure!(self.size >= 4, "grid size must be >= 4, got {}", self.size);
        fb_core::ensure!(
            self.time_steps >= 1,
            "need at least one time step, got {}",
            self.time_steps
        );
        fb_core::ensure!(
            self.std_devs.is_finite() && self.std_devs > 0.0,
            "std_devs must be > 0, got {}",
            self.std_devs
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = FdSabrSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.interior_cells(), 198);
        assert_eq!(settings.scheme, FdmScheme::LawsonSwayne);
    }

    #[test]
    fn builders_override_fields() {
        let settings = FdSabrSettings::new(50, 5)
            .with_std_devs(6.0)
            .with_scheme(FdmScheme::ImplicitEuler);
        assert_eq!(settings.size, 50);
        assert_eq!(settings.time_steps, 5);
        assert_eq!(settings.std_devs, 6.0);
        assert_eq!(settings.scheme, FdmScheme::ImplicitEuler);
    }

    #[test]
    fn rejects_degenerate_grids() {
        for settings in [
            FdSabrSettings::new(3, 10),
            FdSabrSettings::new(100, 0),
            FdSabrSettings::new(100, 10).with_std_devs(0.0),
            FdSabrSettings::new(100, 10).with_std_devs(f64::INFINITY),
        ] {
            assert!(settings.validate().unwrap_err().is_invalid_parameter());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_documents_use_defaults() {
        let settings: FdSabrSettings =
            serde_json::from_str(r#"{ "size": 400, "scheme": "ImplicitEuler" }"#).unwrap();
        assert_eq!(settings.size, 400);
        assert_eq!(settings.time_steps, 100);
        assert_eq!(settings.std_devs, 4.0);
        assert_eq!(settings.scheme, FdmScheme::ImplicitEuler);
    }
}
