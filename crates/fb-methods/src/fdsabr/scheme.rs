//! Time schemes driving [`ImplicitStep`] through the expiry.
//!
//! The drift correction enters through the decay weights `E`, which are
//! multiplied by `exp(ρνα·Γ·dt)` before each implicit solve. A scheme owns
//! the order of those multiplications relative to the solves.

use std::f64::consts::SQRT_2;
use std::fmt;

use fb_core::{errors::Result, Real, Size};

use super::step::{DensityState, ImplicitStep};

/// Available time schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmScheme {
    /// Two implicit sub-steps of `b·dt` and an extrapolation; second order.
    #[default]
    LawsonSwayne,
    /// A single implicit step of `dt`; first order.
    ImplicitEuler,
}

impl FdmScheme {
    /// Instantiate the scheme for period `dt` and per-cell drift rates.
    pub fn build(self, dt: Real, drift: &[Real]) -> Box<dyn TimeScheme> {
        match self {
            FdmScheme::LawsonSwayne => Box::new(LawsonSwayne::new(dt, drift)),
            FdmScheme::ImplicitEuler => Box::new(ImplicitEuler::new(dt, drift)),
        }
    }
}

/// One period of time integration.
pub trait TimeScheme: fmt::Debug {
    /// Advance `state` by one period, updating the decay weights `em` in
    /// place.
    fn advance(
        &self,
        step: &ImplicitStep<'_>,
        em: &mut [Real],
        state: &DensityState,
    ) -> Result<DensityState>;
}

/// `exp(rate·dt)` per cell, with the ghost cells copied from their
/// neighbours.
pub fn decay_multipliers(drift: &[Real], dt: Real) -> Vec<Real> {
    let mut m: Vec<Real> = drift.iter().map(|d| (d * dt).exp()).collect();
    let n = m.len();
    if n >= 2 {
        m[0] = m[1];
        m[n - 1] = m[n - 2];
    }
    m
}

fn scale_in_place(em: &mut [Real], by: &[Real]) {
    for (e, m) in em.iter_mut().zip(by) {
        *e *= m;
    }
}

// ─── Lawson-Swayne ────────────────────────────────────────────────────────────

/// Lawson-Swayne composition: two backward-Euler sub-steps of `b·dt`,
/// `b = 1 − √2/2`, combined as `(√2+1)·P₂ − √2·P₁`. The weights are
/// advanced by `b·dt` before each sub-step and by `(1−2b)·dt` after the
/// combination.
#[derive(Debug, Clone)]
pub struct LawsonSwayne {
    dt1: Real,
    emdt1: Vec<Real>,
    emdt2: Vec<Real>,
}

impl LawsonSwayne {
    /// Sub-step fraction `b`.
    pub const B: Real = 1.0 - SQRT_2 / 2.0;

    /// Scheme for period `dt`.
    pub fn new(dt: Real, drift: &[Real]) -> Self {
        let dt1 = Self::B * dt;
        let dt2 = (1.0 - 2.0 * Self::B) * dt;
        Self {
            dt1,
            emdt1: decay_multipliers(drift, dt1),
            emdt2: decay_multipliers(drift, dt2),
        }
    }
}

impl TimeScheme for LawsonSwayne {
    fn advance(
        &self,
        step: &ImplicitStep<'_>,
        em: &mut [Real],
        state: &DensityState,
    ) -> Result<DensityState> {
        scale_in_place(em, &self.emdt1);
        let first = step.advance(em, self.dt1, state)?;
        scale_in_place(em, &self.emdt1);
        let second = step.advance(em, self.dt1, &first)?;
        let next = second.combine(SQRT_2 + 1.0, &first, -SQRT_2);
        scale_in_place(em, &self.emdt2);
        Ok(next)
    }
}

// ─── Implicit Euler ───────────────────────────────────────────────────────────

/// Backward Euler over the whole period.
#[derive(Debug, Clone)]
pub struct ImplicitEuler {
    dt: Real,
    emdt: Vec<Real>,
}

impl ImplicitEuler {
    /// Scheme for period `dt`.
    pub fn new(dt: Real, drift: &[Real]) -> Self {
        Self {
            dt,
            emdt: decay_multipliers(drift, dt),
        }
    }
}

impl TimeScheme for ImplicitEuler {
    fn advance(
        &self,
        step: &ImplicitStep<'_>,
        em: &mut [Real],
        state: &DensityState,
    ) -> Result<DensityState> {
        scale_in_place(em, &self.emdt);
        step.advance(em, self.dt, state)
    }
}

// ─── Driver ───────────────────────────────────────────────────────────────────

/// Run `periods` periods of `scheme` from `initial`, calling `observer`
/// with the 1-based period index and the state after each period.
pub fn integrate<O>(
    scheme: &dyn TimeScheme,
    step: &ImplicitStep<'_>,
    em: &mut [Real],
    initial: DensityState,
    periods: Size,
    mut observer: O,
) -> Result<DensityState>
where
    O: FnMut(Size, &DensityState),
{
    let mut state = initial;
    for period in 1..=periods {
        state = scheme.advance(step, em, &state)?;
        tracing::trace!(
            period,
            mass = state.mass(step.h()),
            pl = state.pl,
            pr = state.pr,
            "density period"
        );
        observer(period, &state);
    }
    Ok(state)
}
