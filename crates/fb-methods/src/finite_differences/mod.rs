//! Finite difference building blocks.
//!
//! * [`TridiagonalOperator`]: tridiagonal matrix with a Thomas-algorithm
//!   solver, linear in the number of rows.

use fb_core::{errors::Result, Real, Size};

// ─── Tridiagonal operator ─────────────────────────────────────────────────────

/// A tridiagonal matrix operator.
///
/// Stores the lower, diagonal, and upper bands. Row `i` reads
/// `lower[i]·x[i-1] + diag[i]·x[i] + upper[i]·x[i+1]`.
#[derive(Debug, Clone)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused: starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused: ends at row n−2).
    pub upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: Size) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Solve `A · x = rhs` using the Thomas algorithm (LU decomposition
    /// for tridiagonal systems, no pivoting).
    ///
    /// # Errors
    /// [`fb_core::Error::InvalidParameter`] on a size mismatch;
    /// [`fb_core::Error::NumericalFailure`] on a vanishing or non-finite
    /// pivot, or a non-finite solution.
    pub fn solve(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let n = self.size();
        fb_core::ensure!(n > 0, "cannot solve an empty tridiagonal system");
        fb_core::ensure!(
            rhs.len() == n,
            "right-hand side of length {} for a system of size {n}",
            rhs.len()
        );

        // Forward sweep
        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];

        let m0 = self.diag[0];
        check_pivot(m0, 0)?;
        c_prime[0] = self.upper[0] / m0;
        d_prime[0] = rhs[0] / m0;

        for i in 1..n {
            let m = self.diag[i] - self.lower[i] * c_prime[i - 1];
            check_pivot(m, i)?;
            if i < n - 1 {
                c_prime[i] = self.upper[i] / m;
            }
            d_prime[i] = (rhs[i] - self.lower[i] * d_prime[i - 1]) / m;
        }

        // Back substitution
        let mut x = vec![0.0; n];
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }

        fb_core::ensure_post!(
            x.iter().all(|v| v.is_finite()),
            "tridiagonal solve produced non-finite values"
        );
        Ok(x)
    }
}

fn check_pivot(m: Real, row: Size) -> Result<()> {
    fb_core::ensure_post!(
        m.is_finite() && m.abs() > Real::MIN_POSITIVE,
        "singular tridiagonal system: pivot {m} in row {row}"
    );
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
