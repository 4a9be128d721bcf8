//! Functions to locate zeros of sampled (continuous) functions: a sign-change
//! scan over the samples followed by bracketed refinement against the
//! underlying function.
//!
//! ```
//! use ndarray as nd;
//! use vmodes::interp::{ Zero, find_zeros };
//!
//! let f = |x: f64| (x + 3.0) * (x - 0.5) * (x - 2.0);
//! let x: nd::Array1<f64> = nd::Array::linspace(-5.0, 5.0, 1000);
//! let zeros = find_zeros(&x, f, Zero::All, 1e-12, 1000).unwrap();
//! assert!(
//!     [-3.0, 0.5, 2.0].into_iter()
//!         .zip(zeros)
//!         .all(|(expected, computed)| (computed - expected).abs() < 1e-9)
//! )
//! ```

use ndarray as nd;
use crate::{ Arr1, error::RootError };

pub type RootResult<T> = Result<T, RootError>;

/// Specifies a set of zeros to look for in [`sign_changes`] and
/// [`find_zeros`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Zero {
    /// Points at which a function changes from positive to negative.
    Falling,
    /// Points at which a function changes from negative to positive.
    Rising,
    /// Either/both of the above.
    All,
}

impl Zero {
    fn matches(&self, a: f64, b: f64) -> bool {
        match self {
            Self::Falling => a > 0.0 && b < 0.0,
            Self::Rising => a < 0.0 && b > 0.0,
            Self::All => a * b < 0.0,
        }
    }
}

/// A located sign change.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Crossing {
    /// A sample sits exactly on the zero, with a sign change across it.
    Exact(f64),
    /// The zero lies strictly between two samples, which are adjacent unless a
    /// run of zero samples separates them.
    Bracket(f64, f64),
}

/// Scan a sampled function for sign changes of a given kind.
///
/// Only genuine sign changes are reported: runs of exactly-zero samples are
/// skipped over and the samples on either side of them compared, so that a
/// function that touches (or stays at) zero without crossing produces nothing.
/// A crossing through a single zero sample is reported as exact; one through
/// a longer run of zeros is bracketed by the nonzero samples around the run.
/// Samples at either end of the array are never reported as exact zeros.
pub fn sign_changes<S, T>(data_x: &Arr1<S>, data_y: &Arr1<T>, kind: Zero)
    -> Vec<Crossing>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    let n = data_x.len().min(data_y.len());
    let mut crossings: Vec<Crossing> = Vec::new();
    // index of the last nonzero sample
    let mut last: Option<usize> = None;
    for i in 0..n {
        let y = data_y[i];
        if y == 0.0 { continue; }
        if let Some(j) = last {
            if kind.matches(data_y[j], y) {
                let crossing
                    = if i - j == 2 {
                        Crossing::Exact(data_x[j + 1])
                    } else {
                        Crossing::Bracket(data_x[j], data_x[i])
                    };
                crossings.push(crossing);
            }
        }
        last = Some(i);
    }
    crossings
}

/// Refine a bracketed zero of `f` using the Illinois variant of the
/// false-position method.
///
/// Iteration stops when either the bracket width or the last update falls
/// below the absolute tolerance `epsilon`. Returns [`RootError::NoBracket`]
/// if `f` does not change sign over the bracket, and [`RootError::MaxIters`]
/// if the tolerance is not met within `maxiters` iterations.
pub fn refine_root<F>(
    mut f: F,
    bracket: (f64, f64),
    epsilon: f64,
    maxiters: usize,
) -> RootResult<f64>
where F: FnMut(f64) -> f64
{
    RootError::check_epsilon(epsilon)?;
    RootError::check_maxiters(maxiters)?;

    let (mut a, mut b) = bracket;
    let (mut fa, mut fb) = (f(a), f(b));
    if fa == 0.0 { return Ok(a); }
    if fb == 0.0 { return Ok(b); }
    if !(fa * fb < 0.0) { return Err(RootError::NoBracket(a, b)); }

    // which end was retained on the previous step: -1 => a, +1 => b
    let mut side: i8 = 0;
    let mut c = a;
    for _ in 0..maxiters {
        let clast = c;
        c = (fa * b - fb * a) / (fa - fb);
        let fc = f(c);
        if fc == 0.0 { return Ok(c); }
        if fc * fb > 0.0 {
            b = c;
            fb = fc;
            if side == -1 { fa /= 2.0; }
            side = -1;
        } else {
            a = c;
            fa = fc;
            if side == 1 { fb /= 2.0; }
            side = 1;
        }
        if (b - a).abs() < epsilon || (c - clast).abs() < epsilon {
            return Ok(c);
        }
    }
    Err(RootError::MaxIters(maxiters))
}

/// Return a list of all zeros of a given kind in `f`, located by a
/// sign-change scan over the sample points `data_x` and refined with
/// [`refine_root`].
pub fn find_zeros<S, F>(
    data_x: &Arr1<S>,
    mut f: F,
    kind: Zero,
    epsilon: f64,
    maxiters: usize,
) -> RootResult<Vec<f64>>
where
    S: nd::Data<Elem = f64>,
    F: FnMut(f64) -> f64,
{
    let data_y: nd::Array1<f64> = data_x.mapv(&mut f);
    sign_changes(data_x, &data_y, kind).into_iter()
        .map(|crossing| {
            match crossing {
                Crossing::Exact(x) => Ok(x),
                Crossing::Bracket(a, b)
                    => refine_root(&mut f, (a, b), epsilon, maxiters),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use super::*;

    #[test]
    fn sign_changes_by_kind() {
        let x = nd::array![-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let y = x.mapv(|xk: f64| xk.sin());
        let all = sign_changes(&x, &y, Zero::All);
        assert_eq!(all, vec![Crossing::Exact(0.0)]);
        let falling = sign_changes(&x, &y, Zero::Falling);
        assert!(falling.is_empty());
    }

    #[test]
    fn touching_zero_is_not_a_crossing() {
        let x = nd::array![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = nd::array![1.0, 0.0, 0.0, 1.0, -1.0];
        let c = sign_changes(&x, &y, Zero::All);
        assert_eq!(c, vec![Crossing::Bracket(3.0, 4.0)]);
    }

    #[test]
    fn crossing_through_zero_run() {
        let x = nd::array![0.0, 1.0, 2.0, 3.0];
        let y = nd::array![1.0, 0.0, 0.0, -1.0];
        assert_eq!(sign_changes(&x, &y, Zero::All), vec![Crossing::Bracket(0.0, 3.0)]);
        assert_eq!(sign_changes(&x, &y, Zero::Falling), vec![Crossing::Bracket(0.0, 3.0)]);
        assert!(sign_changes(&x, &y, Zero::Rising).is_empty());
        // leading and trailing zeros are never crossings
        let y = nd::array![0.0, 0.0, -1.0, 0.0];
        assert!(sign_changes(&x, &y, Zero::All).is_empty());
        let r = find_zeros(
            &x, |xk| if xk < 0.5 { 1.0 } else if xk < 2.5 { 0.0 } else { -1.0 },
            Zero::All, 1e-12, 100,
        ).unwrap();
        assert_eq!(r.len(), 1);
        assert!(r[0] >= 0.5 && r[0] < 2.5);
    }

    #[test]
    fn illinois_converges() {
        let r = refine_root(|x| x.powi(3) - 2.0, (0.0, 3.0), 1e-14, 200).unwrap();
        assert_abs_diff_eq!(r, 2.0_f64.cbrt(), epsilon = 1e-12);
        let r = refine_root(|x| (-x).exp() - 0.5, (0.0, 2.0), 1e-14, 200).unwrap();
        assert_abs_diff_eq!(r, 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn refine_root_errors() {
        assert!(matches!(
            refine_root(|x| x * x + 1.0, (-1.0, 1.0), 1e-12, 100),
            Err(RootError::NoBracket(..))
        ));
        assert!(matches!(
            refine_root(|x| x, (-1.0, 2.0), 0.0, 100),
            Err(RootError::BadEpsilon(..))
        ));
        assert!(matches!(
            refine_root(|x| x.powi(3) - 2.0, (0.0, 3.0), 1e-15, 1),
            Err(RootError::MaxIters(1))
        ));
    }
}
