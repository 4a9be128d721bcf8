//! Single-domain Chebyshev primitives on the canonical interval [-1, 1].
//!
//! All grids here are Chebyshev extrema (Gauss-Lobatto) grids, ordered from
//! `x = +1` down to `x = -1`. Coefficient arrays hold the amplitudes `c[k]` of
//! `T_k(x)`, so that a series has the value
//! ```text
//! f(x) = Σ c[k] T_k(x),  k = 0, ..., n - 1
//! ```
//! on the canonical interval. Mapping to a physical interval `[lo, hi]` is
//! always affine, with `hi` corresponding to `x = +1`.

use std::{ cell::RefCell, f64::consts::PI };
use ndarray as nd;
use num_complex::Complex64 as C64;
use rustfft as fft;
use crate::Arr1;

/// Chebyshev extrema points `x[j] = cos(π j / (n - 1))`, ordered from +1 to -1.
///
/// *Panics if `n` is less than 2*.
pub fn lobatto(n: usize) -> nd::Array1<f64> {
    assert!(n >= 2, "lobatto grids need at least two points");
    let m = (n - 1) as f64;
    (0..n).map(|j| (PI * j as f64 / m).cos()).collect()
}

/// Affinely map canonical points onto the interval `[lo, hi]`.
pub fn to_interval<S>(x: &Arr1<S>, lo: f64, hi: f64) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    x.mapv(|xk| lo + (xk + 1.0) / 2.0 * (hi - lo))
}

/// Affinely map physical points in `[lo, hi]` onto the canonical interval,
/// clamping any round-off excursions to [-1, 1].
pub fn from_interval(t: f64, lo: f64, hi: f64) -> f64 {
    (2.0 * (t - lo) / (hi - lo) - 1.0).clamp(-1.0, 1.0)
}

/// Values of the first `n` Chebyshev polynomials and their first two
/// derivatives, evaluated at a set of points.
///
/// Each matrix has shape `[points × n]`, so that multiplying by a coefficient
/// array evaluates the series (or its derivative) at every point.
#[derive(Clone, Debug)]
pub struct Polynomials {
    /// `T_k(x_i)`
    pub t: nd::Array2<f64>,
    /// `T_k'(x_i)`
    pub dt: nd::Array2<f64>,
    /// `T_k''(x_i)`
    pub d2t: nd::Array2<f64>,
}

/// Evaluate the first `n` Chebyshev polynomials and their derivatives at
/// arbitrary points in [-1, 1] using the three-term recurrences
/// ```text
/// T_{k+1}   = 2x T_k - T_{k-1}
/// T_{k+1}'  = 2 T_k + 2x T_k' - T_{k-1}'
/// T_{k+1}'' = 4 T_k' + 2x T_k'' - T_{k-1}''
/// ```
pub fn polynomials<S>(x: &Arr1<S>, n: usize) -> Polynomials
where S: nd::Data<Elem = f64>
{
    let m = x.len();
    let mut t: nd::Array2<f64> = nd::Array2::zeros((m, n));
    let mut dt: nd::Array2<f64> = nd::Array2::zeros((m, n));
    let mut d2t: nd::Array2<f64> = nd::Array2::zeros((m, n));
    for (i, &xi) in x.iter().enumerate() {
        if n > 0 { t[[i, 0]] = 1.0; }
        if n > 1 {
            t[[i, 1]] = xi;
            dt[[i, 1]] = 1.0;
        }
        for k in 2..n {
            t[[i, k]] = 2.0 * xi * t[[i, k - 1]] - t[[i, k - 2]];
            dt[[i, k]]
                = 2.0 * t[[i, k - 1]] + 2.0 * xi * dt[[i, k - 1]]
                - dt[[i, k - 2]];
            d2t[[i, k]]
                = 4.0 * dt[[i, k - 1]] + 2.0 * xi * d2t[[i, k - 1]]
                - d2t[[i, k - 2]];
        }
    }
    Polynomials { t, dt, d2t }
}

// plans are cached per transform length by the planner itself
thread_local! {
    static PLANNER: RefCell<fft::FftPlanner<f64>> = RefCell::new(fft::FftPlanner::new());
}

// type-I discrete cosine transform
//
//   Y[k] = y[0] + (-1)^k y[N] + 2 Σ_{j=1}^{N-1} y[j] cos(π j k / N)
//
// computed as the FFT of the even extension [y0, ..., yN, y(N-1), ..., y1]
fn dct_i<S>(y: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    let n = y.len();
    if n < 2 { return y.to_owned(); }
    let m = 2 * (n - 1);
    let mut buf: Vec<C64>
        = y.iter()
        .chain(y.iter().skip(1).take(n - 2).rev())
        .map(|yk| C64::from(*yk))
        .collect();
    let fft_plan = PLANNER.with(|plan| plan.borrow_mut().plan_fft_forward(m));
    fft_plan.process(&mut buf);
    buf.into_iter().take(n).map(|bk| bk.re).collect()
}

/// Transform values sampled on a [Lobatto grid][lobatto] to Chebyshev
/// coefficients.
pub fn forward<S>(values: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    let n = values.len();
    if n < 2 { return values.to_owned(); }
    let nm1 = (n - 1) as f64;
    let mut c = dct_i(values);
    c.map_inplace(|ck| { *ck /= nm1; });
    c[0] /= 2.0;
    c[n - 1] /= 2.0;
    c
}

/// Transform Chebyshev coefficients to values on a [Lobatto grid][lobatto].
pub fn inverse<S>(coeffs: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    let n = coeffs.len();
    if n < 2 { return coeffs.to_owned(); }
    let mut a = coeffs.to_owned();
    a.slice_mut(nd::s![1..n - 1]).map_inplace(|ak| { *ak /= 2.0; });
    dct_i(&a)
}

/// Evaluate a Chebyshev series at a point in [-1, 1] by Clenshaw's recurrence.
pub fn evaluate<S>(coeffs: &Arr1<S>, x: f64) -> f64
where S: nd::Data<Elem = f64>
{
    let n = coeffs.len();
    if n == 0 { return 0.0; }
    let mut b1: f64 = 0.0;
    let mut b2: f64 = 0.0;
    for &ck in coeffs.iter().skip(1).rev() {
        let b0 = ck + 2.0 * x * b1 - b2;
        b2 = b1;
        b1 = b0;
    }
    coeffs[0] + x * b1 - b2
}

/// Evaluate a Chebyshev series defined on the interval `[lo, hi]` at
/// arbitrary points of that interval.
pub fn evaluate_on<S, T>(coeffs: &Arr1<S>, lo: f64, hi: f64, t: &Arr1<T>)
    -> nd::Array1<f64>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    t.mapv(|tk| evaluate(coeffs, from_interval(tk, lo, hi)))
}

/// Build the matrix taking `n` Chebyshev coefficients on `[lo, hi]` to values
/// at arbitrary points of that interval.
pub fn transform_matrix<T>(n: usize, lo: f64, hi: f64, t: &Arr1<T>)
    -> nd::Array2<f64>
where T: nd::Data<Elem = f64>
{
    let x: nd::Array1<f64> = t.mapv(|tk| from_interval(tk, lo, hi));
    polynomials(&x, n).t
}

/// Differentiate a Chebyshev series on the canonical interval in coefficient
/// space.
///
/// The result has the same length as the input, with the highest coefficient
/// zero. Scale by `2 / (hi - lo)` for a series on `[lo, hi]`.
pub fn differentiate<S>(coeffs: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    let n = coeffs.len();
    let mut d: nd::Array1<f64> = nd::Array1::zeros(n);
    if n < 2 { return d; }
    d[n - 2] = 2.0 * (n - 1) as f64 * coeffs[n - 1];
    for k in (0..n.saturating_sub(2)).rev() {
        d[k] = d[k + 2] + 2.0 * (k + 1) as f64 * coeffs[k + 1];
    }
    d[0] /= 2.0;
    d
}

/// Clenshaw-Curtis style weights `w[k] = ∫ T_k(x) dx` over [-1, 1], such that
/// the integral of a series is the dot product of its coefficients with `w`.
///
/// ```text
/// w[k] = -((-1)^k + 1) / (k² - 1),  k ≠ 1
/// w[1] = 0
/// ```
pub fn quadrature_weights(n: usize) -> nd::Array1<f64> {
    (0..n)
        .map(|k| {
            if k == 1 {
                0.0
            } else {
                let kf = k as f64;
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                -(sign + 1.0) / (kf * kf - 1.0)
            }
        })
        .collect()
}

/// Zero every coefficient whose magnitude is below `floor` times the largest
/// coefficient magnitude.
pub fn zero_below<S>(coeffs: &mut nd::ArrayBase<S, nd::Ix1>, floor: f64)
where S: nd::DataMut<Elem = f64>
{
    let cmax = coeffs.fold(0.0_f64, |acc, ck| acc.max(ck.abs()));
    let threshold = floor * cmax;
    coeffs.map_inplace(|ck| { if ck.abs() < threshold { *ck = 0.0; } });
}

#[cfg(test)]
mod tests {
    use approx::{ assert_abs_diff_eq, assert_relative_eq };
    use super::*;

    #[test]
    fn transform_round_trip() {
        let x = lobatto(17);
        let f = x.mapv(|xk| (3.0 * xk).sin() + xk.powi(4));
        let c = forward(&f);
        let g = inverse(&c);
        f.iter().zip(&g)
            .for_each(|(fk, gk)| assert_abs_diff_eq!(*fk, *gk, epsilon = 1e-13));
        let c2 = forward(&inverse(&c));
        c.iter().zip(&c2)
            .for_each(|(ck, c2k)| assert_abs_diff_eq!(*ck, *c2k, epsilon = 1e-13));
    }

    #[test]
    fn mixed_lengths_reuse_plans() {
        for _ in 0..3 {
            for n in [5, 17, 9, 17, 64, 5] {
                let x = lobatto(n);
                let f = x.mapv(|xk| (2.0 * xk).cos() - xk);
                let back = inverse(&forward(&f));
                back.iter().zip(&f)
                    .for_each(|(bk, fk)| assert_abs_diff_eq!(*bk, *fk, epsilon = 1e-12));
            }
        }
    }

    #[test]
    fn forward_of_polynomial() {
        // x^2 = (T_0 + T_2) / 2
        let x = lobatto(6);
        let c = forward(&x.mapv(|xk| xk * xk));
        let expected = [0.5, 0.0, 0.5, 0.0, 0.0, 0.0];
        c.iter().zip(expected)
            .for_each(|(ck, ek)| assert_abs_diff_eq!(*ck, ek, epsilon = 1e-14));
    }

    #[test]
    fn recurrence_matches_transform() {
        let n = 12;
        let x = lobatto(n);
        let p = polynomials(&x, n);
        let c: nd::Array1<f64> = (0..n).map(|k| 1.0 / (1.0 + k as f64)).collect();
        let via_matrix = p.t.dot(&c);
        let via_dct = inverse(&c);
        via_matrix.iter().zip(&via_dct)
            .for_each(|(a, b)| assert_abs_diff_eq!(*a, *b, epsilon = 1e-13));
        let x0 = 0.3;
        assert_abs_diff_eq!(
            evaluate(&c, x0),
            polynomials(&nd::array![x0], n).t.row(0).dot(&c),
            epsilon = 1e-14
        );
    }

    #[test]
    fn derivatives() {
        let n = 16;
        let x = lobatto(n);
        let c = forward(&x.mapv(|xk| (2.0 * xk).exp()));
        let p = polynomials(&x, n);
        let d1 = p.dt.dot(&c);
        let d2 = p.d2t.dot(&c);
        let dc = inverse(&differentiate(&c));
        for (i, &xi) in x.iter().enumerate() {
            let e = (2.0 * xi).exp();
            assert_relative_eq!(d1[i], 2.0 * e, max_relative = 1e-9);
            assert_relative_eq!(d2[i], 4.0 * e, max_relative = 1e-7);
            assert_relative_eq!(dc[i], 2.0 * e, max_relative = 1e-9);
        }
    }

    #[test]
    fn quadrature() {
        let n = 20;
        let w = quadrature_weights(n);
        let c = forward(&lobatto(n).mapv(|xk| xk.cos()));
        assert_abs_diff_eq!(w.dot(&c), 2.0 * 1.0_f64.sin(), epsilon = 1e-13);
    }

    #[test]
    fn evaluate_on_interval() {
        let lo = -40.0;
        let hi = 10.0;
        let z = to_interval(&lobatto(10), lo, hi);
        let c = forward(&z.mapv(|zk| zk * zk));
        let t = nd::array![-40.0, -12.5, 0.0, 10.0];
        let v = evaluate_on(&c, lo, hi, &t);
        let m = transform_matrix(10, lo, hi, &t).dot(&c);
        for k in 0..t.len() {
            assert_relative_eq!(v[k], t[k] * t[k], epsilon = 1e-10, max_relative = 1e-12);
            assert_relative_eq!(m[k], t[k] * t[k], epsilon = 1e-10, max_relative = 1e-12);
        }
    }

    #[test]
    fn noise_floor() {
        let mut c = nd::array![1.0, 1e-17, -3e-16, 0.5];
        zero_below(&mut c, 1e-15);
        assert_eq!(c, nd::array![1.0, 0.0, 0.0, 0.5]);
    }
}
