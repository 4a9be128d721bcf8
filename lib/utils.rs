//! Miscellaneous tools.

use ndarray::{ self as nd, Ix1 };

/// Cumulatively integrate using the trapezoidal rule, starting from zero at
/// the first sample.
///
/// The returned array has the same length as `y`.
pub fn cumtrapz<S>(y: &nd::ArrayBase<S, Ix1>, dx: f64) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    let mut acc: f64 = 0.0;
    let mut out: nd::Array1<f64> = nd::Array1::zeros(y.len());
    out.iter_mut().skip(1)
        .zip(y.iter().zip(y.iter().skip(1)))
        .for_each(|(ok, (ykm1, yk))| {
            acc += dx * (ykm1 + yk) / 2.0;
            *ok = acc;
        });
    out
}

/// Linearly interpolate a sampled function at `x`.
///
/// `data_x` must be non-decreasing; repeated abscissae resolve to the
/// right-most matching sample. Values of `x` outside of the sampled range are
/// clamped to the end values.
///
/// *Panics if `data_x` is empty*.
pub fn interp1<S, T>(
    data_x: &nd::ArrayBase<S, Ix1>,
    data_y: &nd::ArrayBase<T, Ix1>,
    x: f64,
) -> f64
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    let n = data_x.len();
    if x < data_x[0] { return data_y[0]; }
    if x >= data_x[n - 1] { return data_y[n - 1]; }
    // first sample with data_x[j] > x; guaranteed 1 <= j <= n - 1 here
    let j = data_x.as_slice()
        .map(|xs| xs.partition_point(|xk| *xk <= x))
        .unwrap_or_else(|| data_x.iter().take_while(|xk| **xk <= x).count());
    let (x0, x1) = (data_x[j - 1], data_x[j]);
    let (y0, y1) = (data_y[j - 1], data_y[j]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use super::*;

    #[test]
    fn cumtrapz_of_linear_is_exact() {
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 2.0, 21);
        let dx = x[1] - x[0];
        let c = cumtrapz(&x, dx);
        assert_eq!(c[0], 0.0);
        c.iter().zip(&x)
            .for_each(|(ck, xk)| assert_abs_diff_eq!(*ck, xk * xk / 2.0, epsilon = 1e-12));
        assert_abs_diff_eq!(c[20], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn interp1_clamps_and_handles_flats() {
        let x = nd::array![0.0, 1.0, 1.0, 2.0];
        let y = nd::array![0.0, 10.0, 20.0, 30.0];
        assert_eq!(interp1(&x, &y, -1.0), 0.0);
        assert_eq!(interp1(&x, &y, 3.0), 30.0);
        assert_abs_diff_eq!(interp1(&x, &y, 0.5), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(interp1(&x, &y, 1.5), 25.0, epsilon = 1e-12);
        assert_eq!(interp1(&x, &y, 1.0), 20.0);
        let x = nd::array![0.0, 1.0, 1.0, 1.0, 2.0];
        let y = nd::array![0.0, 10.0, 15.0, 20.0, 30.0];
        assert_eq!(interp1(&x, &y, 1.0), 20.0);
        assert_abs_diff_eq!(interp1(&x, &y, 1.0 - 1e-9), 10.0, epsilon = 1e-6);
        let x = nd::array![0.0, 0.0, 1.0];
        let y = nd::array![5.0, 7.0, 9.0];
        assert_eq!(interp1(&x, &y, 0.0), 7.0);
        assert_eq!(interp1(&x, &y, -1.0), 5.0);
    }
}
