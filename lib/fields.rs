//! Coefficient fields of the mode equation, resampled onto the stretched grid.
//!
//! Derivatives of the stratification are most accurately taken in depth, but
//! the mode equation is collocated in ξ. For every subdomain the profile is
//! therefore expanded in a Chebyshev series over the subdomain's *depth*
//! range, cleaned of high-order noise, differentiated there, and only then
//! evaluated at the depths of the subdomain's ξ-Lobatto points.

use ndarray as nd;
use crate::{
    Arr1,
    chebyshev,
    domain::Subdomain,
    profile::Stratification,
};

/// Chebyshev series in depth for the derived stratification quantities of a
/// single subdomain.
#[derive(Clone, Debug)]
pub struct DepthSeries {
    /// Depth at the bottom of the series' interval.
    pub z_lo: f64,
    /// Depth at the top of the series' interval.
    pub z_hi: f64,
    /// N²
    pub n2: nd::Array1<f64>,
    /// N² - ω²
    pub n2_shift: nd::Array1<f64>,
    /// √|N² - ω²|
    pub stretch: nd::Array1<f64>,
    /// d/dz √|N² - ω²|
    pub stretch_z: nd::Array1<f64>,
}

impl DepthSeries {
    /// Expand the derived quantities over `[z_lo, z_hi]` using an `n`-point
    /// depth Lobatto grid, zeroing N² coefficients below `noise_floor` times
    /// the largest.
    pub fn build<P>(
        profile: &P,
        z_lo: f64,
        z_hi: f64,
        n: usize,
        omega: f64,
        noise_floor: f64,
    ) -> Self
    where P: Stratification + ?Sized
    {
        let z = chebyshev::to_interval(&chebyshev::lobatto(n), z_lo, z_hi);
        let mut n2 = chebyshev::forward(&profile.n2_array(&z));
        chebyshev::zero_below(&mut n2, noise_floor);
        let mut n2_shift = n2.clone();
        n2_shift[0] -= omega * omega;
        let stretch_values
            = chebyshev::inverse(&n2_shift).mapv(|v| v.abs().sqrt());
        let mut stretch = chebyshev::forward(&stretch_values);
        chebyshev::zero_below(&mut stretch, noise_floor);
        let stretch_z = chebyshev::differentiate(&stretch) * (2.0 / (z_hi - z_lo));
        Self { z_lo, z_hi, n2, n2_shift, stretch, stretch_z }
    }

    /// Evaluate one of the series at arbitrary depths within the interval.
    pub fn eval<S, T>(&self, series: &Arr1<S>, z: &Arr1<T>) -> nd::Array1<f64>
    where
        S: nd::Data<Elem = f64>,
        T: nd::Data<Elem = f64>,
    {
        chebyshev::evaluate_on(series, self.z_lo, self.z_hi, z)
    }
}

/// Coefficient fields sampled on the global stretched grid.
///
/// Every array is aligned with the global vector, i.e. entry `i` belongs to
/// the `i`-th Lobatto point of the concatenated subdomain grids.
#[derive(Clone, Debug)]
pub struct Fields {
    /// N²
    pub n2: nd::Array1<f64>,
    /// N² - ω²
    pub n2_shift: nd::Array1<f64>,
    /// √|N² - ω²|, i.e. dξ/dz
    pub stretch: nd::Array1<f64>,
    /// d/dz √|N² - ω²|
    pub stretch_z: nd::Array1<f64>,
    /// dz/dξ, from spectral differentiation of z(ξ)
    pub jacobian: nd::Array1<f64>,
    /// Depth series for each subdomain.
    pub series: Vec<DepthSeries>,
}

/// Assemble the coefficient fields for every subdomain at forcing frequency
/// `omega`.
pub fn assemble<P>(
    profile: &P,
    domains: &[Subdomain],
    omega: f64,
    noise_floor: f64,
) -> Fields
where P: Stratification + ?Sized
{
    let n_total: usize = domains.iter().map(|d| d.len()).sum();
    let mut n2: nd::Array1<f64> = nd::Array1::zeros(n_total);
    let mut n2_shift: nd::Array1<f64> = nd::Array1::zeros(n_total);
    let mut stretch: nd::Array1<f64> = nd::Array1::zeros(n_total);
    let mut stretch_z: nd::Array1<f64> = nd::Array1::zeros(n_total);
    let mut jacobian: nd::Array1<f64> = nd::Array1::zeros(n_total);
    let mut series: Vec<DepthSeries> = Vec::with_capacity(domains.len());
    for d in domains.iter() {
        let s = DepthSeries::build(
            profile, d.z_lo, d.z_hi, d.len(), omega, noise_floor);
        let r = d.range.clone();
        n2.slice_mut(nd::s![r.clone()]).assign(&s.eval(&s.n2, &d.z));
        n2_shift.slice_mut(nd::s![r.clone()]).assign(&s.eval(&s.n2_shift, &d.z));
        stretch.slice_mut(nd::s![r.clone()]).assign(&s.eval(&s.stretch, &d.z));
        stretch_z.slice_mut(nd::s![r.clone()]).assign(&s.eval(&s.stretch_z, &d.z));
        let dz = chebyshev::differentiate(&chebyshev::forward(&d.z)) * d.scale();
        jacobian.slice_mut(nd::s![r]).assign(&chebyshev::inverse(&dz));
        series.push(s);
    }
    Fields { n2, n2_shift, stretch, stretch_z, jacobian, series }
}

#[cfg(test)]
mod tests {
    use approx::{ assert_abs_diff_eq, assert_relative_eq };
    use crate::{
        domain::build_subdomains,
        profile::N2Function,
        stretch::StretchedCoordinate,
    };
    use super::*;

    #[test]
    fn constant_stratification() {
        let n2 = N2Function(|_: f64| 1e-5);
        let s = StretchedCoordinate::build(
            &n2, (-4000.0, 0.0), 0.0, 1001, 1e-12, 1000).unwrap();
        let domains = build_subdomains(&s, 32).unwrap();
        let f = assemble(&n2, &domains, 0.0, 1e-15);
        let n = 1e-5_f64.sqrt();
        for i in 0..32 {
            assert_relative_eq!(f.n2[i], 1e-5, max_relative = 1e-12);
            assert_relative_eq!(f.stretch[i], n, max_relative = 1e-12);
            assert_abs_diff_eq!(f.stretch_z[i], 0.0, epsilon = 1e-14);
            assert_relative_eq!(f.jacobian[i], 1.0 / n, max_relative = 1e-8);
        }
    }

    #[test]
    fn exponential_stratification() {
        let n0: f64 = 5.2e-3;
        let b = 1300.0;
        let n2 = N2Function(move |z: f64| n0 * n0 * (2.0 * z / b).exp());
        let omega = 1e-3;
        let s = StretchedCoordinate::build(
            &n2, (-1000.0, 0.0), omega, 4001, 1e-12, 1000).unwrap();
        assert!(s.turning_points().is_empty());
        let domains = build_subdomains(&s, 48).unwrap();
        let f = assemble(&n2, &domains, omega, 1e-15);
        for (i, &zi) in domains[0].z.iter().enumerate() {
            let n2_exact = n0 * n0 * (2.0 * zi / b).exp();
            let s_exact = (n2_exact - omega * omega).sqrt();
            let s_z_exact = n2_exact / b / s_exact;
            assert_relative_eq!(f.n2[i], n2_exact, max_relative = 1e-10);
            assert_relative_eq!(f.n2_shift[i], n2_exact - omega * omega, max_relative = 1e-10);
            assert_relative_eq!(f.stretch[i], s_exact, max_relative = 1e-10);
            assert_relative_eq!(f.stretch_z[i], s_z_exact, max_relative = 1e-8);
        }
    }
}
