//! Piecewise basis transforms over the concatenated subdomain grids.
//!
//! Every operator here applies a single-domain primitive from
//! [`chebyshev`][crate::chebyshev] to each subdomain's slice of the global
//! vector independently; coefficients are never mixed across subdomains.

use std::ops::Range;
use ndarray as nd;
use crate::{
    Arr1,
    chebyshev,
    domain::Subdomain,
    error::ConfigError,
    fields::Fields,
    stretch::StretchedCoordinate,
};

// apply a single-domain map slice by slice
fn piecewise<S, F>(domains: &[Subdomain], v: &Arr1<S>, mut f: F)
    -> nd::Array1<f64>
where
    S: nd::Data<Elem = f64>,
    F: FnMut(&Subdomain, nd::ArrayView1<f64>) -> nd::Array1<f64>,
{
    let mut out: nd::Array1<f64> = nd::Array1::zeros(v.len());
    for d in domains.iter() {
        let r = d.range.clone();
        out.slice_mut(nd::s![r.clone()]).assign(&f(d, v.slice(nd::s![r])));
    }
    out
}

/// Transform values on the stretched grid to per-subdomain Chebyshev
/// coefficients.
pub fn to_coefficients<S>(domains: &[Subdomain], values: &Arr1<S>)
    -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    piecewise(domains, values, |_, v| chebyshev::forward(&v))
}

/// Transform per-subdomain Chebyshev coefficients to values on the stretched
/// grid.
pub fn to_values<S>(domains: &[Subdomain], coeffs: &Arr1<S>)
    -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    piecewise(domains, coeffs, |_, c| chebyshev::inverse(&c))
}

/// Differentiate per-subdomain Chebyshev coefficients with respect to ξ.
pub fn differentiate<S>(domains: &[Subdomain], coeffs: &Arr1<S>)
    -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    piecewise(domains, coeffs, |d, c| chebyshev::differentiate(&c) * d.scale())
}

/// Integrate a field given on the stretched grid over ξ, as the sum of
/// independent per-subdomain quadratures.
pub fn integrate<S>(domains: &[Subdomain], values: &Arr1<S>) -> f64
where S: nd::Data<Elem = f64>
{
    domains.iter()
        .map(|d| {
            let c = chebyshev::forward(&values.slice(nd::s![d.range.clone()]));
            d.weights.dot(&c)
        })
        .sum()
}

/// Find the subdomain owning a value of the stretched coordinate.
///
/// See [`Subdomain::owns`] for the boundary convention.
pub fn bucket(domains: &[Subdomain], xi: f64) -> Option<usize> {
    let last = domains.len().checked_sub(1)?;
    domains.iter().position(|d| d.owns(xi, d.index == last))
}

/// Linear operator taking one subdomain's coefficients to the output depths
/// it owns.
#[derive(Clone, Debug)]
pub struct OutputMap {
    /// Slice of the global coefficient vector read by this map.
    pub source: Range<usize>,
    /// Indices of the output depths written by this map.
    pub dest: Vec<usize>,
    /// Basis evaluated at the owned output depths.
    pub basis: nd::Array2<f64>,
    /// ξ-derivative of the basis at the owned output depths.
    pub d1: nd::Array2<f64>,
    /// √|N² - ω²| at the owned output depths.
    pub stretch: nd::Array1<f64>,
}

/// Resampling from the global coefficient vector to caller-requested output
/// depths.
#[derive(Clone, Debug)]
pub struct OutputResampler {
    z: nd::Array1<f64>,
    xi: nd::Array1<f64>,
    maps: Vec<OutputMap>,
}

impl OutputResampler {
    /// Bucket every output depth into a subdomain and precompute the
    /// per-subdomain operators.
    ///
    /// Output depths must lie within the depth domain.
    pub fn build<S>(
        stretch: &StretchedCoordinate,
        domains: &[Subdomain],
        fields: &Fields,
        z: &Arr1<S>,
    ) -> Result<Self, ConfigError>
    where S: nd::Data<Elem = f64>
    {
        let (bottom, top) = (stretch.bottom(), stretch.top());
        if let Some(bad) = z.iter().find(|zk| !(**zk >= bottom && **zk <= top)) {
            return Err(ConfigError::DepthOutOfRange(*bad));
        }
        let xi_total = stretch.xi_total();
        let xi: nd::Array1<f64>
            = z.mapv(|zk| stretch.xi_at(zk).clamp(0.0, xi_total));
        let mut owned: Vec<Vec<usize>> = vec![Vec::new(); domains.len()];
        for (k, &xik) in xi.iter().enumerate() {
            // the domains partition [0, ξ_total], so this always succeeds
            if let Some(i) = bucket(domains, xik) { owned[i].push(k); }
            if domains.iter().skip(1).any(|d| d.xi_hi == xik) {
                log::warn!(
                    "OutputResampler::build: output depth {} sits on a subdomain \
                    boundary and is assigned to the lower subdomain",
                    z[k],
                );
            }
        }
        let maps: Vec<OutputMap>
            = domains.iter().zip(owned)
            .zip(&fields.series)
            .map(|((d, dest), series)| {
                let xi_d: nd::Array1<f64> = dest.iter().map(|k| xi[*k]).collect();
                let z_d: nd::Array1<f64> = dest.iter().map(|k| z[*k]).collect();
                let x: nd::Array1<f64>
                    = xi_d.mapv(|t| chebyshev::from_interval(t, d.xi_lo, d.xi_hi));
                let p = chebyshev::polynomials(&x, d.len());
                let stretch = series.eval(&series.stretch, &z_d);
                OutputMap {
                    source: d.range.clone(),
                    dest,
                    basis: p.t,
                    d1: p.dt * d.scale(),
                    stretch,
                }
            })
            .collect();
        Ok(Self { z: z.to_owned(), xi, maps })
    }

    /// Output depths.
    pub fn z(&self) -> &nd::Array1<f64> { &self.z }

    /// Output depths mapped to the stretched coordinate.
    pub fn xi(&self) -> &nd::Array1<f64> { &self.xi }

    /// Per-subdomain operators.
    pub fn maps(&self) -> &[OutputMap] { &self.maps }

    /// Evaluate a global coefficient vector at the output depths.
    pub fn values<S>(&self, coeffs: &Arr1<S>) -> nd::Array1<f64>
    where S: nd::Data<Elem = f64>
    {
        self.apply(coeffs, |m, c| m.basis.dot(&c))
    }

    /// Evaluate the depth derivative `√|N² - ω²| d/dξ` of a global
    /// coefficient vector at the output depths.
    pub fn z_derivative<S>(&self, coeffs: &Arr1<S>) -> nd::Array1<f64>
    where S: nd::Data<Elem = f64>
    {
        self.apply(coeffs, |m, c| &m.stretch * &m.d1.dot(&c))
    }

    fn apply<S, F>(&self, coeffs: &Arr1<S>, mut f: F) -> nd::Array1<f64>
    where
        S: nd::Data<Elem = f64>,
        F: FnMut(&OutputMap, nd::ArrayView1<f64>) -> nd::Array1<f64>,
    {
        let mut out: nd::Array1<f64> = nd::Array1::zeros(self.z.len());
        for m in self.maps.iter() {
            let vals = f(m, coeffs.slice(nd::s![m.source.clone()]));
            m.dest.iter().zip(vals.iter())
                .for_each(|(k, vk)| { out[*k] = *vk; });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use approx::{ assert_abs_diff_eq, assert_relative_eq };
    use crate::{
        domain::build_subdomains,
        fields::assemble,
        profile::N2Function,
    };
    use super::*;

    fn setup() -> (StretchedCoordinate, Vec<Subdomain>, Fields) {
        let n0: f64 = 5.2e-3;
        let n2 = N2Function(move |z: f64| n0 * n0 * (2.0 * z / 1300.0).exp());
        let omega = n0 * (-1.0_f64).exp();
        let s = StretchedCoordinate::build(
            &n2, (-4000.0, 0.0), omega, 4001, 1e-12, 1000).unwrap();
        let d = build_subdomains(&s, 60).unwrap();
        let f = assemble(&n2, &d, omega, 1e-15);
        (s, d, f)
    }

    #[test]
    fn coefficient_round_trip_per_subdomain() {
        let (_, d, _) = setup();
        let xi: nd::Array1<f64>
            = nd::concatenate(
                nd::Axis(0),
                &d.iter().map(|dk| dk.xi.view()).collect::<Vec<_>>(),
            ).unwrap();
        let values = xi.mapv(|x| (0.3 * x).cos());
        let coeffs = to_coefficients(&d, &values);
        let back = to_coefficients(&d, &to_values(&d, &coeffs));
        coeffs.iter().zip(&back)
            .for_each(|(a, b)| assert_abs_diff_eq!(*a, *b, epsilon = 1e-12));
    }

    #[test]
    fn piecewise_derivative_and_integral() {
        let (s, d, _) = setup();
        let xi: nd::Array1<f64>
            = nd::concatenate(
                nd::Axis(0),
                &d.iter().map(|dk| dk.xi.view()).collect::<Vec<_>>(),
            ).unwrap();
        let values = xi.mapv(|x| x * x);
        let coeffs = to_coefficients(&d, &values);
        let dv = to_values(&d, &differentiate(&d, &coeffs));
        dv.iter().zip(&xi)
            .for_each(|(a, x)| assert_abs_diff_eq!(*a, 2.0 * x, epsilon = 1e-9));
        let total = s.xi_total();
        assert_relative_eq!(integrate(&d, &values), total.powi(3) / 3.0, max_relative = 1e-10);
    }

    #[test]
    fn output_depths_are_partitioned() {
        let (s, d, f) = setup();
        let zt = s.turning_points()[0];
        let z = nd::array![0.0, -10.0, -700.0, zt, -2500.0, -4000.0];
        let r = OutputResampler::build(&s, &d, &f, &z).unwrap();
        let mut seen: Vec<usize>
            = r.maps().iter().flat_map(|m| m.dest.iter().copied()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..z.len()).collect::<Vec<_>>());
        assert_eq!(r.maps()[0].dest, vec![0, 1, 2]);
        // a depth exactly on the shared boundary belongs to the lower domain
        assert_eq!(r.maps()[1].dest, vec![3, 4, 5]);
    }

    #[test]
    fn output_resampling_matches_grid() {
        let (s, d, f) = setup();
        // a coefficient vector equal to T_1 in every subdomain
        let mut c: nd::Array1<f64> = nd::Array1::zeros(60);
        d.iter().for_each(|dk| c[dk.range.start + 1] = 1.0);
        let z: nd::Array1<f64> = d[0].z.clone();
        let r = OutputResampler::build(&s, &d, &f, &z).unwrap();
        let on_grid = to_values(&d, &c);
        let out = r.values(&c);
        // the shared bottom point of domain 0 is owned by domain 1
        for k in 0..z.len() - 1 {
            assert_relative_eq!(out[k], on_grid[k], epsilon = 1e-6);
        }
        let grad = r.z_derivative(&c);
        for k in 0..z.len() - 1 {
            assert_relative_eq!(
                grad[k], f.stretch[k] * d[0].scale(), max_relative = 1e-6, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_depths_outside_domain() {
        let (s, d, f) = setup();
        assert!(matches!(
            OutputResampler::build(&s, &d, &f, &nd::array![1.0]),
            Err(ConfigError::DepthOutOfRange(..))
        ));
    }
}
