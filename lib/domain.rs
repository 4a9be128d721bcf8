//! Per-subdomain Chebyshev bases in the stretched coordinate.
//!
//! Each subdomain between adjacent boundaries of the
//! [stretched coordinate][crate::stretch::StretchedCoordinate] carries its own
//! Lobatto grid in ξ, ordered from the top of the subdomain to its bottom, and
//! occupies a contiguous index range of the global (concatenated) vector.
//! Subdomains themselves are ordered from the top of the water column down.

use std::ops::Range;
use ndarray as nd;
use crate::{
    chebyshev,
    error::{ ConfigError, ModeError },
    solver::ModeResult,
    stretch::StretchedCoordinate,
};

/// Minimum number of Lobatto points in any one subdomain.
pub const MIN_DOMAIN_POINTS: usize = 3;

/// A single subdomain of the global grid.
#[derive(Clone, Debug)]
pub struct Subdomain {
    /// Position of this subdomain, counted from the top.
    pub index: usize,
    /// Slice of the global vector occupied by this subdomain.
    pub range: Range<usize>,
    /// Stretched coordinate at the bottom of the subdomain.
    pub xi_lo: f64,
    /// Stretched coordinate at the top of the subdomain.
    pub xi_hi: f64,
    /// Depth at the bottom of the subdomain.
    pub z_lo: f64,
    /// Depth at the top of the subdomain.
    pub z_hi: f64,
    /// Lobatto points in ξ, top first.
    pub xi: nd::Array1<f64>,
    /// Depth at each Lobatto point.
    pub z: nd::Array1<f64>,
    /// Values of `T_k` at the Lobatto points.
    pub basis: nd::Array2<f64>,
    /// First ξ-derivatives of `T_k` at the Lobatto points.
    pub d1: nd::Array2<f64>,
    /// Second ξ-derivatives of `T_k` at the Lobatto points.
    pub d2: nd::Array2<f64>,
    /// Quadrature weights in coefficient space, scaled to the ξ-interval.
    pub weights: nd::Array1<f64>,
}

impl Subdomain {
    /// Number of Lobatto points (and coefficients) in the subdomain.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.range.len() }

    /// Length of the subdomain in the stretched coordinate, Lξ.
    pub fn length(&self) -> f64 { self.xi_hi - self.xi_lo }

    /// Chain-rule factor taking canonical derivatives to ξ-derivatives,
    /// `2 / Lξ`.
    pub fn scale(&self) -> f64 { 2.0 / self.length() }

    /// Return `true` if `xi` belongs to this subdomain.
    ///
    /// Intervals are half-open, `(xi_lo, xi_hi]`, except for the bottom-most
    /// subdomain, which is closed on both ends. Together the subdomains
    /// partition `[0, ξ_total]`.
    pub fn owns(&self, xi: f64, is_last: bool) -> bool {
        if is_last {
            self.xi_lo <= xi && xi <= self.xi_hi
        } else {
            self.xi_lo < xi && xi <= self.xi_hi
        }
    }
}

/// Split `n_points` across `n_equations` subdomains.
///
/// Every subdomain receives `n_points / n_equations` points and any remainder
/// goes to the last (bottom-most) subdomain.
pub fn point_budget(n_points: usize, n_equations: usize)
    -> Result<Vec<usize>, ConfigError>
{
    let per = if n_equations == 0 { 0 } else { n_points / n_equations };
    if per < MIN_DOMAIN_POINTS {
        return Err(ConfigError::TooFewPointsPerDomain {
            n_points,
            n_equations,
            min: MIN_DOMAIN_POINTS,
        });
    }
    let mut budget: Vec<usize> = vec![per; n_equations];
    budget[n_equations - 1] += n_points - per * n_equations;
    Ok(budget)
}

/// Build every subdomain for a stretched coordinate, distributing `n_points`
/// according to [`point_budget`].
pub fn build_subdomains(stretch: &StretchedCoordinate, n_points: usize)
    -> ModeResult<Vec<Subdomain>>
{
    let n_equations = stretch.n_equations();
    let budget = point_budget(n_points, n_equations)?;
    let zb = stretch.z_boundaries();
    let xib = stretch.xi_boundaries();
    let mut start: usize = 0;
    let mut domains: Vec<Subdomain> = Vec::with_capacity(n_equations);
    for (index, n) in budget.into_iter().enumerate() {
        let (xi_hi, xi_lo) = (xib[index], xib[index + 1]);
        if !(xi_hi > xi_lo) { return Err(ModeError::DegenerateSubdomain(index)); }
        let (z_hi, z_lo) = (zb[index], zb[index + 1]);
        let x = chebyshev::lobatto(n);
        let xi = chebyshev::to_interval(&x, xi_lo, xi_hi);
        let mut z: nd::Array1<f64> = xi.mapv(|xik| stretch.z_at(xik));
        // pin the ends to the exact boundaries
        z[0] = z_hi;
        z[n - 1] = z_lo;
        let scale = 2.0 / (xi_hi - xi_lo);
        let p = chebyshev::polynomials(&x, n);
        let weights = chebyshev::quadrature_weights(n) * ((xi_hi - xi_lo) / 2.0);
        domains.push(Subdomain {
            index,
            range: start..start + n,
            xi_lo,
            xi_hi,
            z_lo,
            z_hi,
            xi,
            z,
            basis: p.t,
            d1: p.dt * scale,
            d2: p.d2t * scale.powi(2),
            weights,
        });
        start += n;
    }
    Ok(domains)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use crate::profile::N2Function;
    use super::*;

    #[test]
    fn budget_remainder_goes_last() {
        assert_eq!(point_budget(64, 1).unwrap(), vec![64]);
        assert_eq!(point_budget(64, 3).unwrap(), vec![21, 21, 22]);
        assert_eq!(point_budget(70, 4).unwrap(), vec![17, 17, 17, 19]);
        assert!(matches!(
            point_budget(8, 3),
            Err(ConfigError::TooFewPointsPerDomain { .. })
        ));
    }

    #[test]
    fn subdomains_tile_the_global_vector() {
        let n0: f64 = 5.2e-3;
        let n2 = N2Function(move |z: f64| n0 * n0 * (2.0 * z / 1300.0).exp());
        let omega = n0 * (-1.0_f64).exp();
        let s = StretchedCoordinate::build(
            &n2, (-4000.0, 0.0), omega, 2001, 1e-12, 1000).unwrap();
        let domains = build_subdomains(&s, 65).unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].range, 0..32);
        assert_eq!(domains[1].range, 32..65);
        assert_eq!(domains.iter().map(|d| d.len()).sum::<usize>(), 65);
        assert_abs_diff_eq!(domains[0].xi_lo, domains[1].xi_hi);
        for d in domains.iter() {
            assert!(d.xi.iter().zip(d.xi.iter().skip(1)).all(|(a, b)| a > b));
            assert!(d.z.iter().zip(d.z.iter().skip(1)).all(|(a, b)| a >= b));
            // ∫ 1 dξ over the subdomain
            assert_abs_diff_eq!(d.weights[0], d.length(), epsilon = 1e-12);
        }
        assert_eq!(domains[0].z[0], 0.0);
        assert_eq!(domains[1].z[32], -4000.0);
    }

    #[test]
    fn ownership_is_half_open() {
        let s = StretchedCoordinate::build(
            &N2Function(|z: f64| 1e-5 * (z / 500.0).cos()),
            (-3000.0, 0.0), 0.0, 2001, 1e-12, 1000,
        ).unwrap();
        let domains = build_subdomains(&s, 64).unwrap();
        let last = domains.len() - 1;
        for (i, d) in domains.iter().enumerate() {
            assert!(d.owns(d.xi_hi, i == last));
            assert_eq!(d.owns(d.xi_lo, i == last), i == last);
        }
    }
}
