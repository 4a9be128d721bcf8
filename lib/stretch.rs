//! The WKB-stretched vertical coordinate and its turning points.
//!
//! For a forcing frequency ω the stretched coordinate is
//! ```text
//! ξ(z) = ∫_{z_bottom}^{z} √|N²(z') - ω²| dz'
//! ```
//! evaluated by cumulative trapezoidal integration on a uniform reference grid.
//! Turning points are the interior depths at which N²(z) = ω².

use ndarray as nd;
use crate::{
    error::{ ConfigError, ModeError },
    interp::{ self, Crossing, Zero },
    profile::Stratification,
    solver::ModeResult,
    utils::{ cumtrapz, interp1 },
};

/// Stretched coordinate sampled on a fine reference grid, together with the
/// turning points for a single forcing frequency.
#[derive(Clone, Debug)]
pub struct StretchedCoordinate {
    omega: f64,
    // reference depths, ascending from the bottom
    z: nd::Array1<f64>,
    // ξ at each reference depth; non-decreasing with ξ(bottom) = 0
    xi: nd::Array1<f64>,
    // interior turning points, strictly ascending
    turning_points: Vec<f64>,
}

impl StretchedCoordinate {
    /// Build the stretched coordinate for forcing frequency `omega` over
    /// `domain = (bottom, top)`, using `n_ref` reference points.
    ///
    /// Turning points are bracketed by a sign-change scan of N² - ω² over the
    /// reference grid and refined against the profile itself to an absolute
    /// tolerance of `epsilon` times the depth span. Any refinement failure is
    /// returned as an error.
    pub fn build<P>(
        profile: &P,
        domain: (f64, f64),
        omega: f64,
        n_ref: usize,
        epsilon: f64,
        maxiters: usize,
    ) -> ModeResult<Self>
    where P: Stratification + ?Sized
    {
        let (bottom, top) = domain;
        if !(bottom < top) { return Err(ConfigError::BadDomain(bottom, top).into()); }
        if n_ref < 5 { return Err(ConfigError::TooFewReferencePoints(n_ref).into()); }

        let omega2 = omega * omega;
        let z: nd::Array1<f64> = nd::Array1::linspace(bottom, top, n_ref);
        let dz = z[1] - z[0];
        let n2_shift: nd::Array1<f64> = profile.n2_array(&z) - omega2;
        let integrand = n2_shift.mapv(|nk| nk.abs().sqrt());
        let xi = cumtrapz(&integrand, dz);
        if !(xi[n_ref - 1] > 0.0) { return Err(ModeError::DegenerateStretch); }

        let tol = epsilon * (top - bottom);
        let mut turning_points: Vec<f64>
            = interp::sign_changes(&z, &n2_shift, Zero::All).into_iter()
            .map(|crossing| {
                match crossing {
                    Crossing::Exact(zt) => Ok(zt),
                    Crossing::Bracket(a, b) => {
                        interp::refine_root(
                            |zk| profile.n2(zk) - omega2,
                            (a, b),
                            tol,
                            maxiters,
                        )
                    },
                }
            })
            .collect::<Result<Vec<f64>, _>>()?;
        turning_points.retain(|zt| *zt > bottom + tol && *zt < top - tol);
        turning_points.sort_by(|l, r| l.total_cmp(r));
        turning_points.dedup_by(|l, r| (*l - *r).abs() <= tol);

        Ok(Self { omega, z, xi, turning_points })
    }

    /// Forcing frequency the coordinate was built for.
    pub fn omega(&self) -> f64 { self.omega }

    /// Reference depths, ascending.
    pub fn z(&self) -> &nd::Array1<f64> { &self.z }

    /// Stretched coordinate at each reference depth.
    pub fn xi(&self) -> &nd::Array1<f64> { &self.xi }

    /// Interior turning points, strictly ascending.
    pub fn turning_points(&self) -> &[f64] { &self.turning_points }

    /// Number of coupled subdomains (turning points + 1).
    pub fn n_equations(&self) -> usize { self.turning_points.len() + 1 }

    /// Bottom of the depth domain.
    pub fn bottom(&self) -> f64 { self.z[0] }

    /// Top of the depth domain.
    pub fn top(&self) -> f64 { self.z[self.z.len() - 1] }

    /// Total extent of the stretched coordinate.
    pub fn xi_total(&self) -> f64 { self.xi[self.xi.len() - 1] }

    /// Stretched coordinate at an arbitrary depth.
    pub fn xi_at(&self, z: f64) -> f64 { interp1(&self.z, &self.xi, z) }

    /// Depth at an arbitrary value of the stretched coordinate.
    pub fn z_at(&self, xi: f64) -> f64 { interp1(&self.xi, &self.z, xi) }

    /// Subdomain boundaries in depth, ordered from the top:
    /// `[top, turning points (descending)..., bottom]`.
    pub fn z_boundaries(&self) -> Vec<f64> {
        let mut zb: Vec<f64> = Vec::with_capacity(self.turning_points.len() + 2);
        zb.push(self.top());
        zb.extend(self.turning_points.iter().rev());
        zb.push(self.bottom());
        zb
    }

    /// Subdomain boundaries in the stretched coordinate, in the same order as
    /// [`Self::z_boundaries`].
    pub fn xi_boundaries(&self) -> Vec<f64> {
        let n = self.turning_points.len();
        let mut xib: Vec<f64> = Vec::with_capacity(n + 2);
        xib.push(self.xi_total());
        xib.extend(self.turning_points.iter().rev().map(|zt| self.xi_at(*zt)));
        xib.push(0.0);
        xib
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::profile::N2Function;
    use super::*;

    const N0: f64 = 5.2e-3;
    const B: f64 = 1300.0;

    fn exponential() -> N2Function<impl Fn(f64) -> f64> {
        N2Function(|z: f64| N0 * N0 * (2.0 * z / B).exp())
    }

    #[test]
    fn no_turning_points_at_zero_frequency() {
        let s = StretchedCoordinate::build(
            &exponential(), (-4000.0, 0.0), 0.0, 2001, 1e-12, 1000).unwrap();
        assert!(s.turning_points().is_empty());
        assert_eq!(s.n_equations(), 1);
        assert_eq!(s.z_boundaries(), vec![0.0, -4000.0]);
        // ξ = N0 b (1 - exp(-L/b)) for N = N0 exp(z/b)
        let expected = N0 * B * (1.0 - (-4000.0 / B).exp());
        assert_relative_eq!(s.xi_total(), expected, max_relative = 1e-6);
    }

    #[test]
    fn single_turning_point() {
        let omega = N0 * (-1.0_f64).exp();
        let s = StretchedCoordinate::build(
            &exponential(), (-4000.0, 0.0), omega, 2001, 1e-12, 1000).unwrap();
        assert_eq!(s.n_equations(), 2);
        // N² = ω² at z = b ln(ω / N0) = -b
        assert_relative_eq!(s.turning_points()[0], -B, max_relative = 1e-9);
        let xib = s.xi_boundaries();
        assert_eq!(xib.len(), 3);
        assert!(xib[0] > xib[1] && xib[1] > xib[2]);
    }

    #[test]
    fn turning_point_across_neutral_layer() {
        // stable over neutral over a density inversion
        let n2 = N2Function(|z: f64| {
            if z > -300.0 { 1e-5 } else if z > -600.0 { 0.0 } else { -1e-6 }
        });
        let s = StretchedCoordinate::build(
            &n2, (-1000.0, 0.0), 0.0, 2049, 1e-12, 1000).unwrap();
        assert_eq!(s.n_equations(), 2);
        let zt = s.turning_points()[0];
        assert!(zt > -600.0 && zt <= -300.0);
    }

    #[test]
    fn xi_is_monotonic() {
        let n2 = N2Function(|z: f64| 1e-5 * (z / 200.0).sin());
        for omega in [0.0, 1e-3, 2e-3, 1.0] {
            let s = StretchedCoordinate::build(
                &n2, (-3000.0, 0.0), omega, 1001, 1e-12, 1000).unwrap();
            assert!(s.xi().iter().zip(s.xi().iter().skip(1)).all(|(a, b)| a <= b));
        }
    }

    #[test]
    fn bad_inputs() {
        assert!(matches!(
            StretchedCoordinate::build(&exponential(), (0.0, -10.0), 0.0, 100, 1e-12, 10),
            Err(ModeError::Config(ConfigError::BadDomain(..)))
        ));
        let w: f64 = 1e-3;
        let flat = N2Function(move |_: f64| w * w);
        assert!(matches!(
            StretchedCoordinate::build(&flat, (-10.0, 0.0), w, 100, 1e-12, 10),
            Err(ModeError::DegenerateStretch)
        ));
    }
}
