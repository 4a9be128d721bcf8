//! Ocean stratification profiles.
//!
//! A profile only has to supply the squared buoyancy (Brunt–Väisälä)
//! frequency N²(z) at arbitrary depth. Depth `z` is measured upward, so the
//! ocean interior has `z < 0` when the surface sits at `z = 0`.

use ndarray as nd;
use crate::{
    Arr1,
    error::{ ConfigError, LengthError },
    units,
    utils::interp1,
};

/// Evaluable stratification.
pub trait Stratification {
    /// Squared buoyancy frequency at depth `z` (s^-2).
    fn n2(&self, z: f64) -> f64;

    /// Squared buoyancy frequency at each of a set of depths.
    fn n2_array(&self, z: &nd::Array1<f64>) -> nd::Array1<f64> {
        z.mapv(|zk| self.n2(zk))
    }
}

impl<P: Stratification + ?Sized> Stratification for &P {
    fn n2(&self, z: f64) -> f64 { (**self).n2(z) }
}

impl<P: Stratification + ?Sized> Stratification for Box<P> {
    fn n2(&self, z: f64) -> f64 { (**self).n2(z) }
}

/// Stratification given directly as a function for N²(z).
#[derive(Copy, Clone, Debug)]
pub struct N2Function<F>(pub F);

impl<F> Stratification for N2Function<F>
where F: Fn(f64) -> f64
{
    fn n2(&self, z: f64) -> f64 { (self.0)(z) }
}

/// Stratification given as a density function ρ(z).
///
/// N² is computed as `-(g / ρ0) dρ/dz` with a centered difference, where `ρ0`
/// is the density at the top of the domain.
#[derive(Copy, Clone, Debug)]
pub struct DensityFunction<F> {
    rho: F,
    rho0: f64,
    dz: f64,
}

impl<F> DensityFunction<F>
where F: Fn(f64) -> f64
{
    /// Create a new `DensityFunction` for use over the depth range
    /// `(bottom, top)`.
    pub fn new(rho: F, domain: (f64, f64)) -> Result<Self, ConfigError> {
        let (bottom, top) = domain;
        if !(bottom < top) || !bottom.is_finite() || !top.is_finite() {
            return Err(ConfigError::BadDomain(bottom, top));
        }
        let rho0 = rho(top);
        let dz = 1e-5 * (top - bottom);
        Ok(Self { rho, rho0, dz })
    }

    /// Reference density `ρ0`.
    pub fn rho0(&self) -> f64 { self.rho0 }

    /// Density at depth `z`.
    pub fn rho(&self, z: f64) -> f64 { (self.rho)(z) }
}

impl<F> Stratification for DensityFunction<F>
where F: Fn(f64) -> f64
{
    fn n2(&self, z: f64) -> f64 {
        let drho = (self.rho)(z + self.dz) - (self.rho)(z - self.dz);
        -units::g / self.rho0 * drho / (2.0 * self.dz)
    }
}

/// Stratification given as gridded density samples.
///
/// N² is computed by finite differences at the midpoints of adjacent samples
/// and linearly interpolated between them, held constant beyond the outermost
/// midpoints. The reference density `ρ0` is the topmost sample.
#[derive(Clone, Debug)]
pub struct SampledDensity {
    z: nd::Array1<f64>,
    rho: nd::Array1<f64>,
    z_mid: nd::Array1<f64>,
    n2_mid: nd::Array1<f64>,
}

impl SampledDensity {
    /// Create a new `SampledDensity` from strictly increasing depths and the
    /// densities sampled there.
    pub fn new<S, T>(z: &Arr1<S>, rho: &Arr1<T>) -> Result<Self, ConfigError>
    where
        S: nd::Data<Elem = f64>,
        T: nd::Data<Elem = f64>,
    {
        LengthError::check(z, rho)?;
        if z.len() < 2 {
            return Err(ConfigError::TooFewPoints { got: z.len(), min: 2 });
        }
        if z.iter().zip(z.iter().skip(1)).any(|(zk, zkp1)| !(zk < zkp1)) {
            return Err(ConfigError::UnsortedSamples);
        }
        let rho0 = rho[rho.len() - 1];
        let z_mid: nd::Array1<f64>
            = z.iter().zip(z.iter().skip(1))
            .map(|(zk, zkp1)| (zk + zkp1) / 2.0)
            .collect();
        let n2_mid: nd::Array1<f64>
            = z.iter().zip(z.iter().skip(1))
            .zip(rho.iter().zip(rho.iter().skip(1)))
            .map(|((zk, zkp1), (rk, rkp1))| {
                -units::g / rho0 * (rkp1 - rk) / (zkp1 - zk)
            })
            .collect();
        Ok(Self { z: z.to_owned(), rho: rho.to_owned(), z_mid, n2_mid })
    }

    /// Sampled depths.
    pub fn z(&self) -> &nd::Array1<f64> { &self.z }

    /// Sampled densities.
    pub fn rho(&self) -> &nd::Array1<f64> { &self.rho }
}

impl Stratification for SampledDensity {
    fn n2(&self, z: f64) -> f64 { interp1(&self.z_mid, &self.n2_mid, z) }
}
