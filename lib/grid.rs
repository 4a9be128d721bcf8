//! The immutable grid bundle for a single forcing frequency.

use ndarray as nd;
use crate::{
    Arr1,
    domain::{ self, Subdomain },
    fields::{ self, Fields },
    profile::Stratification,
    solver::{ Config, ModeResult },
    stretch::StretchedCoordinate,
    transform::OutputResampler,
};

/// Everything derived from the stratification for one forcing frequency:
/// stretched coordinate, turning points, subdomain bases, resampled
/// coefficient fields, and the output-depth resampler.
///
/// A `Grid` is never modified after construction; a frequency change builds a
/// new one.
#[derive(Clone, Debug)]
pub struct Grid {
    stretch: StretchedCoordinate,
    domains: Vec<Subdomain>,
    fields: Fields,
    output: OutputResampler,
}

impl Grid {
    /// Build the grid for forcing frequency `omega`.
    pub fn build<P, S>(
        profile: &P,
        domain: (f64, f64),
        z_out: &Arr1<S>,
        omega: f64,
        config: &Config,
    ) -> ModeResult<Self>
    where
        P: Stratification + ?Sized,
        S: nd::Data<Elem = f64>,
    {
        let stretch = StretchedCoordinate::build(
            profile,
            domain,
            omega,
            config.reference_points,
            config.epsilon,
            config.maxiters,
        )?;
        let domains = domain::build_subdomains(&stretch, config.n_points)?;
        let fields = fields::assemble(profile, &domains, omega, config.noise_floor);
        let output = OutputResampler::build(&stretch, &domains, &fields, z_out)?;
        log::debug!(
            "grid::build: omega = {:.3e}, {} turning point(s), points per subdomain {:?}",
            omega,
            stretch.turning_points().len(),
            domains.iter().map(|d| d.len()).collect::<Vec<_>>(),
        );
        Ok(Self { stretch, domains, fields, output })
    }

    /// Forcing frequency the grid was built for.
    pub fn omega(&self) -> f64 { self.stretch.omega() }

    /// Stretched coordinate and turning points.
    pub fn stretch(&self) -> &StretchedCoordinate { &self.stretch }

    /// Subdomains, ordered from the top.
    pub fn domains(&self) -> &[Subdomain] { &self.domains }

    /// Coefficient fields on the global grid.
    pub fn fields(&self) -> &Fields { &self.fields }

    /// Output-depth resampler.
    pub fn output(&self) -> &OutputResampler { &self.output }

    /// Number of coupled subdomains.
    pub fn n_equations(&self) -> usize { self.domains.len() }

    /// Total number of spectral points.
    pub fn n_points(&self) -> usize { self.domains.iter().map(|d| d.len()).sum() }

    /// Depth at every point of the global grid, top first.
    pub fn z(&self) -> nd::Array1<f64> {
        self.domains.iter().flat_map(|d| d.z.iter().copied()).collect()
    }

    /// Stretched coordinate at every point of the global grid, top first.
    pub fn xi(&self) -> nd::Array1<f64> {
        self.domains.iter().flat_map(|d| d.xi.iter().copied()).collect()
    }

    /// Total depth of the domain.
    pub fn depth(&self) -> f64 { self.stretch.top() - self.stretch.bottom() }
}
