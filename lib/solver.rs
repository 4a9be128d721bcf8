//! The user-facing mode solver.
//!
//! A [`ModeSolver`] owns a stratification profile, the caller's output depths,
//! and the current [`Grid`]. Queries at fixed horizontal wavenumber run on a
//! grid built for ω = 0; queries at fixed frequency run on a grid built for
//! that frequency. Changing the frequency builds a fresh grid and swaps it in
//! whole, so repeated queries at the same frequency only pay for matrix
//! assembly and the dense eigen-solve.
//!
//! ```no_run
//! use ndarray as nd;
//! use vmodes::{
//!     profile::N2Function,
//!     solver::{ Config, ModeSolver, UpperBoundary },
//! };
//!
//! let z: nd::Array1<f64> = nd::Array1::linspace(-5000.0, 0.0, 201);
//! let n2 = N2Function(|z: f64| 1e-5 * (z / 800.0).exp());
//! let config = Config::default()
//!     .with_n_points(96)
//!     .with_upper_boundary(UpperBoundary::RigidLid)
//!     .with_max_modes(Some(10));
//! let mut solver = ModeSolver::new(n2, (-5000.0, 0.0), &z, 20.0, config).unwrap();
//! let omega = 1.5e-3;
//! let modes = solver.modes_at_frequency(omega).unwrap();
//! println!("{} subdomain(s), h = {}", solver.n_equations(), modes.h);
//! ```

use ndarray as nd;
use crate::{
    Arr1,
    DEF_EPSILON,
    DEF_MAXITERS,
    DEF_NOISE_FLOOR,
    DEF_N_POINTS,
    DEF_REFERENCE_POINTS,
    domain::MIN_DOMAIN_POINTS,
    error::{ ConfigError, ModeError, RootError },
    gep::{ self, ModeSet, ModeTransforms },
    grid::Grid,
    pencil::{ Forcing, Pencil },
    profile::Stratification,
    transform,
    units,
};

pub use crate::{ gep::Normalization, pencil::UpperBoundary };

pub type ModeResult<T> = Result<T, ModeError>;

/// Solver options.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Total number of spectral points, shared among all subdomains.
    pub n_points: usize,
    /// Upper boundary condition.
    pub upper_boundary: UpperBoundary,
    /// Mode normalization.
    pub normalization: Normalization,
    /// Keep at most this many modes.
    pub max_modes: Option<usize>,
    /// Size of the uniform reference grid used to build the stretched
    /// coordinate.
    pub reference_points: usize,
    /// Forcing frequency of the grid built at construction.
    pub initial_frequency: f64,
    /// Chebyshev coefficients of the stratification below this fraction of
    /// the largest are zeroed.
    pub noise_floor: f64,
    /// Turning point tolerance, relative to the depth span.
    pub epsilon: f64,
    /// Iteration limit for turning point refinement.
    pub maxiters: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n_points: DEF_N_POINTS,
            upper_boundary: UpperBoundary::default(),
            normalization: Normalization::default(),
            max_modes: None,
            reference_points: DEF_REFERENCE_POINTS,
            initial_frequency: 0.0,
            noise_floor: DEF_NOISE_FLOOR,
            epsilon: DEF_EPSILON,
            maxiters: DEF_MAXITERS,
        }
    }
}

impl Config {
    pub fn with_n_points(mut self, n_points: usize) -> Self {
        self.n_points = n_points;
        self
    }

    pub fn with_upper_boundary(mut self, upper_boundary: UpperBoundary) -> Self {
        self.upper_boundary = upper_boundary;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_max_modes(mut self, max_modes: Option<usize>) -> Self {
        self.max_modes = max_modes;
        self
    }

    pub fn with_reference_points(mut self, reference_points: usize) -> Self {
        self.reference_points = reference_points;
        self
    }

    pub fn with_initial_frequency(mut self, initial_frequency: f64) -> Self {
        self.initial_frequency = initial_frequency;
        self
    }

    pub fn with_noise_floor(mut self, noise_floor: f64) -> Self {
        self.noise_floor = noise_floor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_maxiters(mut self, maxiters: usize) -> Self {
        self.maxiters = maxiters;
        self
    }

    /// Check all options for validity.
    pub fn check(&self) -> ModeResult<()> {
        if self.n_points < MIN_DOMAIN_POINTS {
            return Err(ConfigError::TooFewPoints {
                got: self.n_points,
                min: MIN_DOMAIN_POINTS,
            }.into());
        }
        if self.reference_points < 5 {
            return Err(ConfigError::TooFewReferencePoints(self.reference_points).into());
        }
        if !(self.noise_floor.is_finite() && self.noise_floor >= 0.0) {
            return Err(ConfigError::BadNoiseFloor(self.noise_floor).into());
        }
        check_frequency(self.initial_frequency)?;
        RootError::check_epsilon(self.epsilon)?;
        RootError::check_maxiters(self.maxiters)?;
        Ok(())
    }
}

fn check_frequency(omega: f64) -> Result<(), ConfigError> {
    (omega.is_finite() && omega >= 0.0).then_some(())
        .ok_or(ConfigError::BadFrequency(omega))
}

fn check_wavenumber(k: f64) -> Result<(), ConfigError> {
    (k.is_finite() && k >= 0.0).then_some(())
        .ok_or(ConfigError::BadWavenumber(k))
}

/// Computes vertical modes for a fixed stratification at a set of output
/// depths.
#[derive(Clone, Debug)]
pub struct ModeSolver<P> {
    profile: P,
    domain: (f64, f64),
    z_out: nd::Array1<f64>,
    latitude: f64,
    f0: f64,
    config: Config,
    grid: Grid,
}

impl<P> ModeSolver<P>
where P: Stratification
{
    /// Create a new solver over `domain = (bottom, top)`, returning modes at
    /// depths `z_out` for a Coriolis parameter taken at `latitude` (degrees).
    ///
    /// The initial grid is built at `config.initial_frequency`.
    pub fn new<S>(
        profile: P,
        domain: (f64, f64),
        z_out: &Arr1<S>,
        latitude: f64,
        config: Config,
    ) -> ModeResult<Self>
    where S: nd::Data<Elem = f64>
    {
        let (bottom, top) = domain;
        if !(bottom.is_finite() && top.is_finite() && bottom < top) {
            return Err(ConfigError::BadDomain(bottom, top).into());
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ConfigError::BadLatitude(latitude).into());
        }
        config.check()?;
        let grid = Grid::build(
            &profile, domain, z_out, config.initial_frequency, &config)?;
        Ok(Self {
            profile,
            domain,
            z_out: z_out.to_owned(),
            latitude,
            f0: units::coriolis(latitude),
            config,
            grid,
        })
    }

    /// Compute modes at fixed horizontal wavenumber `k` (rad m^-1).
    ///
    /// If the current grid was built for a nonzero frequency, it is first
    /// rebuilt at ω = 0.
    pub fn modes_at_wavenumber(&mut self, k: f64) -> ModeResult<ModeSet> {
        let pencil = self.pencil_at_wavenumber(k)?;
        self.solve(&pencil)
    }

    /// Compute modes at fixed forcing frequency `omega` (rad s^-1).
    ///
    /// The grid is rebuilt for `omega` if it differs from the current one;
    /// this is visible afterward through [`Self::grid`] and
    /// [`Self::turning_points`].
    pub fn modes_at_frequency(&mut self, omega: f64) -> ModeResult<ModeSet> {
        let pencil = self.pencil_at_frequency(omega)?;
        self.solve(&pencil)
    }

    /// Assemble the pencil used by [`Self::modes_at_wavenumber`].
    pub fn pencil_at_wavenumber(&mut self, k: f64) -> ModeResult<Pencil> {
        check_wavenumber(k)?;
        self.ensure_grid(0.0)?;
        let forcing = Forcing::Wavenumber { k, f0: self.f0 };
        Ok(Pencil::assemble(&self.grid, forcing, self.config.upper_boundary))
    }

    /// Assemble the pencil used by [`Self::modes_at_frequency`].
    pub fn pencil_at_frequency(&mut self, omega: f64) -> ModeResult<Pencil> {
        check_frequency(omega)?;
        self.ensure_grid(omega)?;
        Ok(Pencil::assemble(&self.grid, Forcing::Frequency, self.config.upper_boundary))
    }

    fn solve(&self, pencil: &Pencil) -> ModeResult<ModeSet> {
        let ops = ModeOperators { grid: &self.grid, f0: self.f0 };
        gep::solve(pencil, &ops, self.config.normalization, self.config.max_modes)
    }

    // the current grid is only replaced once the new one is complete
    fn ensure_grid(&mut self, omega: f64) -> ModeResult<()> {
        if self.grid.omega() != omega {
            let grid = Grid::build(
                &self.profile, self.domain, &self.z_out, omega, &self.config)?;
            log::debug!(
                "ModeSolver: rebuilt grid for omega {:.3e} -> {:.3e}",
                self.grid.omega(), omega,
            );
            self.grid = grid;
        }
        Ok(())
    }

    /// Current grid.
    pub fn grid(&self) -> &Grid { &self.grid }

    /// Turning points of the current grid, ascending.
    pub fn turning_points(&self) -> &[f64] { self.grid.stretch().turning_points() }

    /// Number of coupled subdomains in the current grid.
    pub fn n_equations(&self) -> usize { self.grid.n_equations() }

    /// Output depths.
    pub fn output_depths(&self) -> &nd::Array1<f64> { &self.z_out }

    /// Depth domain `(bottom, top)`.
    pub fn domain(&self) -> (f64, f64) { self.domain }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 { self.latitude }

    /// Coriolis parameter.
    pub fn coriolis(&self) -> f64 { self.f0 }

    /// Solver options.
    pub fn config(&self) -> &Config { &self.config }

    /// Stratification profile.
    pub fn profile(&self) -> &P { &self.profile }
}

/// Mode transforms and norms on a [`Grid`].
#[derive(Copy, Clone, Debug)]
pub struct ModeOperators<'a> {
    pub grid: &'a Grid,
    pub f0: f64,
}

impl<'a> ModeTransforms for ModeOperators<'a> {
    fn output_len(&self) -> usize { self.grid.output().z().len() }

    fn g_output(&self, coeffs: nd::ArrayView1<f64>) -> nd::Array1<f64> {
        self.grid.output().values(&coeffs)
    }

    fn g_grid(&self, coeffs: nd::ArrayView1<f64>) -> nd::Array1<f64> {
        transform::to_values(self.grid.domains(), &coeffs)
    }

    fn f_output(&self, coeffs: nd::ArrayView1<f64>, h: f64) -> nd::Array1<f64> {
        self.grid.output().z_derivative(&coeffs) * h
    }

    fn f_grid(&self, coeffs: nd::ArrayView1<f64>, h: f64) -> nd::Array1<f64> {
        let domains = self.grid.domains();
        let dg = transform::to_values(domains, &transform::differentiate(domains, &coeffs));
        &self.grid.fields().stretch * &dg * h
    }

    fn g_norm(&self, g_grid: nd::ArrayView1<f64>) -> f64 {
        let fields = self.grid.fields();
        let f02 = self.f0 * self.f0;
        let integrand: nd::Array1<f64>
            = fields.n2.iter().zip(&fields.jacobian).zip(&g_grid)
            .map(|((n2, jac), g)| (n2 - f02) * g * g * jac)
            .collect();
        transform::integrate(self.grid.domains(), &integrand) / units::g
    }

    fn f_norm(&self, f_grid: nd::ArrayView1<f64>) -> f64 {
        let fields = self.grid.fields();
        let integrand: nd::Array1<f64>
            = fields.jacobian.iter().zip(&f_grid)
            .map(|(jac, f)| f * f * jac)
            .collect();
        transform::integrate(self.grid.domains(), &integrand) / self.grid.depth()
    }
}

#[cfg(test)]
mod tests {
    use crate::profile::N2Function;
    use super::*;

    #[test]
    fn config_checks() {
        assert!(Config::default().check().is_ok());
        assert!(matches!(
            Config::default().with_n_points(2).check(),
            Err(ModeError::Config(ConfigError::TooFewPoints { got: 2, min: 3 }))
        ));
        assert!(matches!(
            Config::default().with_reference_points(4).check(),
            Err(ModeError::Config(ConfigError::TooFewReferencePoints(4)))
        ));
        assert!(matches!(
            Config::default().with_noise_floor(-1.0).check(),
            Err(ModeError::Config(ConfigError::BadNoiseFloor(..)))
        ));
        assert!(matches!(
            Config::default().with_epsilon(0.0).check(),
            Err(ModeError::Root(RootError::BadEpsilon(..)))
        ));
        assert!(matches!(
            Config::default().with_initial_frequency(f64::NAN).check(),
            Err(ModeError::Config(ConfigError::BadFrequency(..)))
        ));
    }

    #[test]
    fn bad_construction() {
        let n2 = N2Function(|_: f64| 1e-5);
        let z = nd::array![-100.0, 0.0];
        assert!(matches!(
            ModeSolver::new(n2, (-1000.0, 0.0), &z, 91.0, Config::default()),
            Err(ModeError::Config(ConfigError::BadLatitude(..)))
        ));
        assert!(matches!(
            ModeSolver::new(n2, (0.0, -1000.0), &z, 0.0, Config::default()),
            Err(ModeError::Config(ConfigError::BadDomain(..)))
        ));
        assert!(matches!(
            ModeSolver::new(n2, (-1000.0, 0.0), &nd::array![-2000.0], 0.0, Config::default()),
            Err(ModeError::Config(ConfigError::DepthOutOfRange(..)))
        ));
    }

    #[test]
    fn bad_queries_leave_grid_alone() {
        let n2 = N2Function(|_: f64| 1e-5);
        let z = nd::array![-100.0, 0.0];
        let mut solver
            = ModeSolver::new(n2, (-1000.0, 0.0), &z, 45.0, Config::default()).unwrap();
        assert!(matches!(
            solver.modes_at_wavenumber(-1.0),
            Err(ModeError::Config(ConfigError::BadWavenumber(..)))
        ));
        assert!(matches!(
            solver.modes_at_frequency(f64::INFINITY),
            Err(ModeError::Config(ConfigError::BadFrequency(..)))
        ));
        assert_eq!(solver.grid().omega(), 0.0);
        assert_eq!(solver.coriolis(), units::coriolis(45.0));
    }

    #[test]
    fn frequency_query_rebuilds_grid() {
        let n2 = N2Function(|z: f64| 5.2e-3_f64.powi(2) * (2.0 * z / 1300.0).exp());
        let z: nd::Array1<f64> = nd::Array1::linspace(-4000.0, 0.0, 21);
        let mut solver
            = ModeSolver::new(n2, (-4000.0, 0.0), &z, 0.0, Config::default()).unwrap();
        assert_eq!(solver.n_equations(), 1);
        let omega = 5.2e-3 * (-1.0_f64).exp();
        let p = solver.pencil_at_frequency(omega).unwrap();
        assert_eq!(solver.grid().omega(), omega);
        assert_eq!(solver.n_equations(), 2);
        assert_eq!(p.row_counts().continuity, 2);
        let p = solver.pencil_at_wavenumber(0.0).unwrap();
        assert_eq!(solver.grid().omega(), 0.0);
        assert_eq!(p.row_counts().continuity, 0);
    }
}
