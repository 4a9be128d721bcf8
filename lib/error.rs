//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A, T, B>(
        a: &nd::ArrayBase<S, nd::Ix1>,
        b: &nd::ArrayBase<T, nd::Ix1>,
    ) -> Result<(), Self>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = B>,
    {
        let na = a.len();
        let nb = b.len();
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned when solver inputs are malformed.
///
/// These are always detected before any numerical work is done.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The depth domain must be finite with bottom strictly below top.
    #[error("depth domain must satisfy bottom < top; got ({0}, {1})")]
    BadDomain(f64, f64),

    /// The total number of spectral points is too small.
    #[error("at least {min} spectral points are required; got {got}")]
    TooFewPoints { got: usize, min: usize },

    /// The point budget leaves some subdomain with too few points.
    #[error(
        "{n_points} spectral points cannot be split over {n_equations} \
        subdomains with at least {min} points each"
    )]
    TooFewPointsPerDomain { n_points: usize, n_equations: usize, min: usize },

    /// The reference grid used to build the stretched coordinate is too
    /// coarse.
    #[error("reference grid must have at least 5 points; got {0}")]
    TooFewReferencePoints(usize),

    /// An output depth lies outside of the depth domain or is not finite.
    #[error("output depth {0} lies outside of the depth domain")]
    DepthOutOfRange(f64),

    /// Unknown label for the upper boundary condition.
    #[error("unknown upper boundary condition '{0}'; expected 'free_surface' or 'rigid_lid'")]
    BadBoundaryCondition(String),

    /// Latitude must lie in [-90, 90] degrees.
    #[error("latitude must lie in [-90, 90]; got {0}")]
    BadLatitude(f64),

    /// Horizontal wavenumbers must be finite and non-negative.
    #[error("wavenumber must be finite and non-negative; got {0}")]
    BadWavenumber(f64),

    /// Forcing frequencies must be finite and non-negative.
    #[error("frequency must be finite and non-negative; got {0}")]
    BadFrequency(f64),

    /// The relative noise floor must be finite and non-negative.
    #[error("noise floor must be finite and non-negative; got {0}")]
    BadNoiseFloor(f64),

    /// Sampled profiles need strictly increasing depths.
    #[error("sampled depths must be strictly increasing")]
    UnsortedSamples,

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),
}

/// Returned from turning point refinement in [`interp`][crate::interp].
#[derive(Debug, Error)]
pub enum RootError {
    /// Returned when a non-positive `epsilon` value is encountered.
    #[error("epsilon values must be greater than 0; got {0}")]
    BadEpsilon(f64),

    /// Returned when a non-positive `maxiters` value is encountered.
    #[error("maxiters must be greater than 0; got {0}")]
    BadMaxiters(usize),

    /// The function does not change sign (or is not finite) over the
    /// bracket.
    #[error("interp::refine_root: no sign change over bracket ({0}, {1})")]
    NoBracket(f64, f64),

    /// The iteration failed to converge.
    #[error("interp::refine_root: failed to converge within {0} iterations")]
    MaxIters(usize),
}

impl RootError {
    pub(crate) fn check_epsilon(epsilon: f64) -> Result<(), Self> {
        (epsilon > 0.0).then_some(()).ok_or(Self::BadEpsilon(epsilon))
    }

    pub(crate) fn check_maxiters(maxiters: usize) -> Result<(), Self> {
        (maxiters != 0).then_some(()).ok_or(Self::BadMaxiters(maxiters))
    }
}

/// Returned from mode solver functions.
#[derive(Debug, Error)]
pub enum ModeError {
    /// The stretched coordinate does not grow across a subdomain, i.e.
    /// N² = ω² over a finite depth range.
    #[error("subdomain {0} has zero extent in the stretched coordinate")]
    DegenerateSubdomain(usize),

    /// The stretched coordinate has zero total extent.
    #[error("stretched coordinate has zero extent; N² = ω² everywhere")]
    DegenerateStretch,

    /// [`ConfigError`]
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// [`RootError`]
    #[error("turning point error: {0}")]
    Root(#[from] RootError),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}
