#![allow(dead_code, non_snake_case)]

//! Computes internal gravity-wave vertical normal modes (equivalent depths and
//! mode shapes) for an arbitrary ocean stratification using an adaptive,
//! multi-domain Chebyshev spectral method.
//!
//! The vertical coordinate is first stretched by the local WKB wavenumber,
//! ```text
//! ξ(z) = ∫ √|N²(z) - ω²| dz
//! ```
//! and the depth range is split at turning points (where N² = ω²) into
//! sub-intervals, each carrying its own Chebyshev basis. The per-interval
//! operators are coupled through continuity rows and the resulting
//! generalized eigenvalue problem is solved densely.
//!
//! ```no_run
//! use ndarray as nd;
//! use vmodes::{ profile::N2Function, solver::{ Config, ModeSolver } };
//!
//! let z: nd::Array1<f64> = nd::Array1::linspace(-4000.0, 0.0, 101);
//! let n2 = N2Function(|z: f64| 5.2e-3_f64.powi(2) * (2.0 * z / 1300.0).exp());
//! let mut solver = ModeSolver::new(n2, (-4000.0, 0.0), &z, 33.0, Config::default())
//!     .unwrap();
//! let modes = solver.modes_at_wavenumber(0.01).unwrap();
//! println!("{}", modes.h);
//! ```
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod units;
pub mod utils;
pub mod interp;
pub mod chebyshev;
pub mod profile;
pub mod stretch;
pub mod domain;
pub mod fields;
pub mod transform;
pub mod grid;
pub mod pencil;
pub mod gep;
pub mod solver;

pub mod docs;

pub(crate) const DEF_EPSILON: f64 = 1e-12;
pub(crate) const DEF_MAXITERS: usize = 1000;
pub(crate) const DEF_NOISE_FLOOR: f64 = 1e-15;
pub(crate) const DEF_REFERENCE_POINTS: usize = 2049;
pub(crate) const DEF_N_POINTS: usize = 64;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
