//! Assembly of the matrix pencil (A, B) for the generalized eigenvalue problem
//! `A v = λ B v`, with `λ = 1 / h`.
//!
//! The unknown `v` is the concatenation of every subdomain's Chebyshev
//! coefficients for the vertical mode G. Each row of the pencil is one of
//! - an interior collocation of the mode equation,
//! - the upper boundary condition (global row 0, the surface),
//! - the lower boundary condition `G = 0` (the last global row, the bottom),
//! - a continuity constraint between adjacent subdomains.
//!
//! Interior rows use the stretched-coordinate form of d²/dz²,
//! ```text
//! d²G/dz² = |N² - ω²| d²G/dξ² + (d/dz √|N² - ω²|) dG/dξ
//! ```
//!
//! The free-surface condition `G = h dG/dz = h √|N² - ω²| dG/dξ` cannot be
//! imposed where the surface stretching rate vanishes (e.g. a mixed layer
//! reaching the surface at ω = 0). There it is replaced by its limit `G = 0`.

use std::str::FromStr;
use ndarray as nd;
use crate::{
    error::ConfigError,
    grid::Grid,
    units,
};

/// Surface stretching rates below this fraction of the largest on the grid are
/// treated as zero.
pub const VANISHING_STRETCH: f64 = 1e-6;

/// Upper boundary condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum UpperBoundary {
    /// Linearized free surface, `G = h dG/dz`.
    #[default]
    FreeSurface,
    /// Rigid lid, `G = 0`.
    RigidLid,
}

impl FromStr for UpperBoundary {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free_surface" => Ok(Self::FreeSurface),
            "rigid_lid" => Ok(Self::RigidLid),
            other => Err(ConfigError::BadBoundaryCondition(other.to_string())),
        }
    }
}

/// The fixed physical parameter of a mode computation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Forcing {
    /// Fixed horizontal wavenumber `k`, solved on the ω = 0 grid; `f0` is the
    /// Coriolis parameter.
    Wavenumber { k: f64, f0: f64 },
    /// Fixed forcing frequency, solved on the grid built for it.
    Frequency,
}

/// Classification of a pencil row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// Collocation of the mode equation.
    Interior,
    /// Upper boundary condition.
    TopBoundary,
    /// Lower boundary condition.
    BottomBoundary,
    /// Continuity of value or ξ-derivative across a subdomain boundary.
    Continuity,
}

/// Number of rows of each kind in a [`Pencil`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub interior: usize,
    pub top: usize,
    pub bottom: usize,
    pub continuity: usize,
}

impl RowCounts {
    /// Total number of rows.
    pub fn total(&self) -> usize {
        self.interior + self.top + self.bottom + self.continuity
    }
}

/// Assembled matrix pencil.
#[derive(Clone, Debug)]
pub struct Pencil {
    /// Left-hand operator.
    pub a: nd::Array2<f64>,
    /// Right-hand operator.
    pub b: nd::Array2<f64>,
    /// Kind of every row.
    pub rows: Vec<RowKind>,
}

// multiply row i of `m` by v[i]
fn scale_rows<S>(m: &nd::Array2<f64>, v: &nd::ArrayBase<S, nd::Ix1>)
    -> nd::Array2<f64>
where S: nd::Data<Elem = f64>
{
    m * &v.view().insert_axis(nd::Axis(1))
}

impl Pencil {
    /// Assemble the pencil on `grid`.
    ///
    /// For [`Forcing::Frequency`] the forcing frequency is the one `grid` was
    /// built for.
    pub fn assemble(grid: &Grid, forcing: Forcing, upper: UpperBoundary) -> Self {
        let n = grid.n_points();
        let fields = grid.fields();
        let domains = grid.domains();
        let mut a: nd::Array2<f64> = nd::Array2::zeros((n, n));
        let mut b: nd::Array2<f64> = nd::Array2::zeros((n, n));
        let mut rows: Vec<RowKind> = vec![RowKind::Interior; n];

        for d in domains.iter() {
            let r = d.range.clone();
            let abs_shift = fields.n2_shift.slice(nd::s![r.clone()]).mapv(f64::abs);
            let stretch_z = fields.stretch_z.slice(nd::s![r.clone()]);
            let mut a_blk
                = scale_rows(&d.d2, &abs_shift) + scale_rows(&d.d1, &stretch_z);
            let b_blk
                = match forcing {
                    Forcing::Wavenumber { k, f0 } => {
                        a_blk.scaled_add(-k * k, &d.basis);
                        let coef = fields.n2.slice(nd::s![r.clone()])
                            .mapv(|n2| (f0 * f0 - n2) / units::g);
                        scale_rows(&d.basis, &coef)
                    },
                    Forcing::Frequency => {
                        let coef = fields.n2_shift.slice(nd::s![r.clone()])
                            .mapv(|s| -s / units::g);
                        scale_rows(&d.basis, &coef)
                    },
                };
            a.slice_mut(nd::s![r.clone(), r.clone()]).assign(&a_blk);
            b.slice_mut(nd::s![r.clone(), r]).assign(&b_blk);
        }

        // continuity of value and ξ-derivative across each internal boundary;
        // the last row of the upper subdomain and the first row of the lower
        // subdomain are replaced
        for (upper_d, lower_d) in domains.iter().zip(domains.iter().skip(1)) {
            let (ru, rl) = (upper_d.range.clone(), lower_d.range.clone());
            let p = ru.end - 1;
            let q = rl.start;
            let last = upper_d.len() - 1;
            a.row_mut(p).fill(0.0);
            b.row_mut(p).fill(0.0);
            a.slice_mut(nd::s![p, ru.clone()]).assign(&upper_d.basis.row(last));
            a.slice_mut(nd::s![p, rl.clone()]).assign(&(-&lower_d.basis.row(0)));
            rows[p] = RowKind::Continuity;
            a.row_mut(q).fill(0.0);
            b.row_mut(q).fill(0.0);
            a.slice_mut(nd::s![q, ru]).assign(&upper_d.d1.row(last));
            a.slice_mut(nd::s![q, rl]).assign(&(-&lower_d.d1.row(0)));
            rows[q] = RowKind::Continuity;
        }

        // upper boundary
        let top = &domains[0];
        let rt = top.range.clone();
        a.row_mut(0).fill(0.0);
        b.row_mut(0).fill(0.0);
        let s_top = fields.stretch[0];
        let s_max = fields.stretch.iter().fold(0.0, |acc: f64, sk| acc.max(sk.abs()));
        let upper
            = if upper == UpperBoundary::FreeSurface
                && s_top.abs() <= VANISHING_STRETCH * s_max
            {
                log::warn!(
                    "Pencil::assemble: surface stretching rate {:e} vanishes; \
                    imposing G = 0 at the free surface",
                    s_top,
                );
                UpperBoundary::RigidLid
            } else {
                upper
            };
        match upper {
            UpperBoundary::FreeSurface => {
                a.slice_mut(nd::s![0, rt.clone()]).assign(&(&top.d1.row(0) * s_top));
                b.slice_mut(nd::s![0, rt]).assign(&top.basis.row(0));
            },
            UpperBoundary::RigidLid => {
                a.slice_mut(nd::s![0, rt]).assign(&top.basis.row(0));
            },
        }
        rows[0] = RowKind::TopBoundary;

        // lower boundary
        let bot = &domains[domains.len() - 1];
        let rb = bot.range.clone();
        a.row_mut(n - 1).fill(0.0);
        b.row_mut(n - 1).fill(0.0);
        a.slice_mut(nd::s![n - 1, rb]).assign(&bot.basis.row(bot.len() - 1));
        rows[n - 1] = RowKind::BottomBoundary;

        Self { a, b, rows }
    }

    /// Number of rows of each kind.
    pub fn row_counts(&self) -> RowCounts {
        self.rows.iter()
            .fold(RowCounts::default(), |mut acc, kind| {
                match kind {
                    RowKind::Interior => { acc.interior += 1; },
                    RowKind::TopBoundary => { acc.top += 1; },
                    RowKind::BottomBoundary => { acc.bottom += 1; },
                    RowKind::Continuity => { acc.continuity += 1; },
                }
                acc
            })
    }

    /// Size of the (square) pencil.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.rows.len() }
}
