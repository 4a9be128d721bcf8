//! Dense solution of the generalized eigenvalue problem `A v = λ B v` and
//! post-processing of the eigenvectors into normalized mode pairs.
//!
//! The pencil is reduced to the standard problem
//! ```text
//! (A⁻¹ B) v = μ v,    μ = 1 / λ
//! ```
//! which is well posed as long as `A` is invertible. Every row of `B` that
//! vanishes (boundary and continuity constraints) contributes one spurious
//! `μ = 0`; as many of the smallest `|μ|` as there are such rows are discarded,
//! along with any complex or non-finite eigenvalue.
//!
//! Everything that depends on the physical meaning of the eigenvector is
//! supplied by the caller through [`ModeTransforms`].

use ndarray as nd;
use ndarray_linalg::{ Eig, Inverse };
use num_complex::Complex64 as C64;
use crate::{
    pencil::Pencil,
    solver::ModeResult,
    units,
};

/// Rows of `B` whose entries all fall below this fraction of the largest entry
/// of `B` are treated as constraint rows.
pub const NEGLIGIBLE_ROW: f64 = 1e-12;

/// Eigenvalues with an imaginary part above this fraction of their modulus are
/// discarded.
pub const IMAGINARY_TOLERANCE: f64 = 1e-6;

/// Mode normalization policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Normalization {
    /// `(1/g) ∫ (N² - f0²) G² dz = 1`.
    #[default]
    KConstant,
    /// `(1/Lz) ∫ F² dz = 1`.
    OmegaConstant,
    /// `max |F| = 1`.
    UMax,
    /// `max |G| = 1`.
    WMax,
}

/// Operators mapping a coefficient-space eigenvector to physical quantities.
///
/// `G` is the vertical-velocity mode and `F = h dG/dz` the horizontal-velocity
/// mode. "Grid" quantities live on the solver's internal collocation grid, with
/// the surface first; "output" quantities live at the caller's depths.
pub trait ModeTransforms {
    /// Map an eigenvalue `λ` of the pencil to an equivalent depth.
    fn equivalent_depth(&self, lambda: f64) -> f64 { lambda.recip() }

    /// Number of output depths.
    fn output_len(&self) -> usize;

    /// Values of `G` at the output depths.
    fn g_output(&self, coeffs: nd::ArrayView1<f64>) -> nd::Array1<f64>;

    /// Values of `G` on the internal grid.
    fn g_grid(&self, coeffs: nd::ArrayView1<f64>) -> nd::Array1<f64>;

    /// Values of `F = h dG/dz` at the output depths.
    fn f_output(&self, coeffs: nd::ArrayView1<f64>, h: f64) -> nd::Array1<f64>;

    /// Values of `F = h dG/dz` on the internal grid.
    fn f_grid(&self, coeffs: nd::ArrayView1<f64>, h: f64) -> nd::Array1<f64>;

    /// `(1/g) ∫ (N² - f0²) G² dz` from grid values of `G`.
    fn g_norm(&self, g_grid: nd::ArrayView1<f64>) -> f64;

    /// `(1/Lz) ∫ F² dz` from grid values of `F`.
    fn f_norm(&self, f_grid: nd::ArrayView1<f64>) -> f64;
}

/// Output of a mode computation.
///
/// Modes are ordered by decreasing equivalent depth and stored column-wise.
#[derive(Clone, Debug)]
pub struct ModeSet {
    /// Equivalent depths.
    pub h: nd::Array1<f64>,
    /// `F` at the output depths, `[n_output × n_modes]`.
    pub f: nd::Array2<f64>,
    /// `G` at the output depths, `[n_output × n_modes]`.
    pub g: nd::Array2<f64>,
    /// `F` on the internal grid, `[n_grid × n_modes]`.
    pub f_grid: nd::Array2<f64>,
    /// `G` on the internal grid, `[n_grid × n_modes]`.
    pub g_grid: nd::Array2<f64>,
    /// Normalized eigenvectors in coefficient space, `[n_grid × n_modes]`.
    pub coefficients: nd::Array2<f64>,
}

impl ModeSet {
    /// Number of modes.
    pub fn n_modes(&self) -> usize { self.h.len() }

    /// Phase speeds `c = √(g h)`.
    pub fn phase_speeds(&self) -> nd::Array1<f64> {
        self.h.mapv(|h| (units::g * h).sqrt())
    }
}

// an eigenpair that survived filtering, with a real eigenvector
struct Candidate {
    h: f64,
    v: nd::Array1<f64>,
}

// rotate a complex eigenvector so that its largest component is real and
// positive, then drop the imaginary part
fn to_real(v: nd::ArrayView1<C64>) -> nd::Array1<f64> {
    let (_, pivot)
        = v.iter()
        .fold((0.0, C64::new(1.0, 0.0)), |(best, p), vk| {
            let a = vk.norm();
            if a > best { (a, *vk) } else { (best, p) }
        });
    let phase = pivot.conj() / pivot.norm().max(f64::MIN_POSITIVE);
    v.mapv(|vk| (vk * phase).re)
}

fn max_abs(x: &nd::Array1<f64>) -> f64 {
    x.iter().fold(0.0, |acc, xk| acc.max(xk.abs()))
}

/// Count the rows of `b` that carry no `λ`-dependence.
pub fn constraint_rows(b: &nd::Array2<f64>) -> usize {
    let row_max: Vec<f64>
        = b.rows().into_iter()
        .map(|r| r.iter().fold(0.0, |acc: f64, bk| acc.max(bk.abs())))
        .collect();
    let b_max = row_max.iter().copied().fold(0.0, f64::max);
    row_max.iter().filter(|rk| **rk <= NEGLIGIBLE_ROW * b_max).count()
}

// flag the `n_null` eigenvalues of smallest modulus
fn null_eigenvalues(mu: &nd::Array1<C64>, n_null: usize) -> Vec<bool> {
    let mut order: Vec<usize> = (0..mu.len()).collect();
    order.sort_by(|&l, &r| mu[l].norm().total_cmp(&mu[r].norm()));
    let mut null: Vec<bool> = vec![false; mu.len()];
    order.into_iter().take(n_null).for_each(|k| { null[k] = true; });
    null
}

/// Solve the pencil and return the physical modes, normalized according to
/// `normalization` and truncated to `max_modes` if given.
///
/// Modes whose equivalent depth or norm is not finite and positive are
/// dropped; the result may be empty.
pub fn solve<T>(
    pencil: &Pencil,
    ops: &T,
    normalization: Normalization,
    max_modes: Option<usize>,
) -> ModeResult<ModeSet>
where T: ModeTransforms + ?Sized
{
    let n = pencil.len();
    let a_inv: nd::Array2<f64> = pencil.a.inv()?;
    let m: nd::Array2<f64> = a_inv.dot(&pencil.b);
    let (mu, vecs): (nd::Array1<C64>, nd::Array2<C64>) = m.eig()?;

    let n_null = constraint_rows(&pencil.b);
    let null = null_eigenvalues(&mu, n_null);
    log::trace!("gep::solve: discarding {} constraint eigenvalue(s)", n_null);
    let mut candidates: Vec<Candidate>
        = mu.iter().zip(vecs.columns()).zip(null)
        .filter_map(|((mk, vk), is_null)| {
            if is_null || !mk.is_finite() || mk.norm() == 0.0 { return None; }
            if mk.im.abs() > IMAGINARY_TOLERANCE * mk.norm() {
                log::trace!("gep::solve: dropping complex eigenvalue {}", mk);
                return None;
            }
            let h = ops.equivalent_depth(mk.re.recip());
            if !(h.is_finite() && h > 0.0) {
                log::trace!("gep::solve: dropping non-physical depth h = {:e}", h);
                return None;
            }
            Some(Candidate { h, v: to_real(vk) })
        })
        .collect();
    candidates.sort_by(|l, r| r.h.total_cmp(&l.h));
    if let Some(max) = max_modes { candidates.truncate(max); }

    let mut h: Vec<f64> = Vec::with_capacity(candidates.len());
    let mut f: Vec<nd::Array1<f64>> = Vec::with_capacity(candidates.len());
    let mut g: Vec<nd::Array1<f64>> = Vec::with_capacity(candidates.len());
    let mut f_grid: Vec<nd::Array1<f64>> = Vec::with_capacity(candidates.len());
    let mut g_grid: Vec<nd::Array1<f64>> = Vec::with_capacity(candidates.len());
    let mut coeffs: Vec<nd::Array1<f64>> = Vec::with_capacity(candidates.len());
    for Candidate { h: hk, v } in candidates.into_iter() {
        let gk = ops.g_grid(v.view());
        let fk = ops.f_grid(v.view(), hk);
        let scale
            = match normalization {
                Normalization::KConstant => ops.g_norm(gk.view()).sqrt().recip(),
                Normalization::OmegaConstant => ops.f_norm(fk.view()).sqrt().recip(),
                Normalization::UMax => max_abs(&fk).recip(),
                Normalization::WMax => max_abs(&gk).recip(),
            };
        if !(scale.is_finite() && scale > 0.0) {
            log::trace!("gep::solve: dropping mode h = {:e} with bad norm", hk);
            continue;
        }
        let sign = if fk[0] < 0.0 { -1.0 } else { 1.0 };
        let vk = v * (sign * scale);
        f.push(ops.f_output(vk.view(), hk));
        g.push(ops.g_output(vk.view()));
        f_grid.push(fk * (sign * scale));
        g_grid.push(gk * (sign * scale));
        coeffs.push(vk);
        h.push(hk);
    }
    if h.is_empty() {
        log::warn!("gep::solve: no physical modes out of {} eigenvalues", n);
    } else {
        log::debug!(
            "gep::solve: {} mode(s), h = [{:.4e}, {:.4e}]",
            h.len(), h[0], h[h.len() - 1],
        );
    }

    let n_out = ops.output_len();
    Ok(ModeSet {
        h: nd::Array1::from(h),
        f: stack_columns(n_out, &f),
        g: stack_columns(n_out, &g),
        f_grid: stack_columns(n, &f_grid),
        g_grid: stack_columns(n, &g_grid),
        coefficients: stack_columns(n, &coeffs),
    })
}

fn stack_columns(rows: usize, cols: &[nd::Array1<f64>]) -> nd::Array2<f64> {
    let mut out: nd::Array2<f64> = nd::Array2::zeros((rows, cols.len()));
    out.columns_mut().into_iter().zip(cols)
        .for_each(|(mut o, c)| { o.assign(c); });
    out
}
