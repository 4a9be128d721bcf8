//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Stretched coordinate](#stretched-coordinate)
//! - [Multi-domain discretization](#multi-domain-discretization)
//! - [Boundary conditions](#boundary-conditions)
//! - [Normalization](#normalization)
//! - [Units](#units)
//!
//! # Background
//! Linear internal gravity waves in a flat-bottomed, horizontally uniform
//! ocean separate into horizontal and vertical structure. Writing the vertical
//! velocity as *G*(*z*) times a horizontal wave, the vertical structure obeys
//! ```text
//! d²G
//! --- + (N²(z) - ω²) / (g h) G = 0
//! dz²
//! ```
//! for a wave of frequency *ω*, or, at fixed horizontal wavenumber *k*,
//! ```text
//! d²G            N²(z) - f0²
//! --- - k² G  +  ----------- G = 0
//! dz²                g h
//! ```
//! where *N*²(*z*) is the squared buoyancy frequency, *f0* is the Coriolis
//! parameter, and *h* is the equivalent depth. Either form is a
//! Sturm–Liouville problem whose eigenvalues *λ* = 1/*h* are real and whose
//! eigenfunctions *G*ⱼ are the vertical-velocity modes. The associated
//! horizontal-velocity (and pressure) modes are *F*ⱼ = *h*ⱼ d*G*ⱼ/d*z*, and the
//! long-wave phase speed of mode *j* is *c*ⱼ = √(*g* *h*ⱼ).
//!
//! Mode 1 is the fastest (largest *h*); with a free surface the barotropic
//! mode appears as mode 1 with *h* close to the total depth.
//!
//! For constant *N*² between a rigid lid and a flat bottom at depth *L*, the
//! modes are *G*ⱼ ∝ sin(*m*ⱼ *z*) with *m*ⱼ = *j* π / *L* and
//! ```text
//!          N² - f0²                  N² - ω²
//! h_j = -------------   and   h_j = -------
//!       g (k² + m_j²)                g m_j²
//! ```
//! at fixed wavenumber and at fixed frequency, respectively.
//!
//! # Stretched coordinate
//! Realistic stratifications vary by orders of magnitude with depth, so modes
//! oscillate rapidly near the thermocline and slowly at depth. A single global
//! polynomial basis in *z* wastes resolution in the abyss. Instead, the
//! equation is posed in the WKB-stretched coordinate
//! ```text
//! ξ(z) = ∫ √|N²(z') - ω²| dz'
//! ```
//! integrated up from the bottom, in which the local vertical wavelength is
//! roughly uniform. The chain rule gives
//! ```text
//! d²G                    d²G     d              dG
//! --- = |N² - ω²| ---  +  -- √|N² - ω²|  --
//! dz²                    dξ²     dz             dξ
//! ```
//! The stretching rate √|*N*² - *ω*²| vanishes wherever *N*² = *ω*². These
//! *turning points* separate propagating from evanescent regions, and ξ(z) is
//! only piecewise smooth across them.
//!
//! # Multi-domain discretization
//! The depth range is split at every turning point, giving one subdomain more
//! than there are turning points. Each subdomain carries its own Chebyshev
//! basis on a Lobatto grid in ξ, ordered from the top of the subdomain to the
//! bottom, and the unknown is the concatenation of every subdomain's
//! coefficients. The total point count is split evenly, with any remainder
//! going to the bottom-most subdomain.
//!
//! The stratification is expanded in Chebyshev series over each subdomain's
//! *depth* range, where it is smooth, and its derived quantities (including
//! the *z*-derivative of the stretching rate) are computed there before being
//! evaluated at the depths of the ξ-Lobatto points.
//!
//! Collocating the mode equation gives a block-diagonal pencil *A* *v* =
//! *λ* *B* *v*. Adjacent subdomains are then coupled by overwriting two rows
//! per internal boundary: one requiring equal values of *G* and one requiring
//! equal ξ-derivatives on both sides. Every row of the final pencil is exactly
//! one of an interior collocation, the upper boundary condition, the lower
//! boundary condition, or a continuity constraint, so that
//! ```text
//! n_interior + 1 + 1 + 2 (n_subdomains - 1) = n_points
//! ```
//!
//! The pencil is solved densely as the standard problem (*A*⁻¹ *B*) *v* = *μ*
//! *v* with *μ* = 1/*λ* = *h*. Each constraint row carries no *B* component
//! and produces one *μ* = 0; as many of the smallest |*μ*| as there are such
//! rows are discarded, along with complex and negative eigenvalues.
//!
//! # Boundary conditions
//! The bottom is rigid, *G* = 0. At the surface either
//! - the linearized free surface *G* = *h* d*G*/d*z* holds, which keeps the
//!   eigenvalue dependence linear when written as d*G*/d*z* = *λ* *G*, or
//! - a rigid lid imposes *G* = 0.
//!
//! Where the surface stretching rate vanishes, as for a mixed layer reaching
//! the surface at *ω* = 0, d*G*/d*z* = √|*N*² - *ω*²| d*G*/dξ is zero for any
//! mode resolved in ξ and the free surface reduces to *G* = 0. The barotropic
//! mode is not resolved in that case.
//!
//! # Normalization
//! Modes are scaled so that one of
//! ```text
//! K-constant:      (1/g) ∫ (N² - f0²) G² dz = 1
//! ω-constant:      (1/L) ∫ F² dz = 1
//! u-max:           max |F| = 1
//! w-max:           max |G| = 1
//! ```
//! holds, with the sign chosen so that *F* is non-negative at the surface.
//! Integrals are evaluated per subdomain in ξ using Clenshaw–Curtis weights
//! and the Jacobian d*z*/dξ obtained by differentiating *z*(ξ) spectrally,
//! which stays finite at turning points.
//!
//! # Units
//! All quantities are SI: depths in meters (positive upward, so the ocean
//! interior has *z* < 0 below a surface at *z* = 0), frequencies in radians
//! per second, wavenumbers in radians per meter, and *N*² in s⁻². The
//! Coriolis parameter is *f0* = 2 Ω sin(latitude) with Ω = 7.2921 × 10⁻⁵
//! s⁻¹, and *g* = 9.81 m s⁻².
