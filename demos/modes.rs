use ndarray as nd;
use vmodes::{
    profile::{ DensityFunction, N2Function },
    solver::{ Config, ModeSolver, UpperBoundary },
    units,
};

// vertical modes of an exponentially stratified ocean

fn main() -> anyhow::Result<()> {
    env_logger::init();

    const N0: f64 = 5.2e-3; // surface buoyancy frequency; s⁻¹
    const B: f64 = 1300.0; // e-folding scale of N; m
    const DEPTH: f64 = 4000.0; // m
    const LATITUDE: f64 = 33.0; // deg

    let z: nd::Array1<f64> = nd::Array1::linspace(-DEPTH, 0.0, 201);
    let n2 = N2Function(|z: f64| N0.powi(2) * (2.0 * z / B).exp());
    let config = Config::default()
        .with_n_points(128)
        .with_max_modes(Some(8));
    let mut solver = ModeSolver::new(n2, (-DEPTH, 0.0), &z, LATITUDE, config.clone())?;

    // equivalent depths at a few horizontal wavenumbers; the grid is reused
    for k in [0.0, 1e-4, 1e-3] {
        let modes = solver.modes_at_wavenumber(k)?;
        println!("k = {:.1e} rad/m:", k);
        modes.h.iter().zip(modes.phase_speeds().iter()).enumerate()
            .for_each(|(j, (h, c))| {
                println!("  mode {:2}: h = {:11.4e} m, c = {:9.4} m/s", j, h, c);
            });
    }

    // a frequency between f0 and N0 places a turning point at z = B ln(ω / N0)
    let omega = N0 * (-1.0_f64).exp();
    let modes = solver.modes_at_frequency(omega)?;
    println!("ω = {:.3e} rad/s:", omega);
    println!("  turning points: {:?}", solver.turning_points());
    println!("  subdomains: {}", solver.n_equations());
    println!("  h = {:.4e}", modes.h);

    // the same stratification, from density with a rigid lid
    let rho0 = 1025.0;
    let rho = move |z: f64| {
        rho0 * (1.0 - N0.powi(2) * B / (2.0 * units::g) * ((2.0 * z / B).exp() - 1.0))
    };
    let density = DensityFunction::new(rho, (-DEPTH, 0.0))?;
    let config = config.with_upper_boundary(UpperBoundary::RigidLid);
    let mut solver = ModeSolver::new(density, (-DEPTH, 0.0), &z, LATITUDE, config)?;
    let modes = solver.modes_at_wavenumber(0.0)?;
    println!("rigid lid, from density:");
    println!("  h = {:.4e}", modes.h);
    let i = z.iter().position(|zk| *zk >= -B).unwrap_or(0);
    println!("  G(z = {}) = {:.4e}", z[i], modes.g.row(i));

    Ok(())
}
