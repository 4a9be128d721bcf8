#![allow(non_upper_case_globals)]

//! Physical constants used by the mode equations.

/// gravitational acceleration (m s^-2)
pub const g: f64 = 9.81;

/// rotation rate of the Earth (s^-1)
pub const Omega: f64 = 7.2921e-5;

/// Coriolis parameter `f0 = 2 Ω sin(latitude)` for a latitude given in degrees.
pub fn coriolis(latitude: f64) -> f64 {
    2.0 * Omega * latitude.to_radians().sin()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use super::*;

    #[test]
    fn coriolis_signs() {
        assert_eq!(coriolis(0.0), 0.0);
        assert_relative_eq!(coriolis(90.0), 2.0 * Omega, max_relative = 1e-14);
        assert_relative_eq!(coriolis(-30.0), -Omega, max_relative = 1e-12);
    }
}
