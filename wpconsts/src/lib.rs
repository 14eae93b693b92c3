use std::f64;
use types::c64;

// complex units

pub const ZERO_C64: c64 = c64 { re: 0.0, im: 0.0 };
pub const ONE_C64: c64 = c64 { re: 1.0, im: 0.0 };

// pi

pub const PI: f64 = f64::consts::PI;
pub const HALFPI: f64 = 0.5 * f64::consts::PI;
pub const TWOPI: f64 = 2.0 * f64::consts::PI;

// numerical tolerances

pub const EPS8: f64 = 1E-8;
pub const EPS10: f64 = 1E-10;

// relative deviation from hermiticity accepted by the dense eigensolver
pub const HERMITIAN_TOLERANCE: f64 = EPS8;

// eigenvalue gap below which two kept bands are reported as degenerate
pub const DEGENERACY_TOLERANCE: f64 = EPS10;

// iteration cap for the dense eigen/SVD kernels; exceeding it is reported as non-convergence
pub const DENSE_SOLVER_MAX_ITER: usize = 100_000;
