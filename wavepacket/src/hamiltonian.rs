use basis::StackedBasis;
use matrix::Matrix;
use types::c64;

pub type BuilderError = Box<dyn std::error::Error + Send + Sync>;

/// Hermitian operator over one internal basis, `data` is basis.n() x basis.n().
#[derive(Debug, Clone)]
pub struct Hamiltonian {
    pub basis: StackedBasis,
    pub data: Matrix<c64>,
}

/// Hamiltonian at a Bloch fraction, one component per sample axis.
///
/// Implementations are pure and report the same internal basis for every
/// fraction of a run.
pub trait HamiltonianBuilder: Sync {
    fn build(&self, bloch_fraction: &[f64]) -> Result<Hamiltonian, BuilderError>;
}

impl<F> HamiltonianBuilder for F
where
    F: Fn(&[f64]) -> Result<Hamiltonian, BuilderError> + Sync,
{
    fn build(&self, bloch_fraction: &[f64]) -> Result<Hamiltonian, BuilderError> {
        self(bloch_fraction)
    }
}
