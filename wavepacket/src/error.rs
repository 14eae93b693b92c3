use crate::BuilderError;
use basis::BasisError;
use linalg::EighError;

#[derive(Debug, thiserror::Error)]
pub enum WavepacketError {
    #[error("hamiltonian basis has {internal_ndim} axes but the sample grid has {sample_ndim}")]
    StructuralMismatch {
        sample_ndim: usize,
        internal_ndim: usize,
    },

    #[error("hamiltonian at sample {sample} reports a different internal basis than sample 0")]
    InternalBasisMismatch { sample: usize },

    #[error("hamiltonian at sample {sample} is {nrow}x{ncol}, its basis has {n} states")]
    HamiltonianShape {
        sample: usize,
        n: usize,
        nrow: usize,
        ncol: usize,
    },

    #[error("diagonalization failed at sample {sample} (fraction {fraction:?}, window {window:?})")]
    Eigensolver {
        sample: usize,
        fraction: Vec<f64>,
        window: (usize, usize),
        #[source]
        source: EighError,
    },

    #[error("hamiltonian builder failed at sample {sample} (fraction {fraction:?})")]
    Builder {
        sample: usize,
        fraction: Vec<f64>,
        #[source]
        source: BuilderError,
    },

    #[error("band window must be a non-empty fundamental or evenly spaced axis")]
    InvalidBandWindow,

    #[error("data has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("band {band} is out of range for a list of {n} bands")]
    BandOutOfRange { band: usize, n: usize },

    #[error("wavepacket {index} does not share the bases of wavepacket 0")]
    WavepacketBasisMismatch { index: usize },

    #[error("cannot stack an empty set of wavepackets")]
    Empty,

    #[error(transparent)]
    Basis(#[from] BasisError),
}
