use basis::BasisError;
use linalg::SvdError;
use wavepacket::WavepacketError;

#[derive(Debug, thiserror::Error)]
pub enum LocalizationError {
    #[error("localization needs at least {required} internal axes, the basis has {found}")]
    TooFewAxes { required: usize, found: usize },

    #[error("{n_local} trial states exceed the {n_original} bands being localized")]
    TooManyLocalBands { n_local: usize, n_original: usize },

    #[error("trial states have shape {found:?}, expected [n_local, {n_samples}, {n}]")]
    TrialShape {
        n_samples: usize,
        n: usize,
        found: Vec<usize>,
    },

    #[error("localization operator at sample {sample} is {nrow}x{ncol}, expected {n_local}x{n_original}")]
    OperatorShape {
        sample: usize,
        nrow: usize,
        ncol: usize,
        n_local: usize,
        n_original: usize,
    },

    #[error("localization operator covers {found} samples, the list has {expected}")]
    SampleCount { expected: usize, found: usize },

    #[error("projection failed at sample {sample}")]
    Svd {
        sample: usize,
        #[source]
        source: SvdError,
    },

    #[error("unknown localization scheme '{name}'")]
    UnknownMethod { name: String },

    #[error("projection needs at least one trial site")]
    NoTrialSites,

    #[error(transparent)]
    Basis(#[from] BasisError),

    #[error(transparent)]
    Wavepacket(#[from] WavepacketError),
}
