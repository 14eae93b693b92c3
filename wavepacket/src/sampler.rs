use crate::{HamiltonianBuilder, WavepacketError, WavepacketList};
use basis::{Axis, StackedBasis};
use control::Control;
use linalg::Eigenstates;
use log::{debug, info, warn};
use ndarray::{Array2, Array3};
use rayon::prelude::*;
use types::c64;
use wpconsts::*;

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub parallel: bool,
    pub hermitian_tolerance: f64,
    pub degeneracy_tolerance: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            parallel: true,
            hermitian_tolerance: HERMITIAN_TOLERANCE,
            degeneracy_tolerance: DEGENERACY_TOLERANCE,
        }
    }
}

impl SamplerConfig {
    pub fn from_control(control: &Control) -> SamplerConfig {
        SamplerConfig {
            parallel: control.is_parallel(),
            hermitian_tolerance: control.get_hermitian_tolerance(),
            degeneracy_tolerance: control.get_degeneracy_tolerance(),
        }
    }
}

/// Sample grid read from `sample_shape`.
pub fn sample_basis_from_control(control: &Control) -> StackedBasis {
    StackedBasis::fundamental(control.get_sample_shape())
}

/// Band window read from `band_count`, `band_step` and `band_offset`.
pub fn band_window_from_control(control: &Control) -> Axis {
    let n = control.get_band_count();
    let step = control.get_band_step();
    let offset = control.get_band_offset();

    if step == 1 && offset == 0 {
        Axis::Fundamental { n }
    } else {
        Axis::EvenlySpaced { n, step, offset }
    }
}

/// Inclusive eigen-index window and stride of a band window.
fn band_window_range(band_window: &Axis) -> Result<(usize, usize, usize), WavepacketError> {
    let (n, step, offset) = match band_window {
        Axis::Fundamental { n } => (*n, 1, 0),
        Axis::EvenlySpaced { n, step, offset } => (*n, *step, *offset),
        _ => return Err(WavepacketError::InvalidBandWindow),
    };

    if n == 0 || step == 0 {
        return Err(WavepacketError::InvalidBandWindow);
    }

    Ok((offset, offset + step * (n - 1), step))
}

/// A pair of neighbouring kept bands closer than the degeneracy tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct DegeneratePair {
    pub band: usize,
    pub sample: usize,
    pub gap: f64,
}

/// Samples where band `band` and `band + 1` of the list are closer than
/// `tolerance`. Empty when the list carries no eigenvalues.
pub fn find_degenerate_samples(list: &WavepacketList, tolerance: f64) -> Vec<DegeneratePair> {
    let Some(eig) = list.eigenvalues() else {
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for band in 1..eig.nrows() {
        for sample in 0..eig.ncols() {
            let gap = (eig[[band, sample]] - eig[[band - 1, sample]]).abs();
            if gap < tolerance {
                pairs.push(DegeneratePair {
                    band: band - 1,
                    sample,
                    gap,
                });
            }
        }
    }

    pairs
}

struct SampleResult {
    basis: StackedBasis,
    states: Eigenstates,
}

fn solve_sample<B: HamiltonianBuilder + ?Sized>(
    builder: &B,
    sample: usize,
    fraction: Vec<f64>,
    window: (usize, usize),
    tolerance: f64,
) -> Result<SampleResult, WavepacketError> {
    let h = builder
        .build(&fraction)
        .map_err(|source| WavepacketError::Builder {
            sample,
            fraction: fraction.clone(),
            source,
        })?;

    let n = h.basis.n();
    if h.data.nrow() != n || h.data.ncol() != n {
        return Err(WavepacketError::HamiltonianShape {
            sample,
            n,
            nrow: h.data.nrow(),
            ncol: h.data.ncol(),
        });
    }

    let states = linalg::eigh_window(&h.data, Some(window), tolerance).map_err(|source| {
        WavepacketError::Eigensolver {
            sample,
            fraction: fraction.clone(),
            window,
            source,
        }
    })?;

    debug!(
        "sample {:>5} fraction {:?} lowest eigenvalue {:.6E}",
        sample,
        fraction,
        states.eigenvalues.first().copied().unwrap_or(0.0)
    );

    Ok(SampleResult {
        basis: h.basis,
        states,
    })
}

/// Diagonalize the Hamiltonian at every sample of `sample_basis` and keep
/// the bands of `band_window`.
///
/// Sample `i` of the result is the flat row-major sample index `i`. The
/// first sample fixes the internal basis; any builder or solver failure
/// aborts the run.
pub fn generate_wavepacket<B: HamiltonianBuilder + ?Sized>(
    builder: &B,
    sample_basis: &StackedBasis,
    band_window: &Axis,
    config: &SamplerConfig,
) -> Result<WavepacketList, WavepacketError> {
    let (lo, hi, step) = band_window_range(band_window)?;
    let nband = band_window.n();

    let fractions = basis::get_wavepacket_sample_fractions(sample_basis)?;
    let nsample = sample_basis.n();

    info!(
        "sampling {} bloch fractions over {:?}, eigen window [{}, {}] step {}",
        nsample,
        sample_basis.shape(),
        lo,
        hi,
        step
    );

    let fraction_of = |i: usize| fractions.column(i).to_vec();

    let first = solve_sample(builder, 0, fraction_of(0), (lo, hi), config.hermitian_tolerance)?;

    let internal = first.basis.clone();
    if internal.ndim() != sample_basis.ndim() {
        return Err(WavepacketError::StructuralMismatch {
            sample_ndim: sample_basis.ndim(),
            internal_ndim: internal.ndim(),
        });
    }

    let solve = |i: usize| -> Result<SampleResult, WavepacketError> {
        let res = solve_sample(builder, i, fraction_of(i), (lo, hi), config.hermitian_tolerance)?;
        if res.basis != internal {
            return Err(WavepacketError::InternalBasisMismatch { sample: i });
        }
        Ok(res)
    };

    // the parallel run reports the lowest failing sample, as the serial one does
    let rest: Vec<SampleResult> = if config.parallel {
        let all: Vec<Result<SampleResult, WavepacketError>> = (1..nsample).into_par_iter().map(solve).collect();
        all.into_iter().collect::<Result<Vec<_>, _>>()?
    } else {
        (1..nsample).map(solve).collect::<Result<Vec<_>, _>>()?
    };

    let mut results = Vec::with_capacity(nsample);
    results.push(first);
    results.extend(rest);

    let n = internal.n();
    let mut data = Array3::<c64>::zeros((nband, nsample, n));
    let mut eigenvalues = Array2::<f64>::zeros((nband, nsample));

    for (isample, res) in results.iter().enumerate() {
        for band in 0..nband {
            let istate = step * band;
            eigenvalues[[band, isample]] = res.states.eigenvalues[istate];
            for (j, v) in res.states.get_vector(istate).iter().enumerate() {
                data[[band, isample, j]] = *v;
            }
        }
    }

    let list = WavepacketList::new(
        band_window.clone(),
        sample_basis.clone(),
        internal,
        data,
        Some(eigenvalues),
    )?;

    for pair in find_degenerate_samples(&list, config.degeneracy_tolerance) {
        warn!(
            "bands {} and {} are degenerate at sample {} (gap {:.3E}), their phases are not well defined",
            pair.band,
            pair.band + 1,
            pair.sample,
            pair.gap
        );
    }

    Ok(list)
}
