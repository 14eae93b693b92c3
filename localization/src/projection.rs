use crate::LocalizationError;
use basis::{Axis, BasisError, StackedBasis};
use log::info;
use matrix::Matrix;
use ndarray::{s, Array3};
use rayon::prelude::*;
use types::c64;
use wavepacket::WavepacketList;
use wpconsts::*;

/// Reference states indexed [local_band, sample, internal].
pub type TrialStates = Array3<c64>;

/// Per-sample band rotation, each matrix is n_local x n_original.
#[derive(Debug, Clone)]
pub struct LocalizationOperator {
    operators: Vec<Matrix<c64>>,
}

impl LocalizationOperator {
    pub fn new(operators: Vec<Matrix<c64>>) -> LocalizationOperator {
        LocalizationOperator { operators }
    }

    pub fn n_samples(&self) -> usize {
        self.operators.len()
    }

    pub fn n_local(&self) -> usize {
        self.operators.first().map(|o| o.nrow()).unwrap_or(0)
    }

    pub fn get(&self, sample: usize) -> &Matrix<c64> {
        &self.operators[sample]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Matrix<c64>> {
        self.operators.iter()
    }
}

pub trait TrialStateGenerator {
    fn trial_states(
        &self,
        sample_basis: &StackedBasis,
        basis: &StackedBasis,
    ) -> Result<TrialStates, LocalizationError>;
}

/// One point-like trial state per lattice site.
///
/// Sites are stacked indices of the unfurled position grid; the state at
/// sample k is exp(-2 pi i k . site / N) delta(x - site mod N), expressed in
/// the internal basis.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteProjection {
    pub sites: Vec<Vec<isize>>,
}

impl SiteProjection {
    pub fn new(sites: Vec<Vec<isize>>) -> SiteProjection {
        SiteProjection { sites }
    }

    /// `n_sites[d]` evenly spaced sites along each axis of a cell with
    /// `cell_shape` position points, in row-major order.
    pub fn grid(cell_shape: &[usize], n_sites: &[usize]) -> Result<SiteProjection, LocalizationError> {
        if cell_shape.len() != n_sites.len() {
            return Err(BasisError::RankMismatch {
                expected: cell_shape.len(),
                found: n_sites.len(),
            }
            .into());
        }

        let nsite: usize = n_sites.iter().product();
        let mut sites = Vec::with_capacity(nsite);
        for i in 0..nsite {
            let idx = basis::get_stacked_index(n_sites, i)?;
            sites.push(
                idx.iter()
                    .zip(cell_shape.iter().zip(n_sites.iter()))
                    .map(|(&j, (&n, &m))| (j * n / m) as isize)
                    .collect(),
            );
        }

        Ok(SiteProjection { sites })
    }
}

impl TrialStateGenerator for SiteProjection {
    fn trial_states(
        &self,
        sample_basis: &StackedBasis,
        basis: &StackedBasis,
    ) -> Result<TrialStates, LocalizationError> {
        if self.sites.is_empty() {
            return Err(LocalizationError::NoTrialSites);
        }

        let shape = basis.fundamental_shape();
        for site in self.sites.iter() {
            if site.len() != shape.len() {
                return Err(BasisError::RankMismatch {
                    expected: shape.len(),
                    found: site.len(),
                }
                .into());
            }
        }

        let fractions = basis::get_wavepacket_sample_fractions(sample_basis)?;
        if fractions.nrows() != shape.len() {
            return Err(BasisError::RankMismatch {
                expected: shape.len(),
                found: fractions.nrows(),
            }
            .into());
        }

        let nsample = sample_basis.n();
        let mut trial = Array3::<c64>::zeros((self.sites.len(), nsample, basis.n()));

        for (isite, site) in self.sites.iter().enumerate() {
            let flat = basis::get_flat_index_wrapped(&shape, site)?;

            for (k, frac) in fractions.columns().into_iter().enumerate() {
                let kx: f64 = frac
                    .iter()
                    .zip(site.iter().zip(shape.iter()))
                    .map(|(f, (&x, &n))| f * x as f64 / n as f64)
                    .sum();

                let mut point = vec![ZERO_C64; basis.fundamental_n()];
                point[flat] = c64::from_polar(1.0, -TWOPI * kx);

                let g = basis::convert_vector_from_position_basis(&point, basis)?;
                for (j, v) in g.iter().enumerate() {
                    trial[[isite, k, j]] = *v;
                }
            }
        }

        Ok(trial)
    }
}

/// Rotation of the bands of `list` closest to `trial`, one matrix per sample.
///
/// With A[m, n] = <psi_m | g_n> and A = W S V^H, the stored operator is
/// (W V^H)^T, so that every row set is orthonormal.
pub fn get_localization_operator(
    list: &WavepacketList,
    trial: &TrialStates,
) -> Result<LocalizationOperator, LocalizationError> {
    let n_original = list.n_bands();
    let nsample = list.n_samples();
    let n = list.basis().n();

    let (n_local, trial_nsample, trial_n) = trial.dim();
    if trial_nsample != nsample || trial_n != n || n_local == 0 {
        return Err(LocalizationError::TrialShape {
            n_samples: nsample,
            n,
            found: trial.shape().to_vec(),
        });
    }

    if n_local > n_original {
        return Err(LocalizationError::TooManyLocalBands { n_local, n_original });
    }

    info!(
        "building localization operator: {} bands onto {} trial states over {} samples",
        n_original, n_local, nsample
    );

    let operators = (0..nsample)
        .into_par_iter()
        .map(|k| -> Result<Matrix<c64>, LocalizationError> {
            let psi: Vec<Vec<c64>> = (0..n_original).map(|m| list.get_vector(m, k).to_vec()).collect();

            let mut overlap = Matrix::<c64>::new(n_original, n_local);
            for inl in 0..n_local {
                let g = trial.slice(s![inl, k, ..]).to_vec();
                for (m, v) in psi.iter().enumerate() {
                    overlap[[m, inl]] = utility::zdot_product(v, &g);
                }
            }

            let u = linalg::polar_unitary(&overlap)
                .map_err(|source| LocalizationError::Svd { sample: k, source })?;

            Ok(u.transpose())
        })
        .collect::<Result<Vec<_>, LocalizationError>>()?;

    Ok(LocalizationOperator { operators })
}

/// out[n, k] = sum_m O_k[n, m] psi[m, k]; eigenvalues are dropped.
pub fn get_localized_wavepackets(
    list: &WavepacketList,
    operator: &LocalizationOperator,
) -> Result<WavepacketList, LocalizationError> {
    let n_original = list.n_bands();
    let nsample = list.n_samples();
    let n_local = operator.n_local();

    if operator.n_samples() != nsample {
        return Err(LocalizationError::SampleCount {
            expected: nsample,
            found: operator.n_samples(),
        });
    }

    let mut data = Array3::<c64>::zeros((n_local, nsample, list.basis().n()));

    for (k, op) in operator.iter().enumerate() {
        if op.nrow() != n_local || op.ncol() != n_original {
            return Err(LocalizationError::OperatorShape {
                sample: k,
                nrow: op.nrow(),
                ncol: op.ncol(),
                n_local,
                n_original,
            });
        }

        for inl in 0..n_local {
            let mut out = data.slice_mut(s![inl, k, ..]);
            for m in 0..n_original {
                out.scaled_add(op[[inl, m]], &list.get_vector(m, k));
            }
        }
    }

    Ok(WavepacketList::new(
        Axis::Fundamental { n: n_local },
        list.sample_basis().clone(),
        list.basis().clone(),
        data,
        None,
    )?)
}

/// Build the operator for `generator`'s trial states and apply it.
pub fn localize_wavepacket_projection<G: TrialStateGenerator + ?Sized>(
    list: &WavepacketList,
    generator: &G,
) -> Result<WavepacketList, LocalizationError> {
    let trial = generator.trial_states(list.sample_basis(), list.basis())?;
    let operator = get_localization_operator(list, &trial)?;

    get_localized_wavepackets(list, &operator)
}
