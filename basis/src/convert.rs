use crate::{BasisError, StackedBasis};
use ndarray::{Array2, ArrayD, Axis as NdAxis, IxDyn, Zip};
use rustfft::FftPlanner;
use types::c64;

/// Bloch fraction of every sample, shape (ndim, n_samples).
///
/// Along each axis the fundamental momentum index is taken in FFT order
/// with representatives in (-N/2, N/2], then divided by the axis'
/// fundamental size N.
pub fn get_wavepacket_sample_fractions(sample_basis: &StackedBasis) -> Result<Array2<f64>, BasisError> {
    for (i, ax) in sample_basis.axes().iter().enumerate() {
        if ax.n() == 0 {
            return Err(BasisError::InvalidAxis {
                axis: i,
                reason: "a sample axis needs at least one point".to_string(),
            });
        }
        if ax.sample_index(0).is_none() {
            return Err(BasisError::NotSampleAxis { axis: i });
        }
    }

    let ndim = sample_basis.ndim();
    let nsample = sample_basis.n();

    let mut fractions = Array2::<f64>::zeros((ndim, nsample));

    for isample in 0..nsample {
        let idx = sample_basis.get_stacked_index(isample)?;

        for (d, (ax, &i)) in sample_basis.axes().iter().zip(idx.iter()).enumerate() {
            let nfund = ax.fundamental_n();
            let j = ax.sample_index(i).unwrap_or(0);

            fractions[[d, isample]] = utility::fft_n2i(j, nfund) as f64 / nfund as f64;
        }
    }

    Ok(fractions)
}

/// Representation of `vector` in the fundamental position basis of `basis`.
///
/// The result is indexed row-major over `basis.fundamental_shape()`.
pub fn convert_vector_to_position_basis(
    vector: &[c64],
    basis: &StackedBasis,
) -> Result<Vec<c64>, BasisError> {
    convert(vector, basis, true)
}

/// Adjoint of [`convert_vector_to_position_basis`]; its exact inverse when
/// no axis is truncated.
pub fn convert_vector_from_position_basis(
    vector: &[c64],
    basis: &StackedBasis,
) -> Result<Vec<c64>, BasisError> {
    convert(vector, basis, false)
}

fn convert(vector: &[c64], basis: &StackedBasis, to_position: bool) -> Result<Vec<c64>, BasisError> {
    let (mut shape, expected) = if to_position {
        (basis.shape(), basis.n())
    } else {
        (basis.fundamental_shape(), basis.fundamental_n())
    };

    if vector.len() != expected {
        return Err(BasisError::LengthMismatch {
            expected,
            found: vector.len(),
        });
    }

    let mut data = ArrayD::from_shape_vec(IxDyn(&shape), vector.to_vec()).map_err(|_| {
        BasisError::LengthMismatch {
            expected,
            found: vector.len(),
        }
    })?;

    let mut planner = FftPlanner::<f64>::new();

    for (d, ax) in basis.axes().iter().enumerate() {
        shape[d] = if to_position { ax.fundamental_n() } else { ax.n() };

        let fft = ax.plan(&mut planner, to_position);
        let mut out = ArrayD::<c64>::zeros(IxDyn(&shape));

        Zip::from(data.lanes(NdAxis(d)))
            .and(out.lanes_mut(NdAxis(d)))
            .for_each(|inp, lane| {
                if to_position {
                    ax.lane_to_position(fft.as_ref(), inp, lane);
                } else {
                    ax.lane_from_position(fft.as_ref(), inp, lane);
                }
            });

        data = out;
    }

    Ok(data.iter().cloned().collect())
}
