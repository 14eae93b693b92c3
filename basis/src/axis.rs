use ndarray::{Array2, ArrayView1, ArrayViewMut1};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use types::c64;
use wpconsts::*;

/// One axis of a stacked basis.
///
/// Every variant is a set of states over a fundamental position axis with
/// `fundamental_n()` evenly spaced points across one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Axis {
    /// plain index domain [0, n)
    Fundamental { n: usize },

    /// states offset + step * i of a fundamental domain of size n * step
    EvenlySpaced { n: usize, step: usize, offset: usize },

    /// n real-space points across one cell
    Position { n: usize },

    /// the n lowest plane-wave frequencies, in FFT order, of a position axis
    /// with fundamental_n points
    Transformed { n: usize, fundamental_n: usize },

    /// row i is state i in the fundamental position representation
    Explicit { vectors: Array2<c64> },
}

impl Axis {
    pub fn n(&self) -> usize {
        match self {
            Axis::Fundamental { n } => *n,
            Axis::EvenlySpaced { n, .. } => *n,
            Axis::Position { n } => *n,
            Axis::Transformed { n, .. } => *n,
            Axis::Explicit { vectors } => vectors.nrows(),
        }
    }

    pub fn fundamental_n(&self) -> usize {
        match self {
            Axis::Fundamental { n } => *n,
            Axis::EvenlySpaced { n, step, .. } => n * step,
            Axis::Position { n } => *n,
            Axis::Transformed { fundamental_n, .. } => *fundamental_n,
            Axis::Explicit { vectors } => vectors.ncols(),
        }
    }

    /// Fundamental index of sample `i`, for axes that can index Bloch samples.
    pub fn sample_index(&self, i: usize) -> Option<usize> {
        match self {
            Axis::Fundamental { n } => i.checked_rem(*n),
            Axis::EvenlySpaced { n, step, offset } => (offset + step * i).checked_rem(n * step),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            Axis::EvenlySpaced { step, offset, .. } if *step == 0 || offset >= step => Err(format!(
                "evenly spaced axis needs 0 <= offset < step, got offset {} step {}",
                offset, step
            )),
            Axis::Transformed { n, fundamental_n } if n > fundamental_n => Err(format!(
                "{} frequencies do not fit in {} points",
                n, fundamental_n
            )),
            _ => Ok(()),
        }
    }

    /// Plan reused for every lane converted along this axis.
    pub(crate) fn plan(&self, planner: &mut FftPlanner<f64>, inverse: bool) -> Option<Arc<dyn Fft<f64>>> {
        match self {
            Axis::Transformed { fundamental_n, .. } if inverse => {
                Some(planner.plan_fft_inverse(*fundamental_n))
            }
            Axis::Transformed { fundamental_n, .. } => Some(planner.plan_fft_forward(*fundamental_n)),
            _ => None,
        }
    }

    pub(crate) fn lane_to_position(
        &self,
        fft: Option<&Arc<dyn Fft<f64>>>,
        inp: ArrayView1<c64>,
        mut out: ArrayViewMut1<c64>,
    ) {
        match self {
            Axis::Fundamental { .. } | Axis::Position { .. } => out.assign(&inp),

            Axis::EvenlySpaced { step, offset, .. } => {
                out.fill(ZERO_C64);
                for (i, v) in inp.iter().enumerate() {
                    out[offset + step * i] = *v;
                }
            }

            Axis::Transformed { n, fundamental_n } => {
                let mut buf = vec![ZERO_C64; *fundamental_n];
                for (j, v) in inp.iter().enumerate() {
                    buf[padded_index(j, *n, *fundamental_n)] = *v;
                }

                if let Some(fft) = fft {
                    fft.process(&mut buf);
                }

                let norm = 1.0 / (*fundamental_n as f64).sqrt();
                for (o, b) in out.iter_mut().zip(buf.iter()) {
                    *o = b * norm;
                }
            }

            Axis::Explicit { vectors } => {
                out.fill(ZERO_C64);
                for (row, c) in vectors.rows().into_iter().zip(inp.iter()) {
                    out.scaled_add(*c, &row);
                }
            }
        }
    }

    pub(crate) fn lane_from_position(
        &self,
        fft: Option<&Arc<dyn Fft<f64>>>,
        inp: ArrayView1<c64>,
        mut out: ArrayViewMut1<c64>,
    ) {
        match self {
            Axis::Fundamental { .. } | Axis::Position { .. } => out.assign(&inp),

            Axis::EvenlySpaced { step, offset, .. } => {
                for (i, o) in out.iter_mut().enumerate() {
                    *o = inp[offset + step * i];
                }
            }

            Axis::Transformed { n, fundamental_n } => {
                let mut buf = inp.to_vec();

                if let Some(fft) = fft {
                    fft.process(&mut buf);
                }

                let norm = 1.0 / (*fundamental_n as f64).sqrt();
                for (j, o) in out.iter_mut().enumerate() {
                    *o = buf[padded_index(j, *n, *fundamental_n)] * norm;
                }
            }

            Axis::Explicit { vectors } => {
                for (o, row) in out.iter_mut().zip(vectors.rows()) {
                    *o = utility::zdot_product(&row.to_vec(), &inp.to_vec());
                }
            }
        }
    }
}

/// Slot of coefficient `j` of a truncated axis in the zero-padded
/// fundamental array.
fn padded_index(j: usize, n: usize, fundamental_n: usize) -> usize {
    utility::fft_i2n(utility::fft_n2i(j, n), fundamental_n)
}
