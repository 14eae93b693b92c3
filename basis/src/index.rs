// row-major stacked <-> flat index map, last axis fastest
//
//   shape (2, 3)
//   (0,0) (0,1) (0,2)        0 1 2
//   (1,0) (1,1) (1,2)        3 4 5

use crate::BasisError;

pub fn get_stacked_index(shape: &[usize], flat: usize) -> Result<Vec<usize>, BasisError> {
    let n: usize = shape.iter().product();
    if flat >= n {
        return Err(BasisError::IndexOutOfRange { index: flat, n });
    }

    let mut idx = vec![0; shape.len()];
    let mut rest = flat;
    for (i, &len) in idx.iter_mut().zip(shape.iter()).rev() {
        *i = rest % len;
        rest /= len;
    }

    Ok(idx)
}

pub fn get_flat_index(shape: &[usize], idx: &[usize]) -> Result<usize, BasisError> {
    if idx.len() != shape.len() {
        return Err(BasisError::RankMismatch {
            expected: shape.len(),
            found: idx.len(),
        });
    }

    let mut flat = 0;
    for (&i, &len) in idx.iter().zip(shape.iter()) {
        if i >= len {
            return Err(BasisError::IndexOutOfRange { index: i, n: len });
        }
        flat = flat * len + i;
    }

    Ok(flat)
}

/// Flat index of a possibly negative stacked index, each component taken
/// modulo its axis size first.
pub fn get_flat_index_wrapped(shape: &[usize], idx: &[isize]) -> Result<usize, BasisError> {
    if idx.len() != shape.len() {
        return Err(BasisError::RankMismatch {
            expected: shape.len(),
            found: idx.len(),
        });
    }

    let wrapped: Vec<usize> = idx
        .iter()
        .zip(shape.iter())
        .map(|(&i, &len)| utility::fft_i2n(i, len))
        .collect();

    get_flat_index(shape, &wrapped)
}
