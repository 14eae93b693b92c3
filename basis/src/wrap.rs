use crate::BasisError;
use ndarray::ArrayView2;

/// Representative of `d` modulo `n` in (-n/2, n/2].
pub fn wrap_distance(d: isize, n: usize) -> isize {
    let r = d.rem_euclid(n as isize);

    if 2 * r > n as isize {
        r - n as isize
    } else {
        r
    }
}

/// Move each of the listed axes of `index` to its periodic image nearest
/// `origin`. Components on other axes are returned unchanged.
pub fn wrap_index_around_origin(
    shape: &[usize],
    index: &[isize],
    origin: &[isize],
    axes: &[usize],
) -> Result<Vec<isize>, BasisError> {
    let ndim = shape.len();
    for len in [index.len(), origin.len()] {
        if len != ndim {
            return Err(BasisError::RankMismatch {
                expected: ndim,
                found: len,
            });
        }
    }

    let mut wrapped = index.to_vec();
    for &ax in axes {
        if ax >= ndim {
            return Err(BasisError::AxisOutOfRange { axis: ax, ndim });
        }
        wrapped[ax] = origin[ax] + wrap_distance(index[ax] - origin[ax], shape[ax]);
    }

    Ok(wrapped)
}

/// `index` with components 0 and 1 swapped.
pub fn get_x01_mirrored_index(index: &[isize]) -> Result<Vec<isize>, BasisError> {
    if index.len() < 2 {
        return Err(BasisError::RankMismatch {
            expected: 2,
            found: index.len(),
        });
    }

    let mut mirrored = index.to_vec();
    mirrored.swap(0, 1);

    Ok(mirrored)
}

/// Image of the momentum index `nk` nearest the origin.
///
/// Row `d` of `dk` is the reciprocal vector of one step along axis `d`, so
/// the momentum of `nk` is `sum_d nk[d] * dk[d]`. Images are searched over
/// the 3^ndim cells around the (-N/2, N/2] representative, which is kept on
/// ties.
pub fn decrement_brillouin_zone(
    shape: &[usize],
    dk: ArrayView2<f64>,
    nk: &[isize],
) -> Result<Vec<isize>, BasisError> {
    let ndim = shape.len();
    if nk.len() != ndim {
        return Err(BasisError::RankMismatch {
            expected: ndim,
            found: nk.len(),
        });
    }
    if dk.nrows() != ndim {
        return Err(BasisError::RankMismatch {
            expected: ndim,
            found: dk.nrows(),
        });
    }

    let k_norm = |idx: &[isize]| -> f64 {
        let mut k = vec![0.0; dk.ncols()];
        for (row, &i) in dk.rows().into_iter().zip(idx.iter()) {
            for (kc, &b) in k.iter_mut().zip(row.iter()) {
                *kc += i as f64 * b;
            }
        }
        k.iter().map(|x| x * x).sum::<f64>()
    };

    let base: Vec<isize> = nk
        .iter()
        .zip(shape.iter())
        .map(|(&i, &n)| wrap_distance(i, n))
        .collect();

    let mut best = base.clone();
    let mut best_norm = k_norm(&base);

    let ncell = 3usize.pow(ndim as u32);
    for cell in 0..ncell {
        let mut candidate = base.clone();
        let mut rest = cell;
        for (c, &n) in candidate.iter_mut().zip(shape.iter()) {
            let shift = (rest % 3) as isize - 1;
            rest /= 3;
            *c += shift * n as isize;
        }

        let norm = k_norm(&candidate);
        if norm < best_norm - wpconsts::EPS10 * best_norm.max(1.0) {
            best = candidate;
            best_norm = norm;
        }
    }

    Ok(best)
}
