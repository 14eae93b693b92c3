use matrix::{Dot, Matrix};
use nalgebra::linalg::{SymmetricEigen, SVD};
use types::c64;
use wpconsts::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EighError {
    #[error("matrix is {nrow}x{ncol}, expected a square matrix")]
    NotSquare { nrow: usize, ncol: usize },

    #[error("matrix is not hermitian: max |H_ij - conj(H_ji)| = {deviation:.3e}")]
    NotHermitian { deviation: f64 },

    #[error("eigen index window [{lo}, {hi}] is outside [0, {n})")]
    WindowOutOfRange { lo: usize, hi: usize, n: usize },

    #[error("dense hermitian eigensolver did not converge on a {n}x{n} matrix")]
    NonConvergence { n: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SvdError {
    #[error("singular value decomposition did not converge on a {nrow}x{ncol} matrix")]
    NonConvergence { nrow: usize, ncol: usize },
}

/// Eigenpairs of one hermitian matrix, eigenvalues ascending.
///
/// Row `i` of `vectors` is the eigenvector of `eigenvalues[i]`. Each row is
/// normalized but carries an arbitrary unit-modulus phase.
#[derive(Debug, Clone)]
pub struct Eigenstates {
    pub eigenvalues: Vec<f64>,
    pub vectors: Matrix<c64>,
}

impl Eigenstates {
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    pub fn get_vector(&self, i: usize) -> Vec<c64> {
        self.vectors.get_row(i)
    }
}

pub fn check_hermitian(mat: &Matrix<c64>, tolerance: f64) -> Result<(), EighError> {
    if !mat.is_square() {
        return Err(EighError::NotSquare {
            nrow: mat.nrow(),
            ncol: mat.ncol(),
        });
    }

    let deviation = mat.hermitian_deviation();
    if deviation > tolerance * mat.max_norm().max(1.0) {
        return Err(EighError::NotHermitian { deviation });
    }

    Ok(())
}

/// Full diagonalization; eigenvalues ascending, eigenvectors as columns.
pub fn eigh(mat: &Matrix<c64>) -> Result<(Vec<f64>, Matrix<c64>), EighError> {
    check_hermitian(mat, HERMITIAN_TOLERANCE)?;

    diagonalize(mat)
}

fn diagonalize(mat: &Matrix<c64>) -> Result<(Vec<f64>, Matrix<c64>), EighError> {
    let n = mat.nrow();

    let decomposition = SymmetricEigen::try_new(mat.to_dmatrix(), f64::EPSILON, DENSE_SOLVER_MAX_ITER)
        .ok_or(EighError::NonConvergence { n })?;

    let order = utility::argsort(decomposition.eigenvalues.as_slice());

    let mut eigval = vec![0.0; n];
    let mut eigvec = Matrix::<c64>::new(n, n);

    for (inew, &iold) in order.iter().enumerate() {
        eigval[inew] = decomposition.eigenvalues[iold];

        let col = decomposition.eigenvectors.column(iold);
        for i in 0..n {
            eigvec[[i, inew]] = col[i];
        }
    }

    Ok((eigval, eigvec))
}

/// Diagonalize and keep the inclusive eigen-index window `[lo, hi]`.
///
/// `window = None` keeps every eigenpair.
pub fn eigh_window(
    mat: &Matrix<c64>,
    window: Option<(usize, usize)>,
    tolerance: f64,
) -> Result<Eigenstates, EighError> {
    check_hermitian(mat, tolerance)?;

    let n = mat.nrow();
    let (lo, hi) = match window {
        Some((lo, hi)) => (lo, hi),
        None if n > 0 => (0, n - 1),
        None => return Err(EighError::WindowOutOfRange { lo: 0, hi: 0, n }),
    };
    if lo > hi || hi >= n {
        return Err(EighError::WindowOutOfRange { lo, hi, n });
    }

    let (eigval, eigvec) = diagonalize(mat)?;

    let nstates = hi - lo + 1;
    let mut vectors = Matrix::<c64>::new(nstates, n);
    for (irow, icol) in (lo..=hi).enumerate() {
        for (j, v) in eigvec.get_col(icol).iter().enumerate() {
            vectors[[irow, j]] = *v;
        }
    }

    Ok(Eigenstates {
        eigenvalues: eigval[lo..=hi].to_vec(),
        vectors,
    })
}

/// <v|H|v>
pub fn expectation(mat: &Matrix<c64>, v: &[c64]) -> c64 {
    let hv = mat.dot(&v.to_vec());

    utility::zdot_product(v, &hv)
}

/// Closest matrix with orthonormal columns (or rows, for wide input).
///
/// With A = W S V^H this is W V^H, the unitary factor of the polar
/// decomposition. It maximizes Re tr(U^H A) over all such U.
pub fn polar_unitary(a: &Matrix<c64>) -> Result<Matrix<c64>, SvdError> {
    let (nrow, ncol) = (a.nrow(), a.ncol());
    let err = SvdError::NonConvergence { nrow, ncol };

    let svd = SVD::try_new(a.to_dmatrix(), true, true, f64::EPSILON, DENSE_SOLVER_MAX_ITER)
        .ok_or_else(|| err.clone())?;

    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(err),
    };

    Ok(Matrix::<c64>::from_dmatrix(&(u * v_t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_hermitian(n: usize, rng: &mut StdRng) -> Matrix<c64> {
        let mut m = Matrix::<c64>::new(n, n);
        for j in 0..n {
            for i in j..n {
                if i == j {
                    m[[i, i]] = c64::new(rng.gen_range(-1.0..1.0), 0.0);
                } else {
                    m[[i, j]] = c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
                    m[[j, i]] = m[[i, j]].conj();
                }
            }
        }
        m
    }

    #[test]
    fn test_eigh_two_site_hopping() {
        let t = 0.7;
        let h = Matrix::<c64>::from_row_slice(
            2,
            2,
            &[ZERO_C64, c64::new(t, 0.0), c64::new(t, 0.0), ZERO_C64],
        );

        let (e, v) = eigh(&h).unwrap();
        assert_abs_diff_eq!(e[0], -t, epsilon = 1.0e-12);
        assert_abs_diff_eq!(e[1], t, epsilon = 1.0e-12);

        // antisymmetric ground state, symmetric excited state
        let v0 = v.get_col(0);
        assert_abs_diff_eq!((v0[0] + v0[1]).norm(), 0.0, epsilon = 1.0e-12);
        let v1 = v.get_col(1);
        assert_abs_diff_eq!((v1[0] - v1[1]).norm(), 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn test_eigh_window_returns_sorted_orthonormal_rows() {
        let mut rng = StdRng::seed_from_u64(7);
        let h = random_hermitian(6, &mut rng);

        let all = eigh_window(&h, None, HERMITIAN_TOLERANCE).unwrap();
        assert_eq!(all.len(), 6);
        assert!(all.eigenvalues.windows(2).all(|w| w[0] <= w[1]));

        let part = eigh_window(&h, Some((2, 4)), HERMITIAN_TOLERANCE).unwrap();
        assert_eq!(part.len(), 3);
        for (i, e) in part.eigenvalues.iter().enumerate() {
            assert_abs_diff_eq!(*e, all.eigenvalues[i + 2], epsilon = 1.0e-10);

            let v = part.get_vector(i);
            assert_abs_diff_eq!(utility::vec_norm(&v), 1.0, epsilon = 1.0e-10);
            assert_abs_diff_eq!(expectation(&h, &v).re, *e, epsilon = 1.0e-10);

            let hv = h.dot(&v);
            for (a, b) in hv.iter().zip(v.iter()) {
                assert_abs_diff_eq!((a - b * e).norm(), 0.0, epsilon = 1.0e-10);
            }

            for j in 0..i {
                let w = part.get_vector(j);
                assert_abs_diff_eq!(utility::zdot_product(&w, &v).norm(), 0.0, epsilon = 1.0e-10);
            }
        }
    }

    #[test]
    fn test_eigh_window_rejects_bad_input() {
        let mut h = Matrix::<c64>::identity(3);
        assert_eq!(
            eigh_window(&h, Some((1, 3)), HERMITIAN_TOLERANCE).unwrap_err(),
            EighError::WindowOutOfRange { lo: 1, hi: 3, n: 3 }
        );
        assert!(matches!(
            eigh_window(&h, Some((2, 1)), HERMITIAN_TOLERANCE),
            Err(EighError::WindowOutOfRange { .. })
        ));

        h[[0, 2]] = c64::new(0.0, 0.5);
        assert!(matches!(
            eigh_window(&h, None, HERMITIAN_TOLERANCE),
            Err(EighError::NotHermitian { .. })
        ));

        let rect = Matrix::<c64>::new(2, 3);
        assert!(matches!(
            eigh_window(&rect, None, HERMITIAN_TOLERANCE),
            Err(EighError::NotSquare { nrow: 2, ncol: 3 })
        ));
    }

    #[test]
    fn test_polar_unitary_has_orthonormal_columns() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut a = Matrix::<c64>::new(4, 2);
        for v in a.as_mut_slice() {
            *v = c64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        }

        let u = polar_unitary(&a).unwrap();
        assert_eq!((u.nrow(), u.ncol()), (4, 2));

        let gram = u.adjoint().dot(&u);
        assert!(gram.max_abs_diff(&Matrix::<c64>::identity(2)) < 1.0e-10);

        // an already unitary input is returned unchanged
        let again = polar_unitary(&u).unwrap();
        assert!(again.max_abs_diff(&u) < 1.0e-10);
    }
}
