use crate::Matrix;
use wpconsts::*;

use itertools::multizip;
use nalgebra::DMatrix;
use types::c64;

impl Matrix<c64> {
    pub fn identity(n: usize) -> Matrix<c64> {
        let mut mat = Matrix::<c64>::new(n, n);

        for i in 0..n {
            mat[[i, i]] = ONE_C64;
        }

        mat
    }

    pub fn adjoint(&self) -> Matrix<c64> {
        let mut data = Vec::with_capacity(self.nrow * self.ncol);
        for i in 0..self.nrow {
            for j in 0..self.ncol {
                data.push(self[[i, j]].conj())
            }
        }
        Matrix {
            nrow: self.ncol,
            ncol: self.nrow,
            data,
        }
    }

    pub fn max_norm(&self) -> f64 {
        self.data.iter().fold(0.0f64, |acc, x| acc.max(x.norm()))
    }

    /// max |A_ij - conj(A_ji)|, zero for an exactly hermitian matrix.
    pub fn hermitian_deviation(&self) -> f64 {
        assert!(self.is_square());

        let mut dev = 0.0f64;
        for j in 0..self.ncol {
            for i in j..self.nrow {
                dev = dev.max((self[[i, j]] - self[[j, i]].conj()).norm());
            }
        }

        dev
    }

    /// max |A_ij - B_ij| for matrices of equal shape.
    pub fn max_abs_diff(&self, rhs: &Matrix<c64>) -> f64 {
        assert!(self.nrow == rhs.nrow && self.ncol == rhs.ncol);

        multizip((self.data.iter(), rhs.data.iter()))
            .fold(0.0f64, |acc, (a, b)| acc.max((a - b).norm()))
    }

    pub fn to_dmatrix(&self) -> DMatrix<c64> {
        DMatrix::<c64>::from_column_slice(self.nrow, self.ncol, self.as_slice())
    }

    pub fn from_dmatrix(mat: &DMatrix<c64>) -> Matrix<c64> {
        Matrix::<c64>::from_column_slice(mat.nrows(), mat.ncols(), mat.as_slice())
    }
}

