use crate::{index, Axis, BasisError};

/// Ordered product of axes; states are indexed row-major, last axis fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBasis {
    axes: Vec<Axis>,
}

impl StackedBasis {
    pub fn new(axes: Vec<Axis>) -> Result<StackedBasis, BasisError> {
        for (i, ax) in axes.iter().enumerate() {
            ax.validate()
                .map_err(|reason| BasisError::InvalidAxis { axis: i, reason })?;
        }

        Ok(StackedBasis { axes })
    }

    pub fn fundamental(shape: &[usize]) -> StackedBasis {
        StackedBasis {
            axes: shape.iter().map(|&n| Axis::Fundamental { n }).collect(),
        }
    }

    pub fn position(shape: &[usize]) -> StackedBasis {
        StackedBasis {
            axes: shape.iter().map(|&n| Axis::Position { n }).collect(),
        }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn n(&self) -> usize {
        self.axes.iter().map(|ax| ax.n()).product()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|ax| ax.n()).collect()
    }

    pub fn fundamental_shape(&self) -> Vec<usize> {
        self.axes.iter().map(|ax| ax.fundamental_n()).collect()
    }

    pub fn fundamental_n(&self) -> usize {
        self.axes.iter().map(|ax| ax.fundamental_n()).product()
    }

    pub fn get_stacked_index(&self, flat: usize) -> Result<Vec<usize>, BasisError> {
        index::get_stacked_index(&self.shape(), flat)
    }

    pub fn get_flat_index(&self, idx: &[usize]) -> Result<usize, BasisError> {
        index::get_flat_index(&self.shape(), idx)
    }

    pub fn get_flat_index_wrapped(&self, idx: &[isize]) -> Result<usize, BasisError> {
        index::get_flat_index_wrapped(&self.shape(), idx)
    }
}
