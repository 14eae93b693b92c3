#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasisError {
    #[error("index {index} is out of range for an axis of size {n}")]
    IndexOutOfRange { index: usize, n: usize },

    #[error("expected {expected} index components, found {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("vector has length {found}, basis has {expected} states")]
    LengthMismatch { expected: usize, found: usize },

    #[error("axis {axis} is out of range for a basis with {ndim} axes")]
    AxisOutOfRange { axis: usize, ndim: usize },

    #[error("axis {axis} cannot index Bloch samples")]
    NotSampleAxis { axis: usize },

    #[error("axis {axis} is malformed: {reason}")]
    InvalidAxis { axis: usize, reason: String },
}
