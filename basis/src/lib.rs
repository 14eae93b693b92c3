mod axis;
mod convert;
mod error;
mod index;
mod stacked;
mod wrap;

pub use axis::Axis;
pub use convert::*;
pub use error::BasisError;
pub use index::*;
pub use stacked::StackedBasis;
pub use wrap::*;
