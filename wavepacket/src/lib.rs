mod error;
mod hamiltonian;
mod list;
mod sampler;

pub use error::WavepacketError;
pub use hamiltonian::*;
pub use list::*;
pub use sampler::*;
