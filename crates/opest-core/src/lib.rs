#![deny(missing_docs)]
#![doc = "Core types for OPEST: Pauli algebra, programs, the backend contract, errors and seeded randomness."]

pub mod backend;
pub mod errors;
pub mod operand;
pub mod pauli;
pub mod program;
pub mod rng;

pub use backend::Backend;
pub use errors::{ErrorInfo, OpestError};
pub use num_complex::Complex64;
pub use operand::Operand;
pub use pauli::{si, sx, sy, sz, PauliKind, PauliSum, PauliTerm};
pub use program::{Instruction, Program};
pub use rng::{derive_labelled_seed, derive_substream_seed, RngHandle};
