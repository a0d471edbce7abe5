//! Execution backend capability.

use std::sync::Arc;

use crate::errors::OpestError;
use crate::program::Program;

/// Turns a program into classical measurement records.
///
/// `run` returns one row per trial; each row holds one bit per classical
/// readout slot of `program`, in slot order. Implementations must not mutate
/// the program and own their latency, retry and timeout policy. Any error they
/// return is propagated to the caller of the estimator unchanged.
pub trait Backend: Send + Sync {
    /// Executes `program` for `trials` repetitions.
    fn run(&self, program: &Program, trials: usize) -> Result<Vec<Vec<u8>>, OpestError>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn run(&self, program: &Program, trials: usize) -> Result<Vec<Vec<u8>>, OpestError> {
        (**self).run(program, trials)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn run(&self, program: &Program, trials: usize) -> Result<Vec<Vec<u8>>, OpestError> {
        (**self).run(program, trials)
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn run(&self, program: &Program, trials: usize) -> Result<Vec<Vec<u8>>, OpestError> {
        (**self).run(program, trials)
    }
}
