use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use opest_core::{Backend, ErrorInfo, Instruction, OpestError, Program, RngHandle};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ReadoutNoise;

/// Backend that answers every run with the same recorded table.
///
/// The requested trial count is ignored. Useful for recorded data and tests.
#[derive(Debug, Default)]
pub struct ReplayBackend {
    rows: Vec<Vec<u8>>,
    calls: AtomicUsize,
}

impl ReplayBackend {
    /// Replays `rows` on every call.
    pub fn new(rows: Vec<Vec<u8>>) -> Self {
        Self {
            rows,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `run` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Backend for ReplayBackend {
    fn run(&self, _program: &Program, _trials: usize) -> Result<Vec<Vec<u8>>, OpestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }
}

/// Single-qubit pure state as a Bloch vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlochVector {
    /// `<X>`.
    pub x: f64,
    /// `<Y>`.
    pub y: f64,
    /// `<Z>`.
    pub z: f64,
}

impl BlochVector {
    /// The `|0>` state.
    pub const ZERO: BlochVector = BlochVector {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    /// The `|1>` state.
    pub const ONE: BlochVector = BlochVector {
        x: 0.0,
        y: 0.0,
        z: -1.0,
    };

    /// The `|+>` state.
    pub const PLUS: BlochVector = BlochVector {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };

    /// State with polar angle `theta` and azimuth `phi`.
    pub fn from_angles(theta: f64, phi: f64) -> Self {
        Self {
            x: theta.sin() * phi.cos(),
            y: theta.sin() * phi.sin(),
            z: theta.cos(),
        }
    }

    fn rotate_x(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x,
            y: self.y * c - self.z * s,
            z: self.y * s + self.z * c,
        }
    }

    fn rotate_y(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x * c + self.z * s,
            y: self.y,
            z: -self.x * s + self.z * c,
        }
    }

    fn rotate_z(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x: self.x * c - self.y * s,
            y: self.x * s + self.y * c,
            z: self.z,
        }
    }

    fn apply(self, instruction: &Instruction) -> Self {
        match *instruction {
            Instruction::I { .. } | Instruction::Measure { .. } => self,
            Instruction::X { .. } => Self {
                x: self.x,
                y: -self.y,
                z: -self.z,
            },
            Instruction::Y { .. } => Self {
                x: -self.x,
                y: self.y,
                z: -self.z,
            },
            Instruction::Z { .. } => Self {
                x: -self.x,
                y: -self.y,
                z: self.z,
            },
            Instruction::H { .. } => Self {
                x: self.z,
                y: -self.y,
                z: self.x,
            },
            Instruction::RX { angle, .. } => self.rotate_x(angle),
            Instruction::RY { angle, .. } => self.rotate_y(angle),
            Instruction::RZ { angle, .. } => self.rotate_z(angle),
        }
    }

    /// Probability of observing 1 in the computational basis.
    pub fn prob_one(&self) -> f64 {
        ((1.0 - self.z) / 2.0).clamp(0.0, 1.0)
    }
}

impl Default for BlochVector {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Seeded simulator for unentangled qubits.
///
/// Every qubit starts in its configured state (`|0>` by default) and evolves
/// independently under the single-qubit instruction set. Measurements sample
/// the computational basis, collapse the qubit, and pass through the optional
/// readout noise.
#[derive(Debug)]
pub struct ProductStateBackend {
    initial: BTreeMap<usize, BlochVector>,
    readout: Option<ReadoutNoise>,
    rng: Mutex<RngHandle>,
}

impl ProductStateBackend {
    /// Simulator with all qubits in `|0>`.
    pub fn new(rng: RngHandle) -> Self {
        Self {
            initial: BTreeMap::new(),
            readout: None,
            rng: Mutex::new(rng),
        }
    }

    /// Sets the initial state of `qubit`.
    pub fn with_state(mut self, qubit: usize, state: BlochVector) -> Self {
        self.initial.insert(qubit, state);
        self
    }

    /// Applies asymmetric readout noise to every measurement.
    pub fn with_readout(mut self, readout: ReadoutNoise) -> Result<Self, OpestError> {
        readout.validate()?;
        self.readout = Some(readout);
        Ok(self)
    }

    fn run_once<R: Rng>(&self, program: &Program, width: usize, rng: &mut R) -> Vec<u8> {
        let mut states = self.initial.clone();
        let mut record = vec![0u8; width];
        for instruction in program {
            let qubit = instruction.qubit();
            let state = states.entry(qubit).or_default();
            match *instruction {
                Instruction::Measure { slot, .. } => {
                    let one = rng.gen_bool(state.prob_one());
                    *state = if one {
                        BlochVector::ONE
                    } else {
                        BlochVector::ZERO
                    };
                    let flipped = match self.readout {
                        Some(noise) if one => rng.gen_bool(noise.p10),
                        Some(noise) => rng.gen_bool(noise.p01),
                        None => false,
                    };
                    record[slot] = u8::from(one != flipped);
                }
                _ => *state = state.apply(instruction),
            }
        }
        record
    }
}

impl Backend for ProductStateBackend {
    fn run(&self, program: &Program, trials: usize) -> Result<Vec<Vec<u8>>, OpestError> {
        let mut rng = self.rng.lock().map_err(|_| {
            OpestError::Backend(ErrorInfo::new(
                "rng-poisoned",
                "simulator RNG lock poisoned by a panicking thread",
            ))
        })?;
        let width = program.num_slots();
        Ok((0..trials)
            .map(|_| self.run_once(program, width, &mut *rng))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn basis_rotations_map_eigenstates_to_zero() {
        let x_plus = BlochVector::PLUS.apply(&Instruction::RY {
            angle: -FRAC_PI_2,
            qubit: 0,
        });
        assert!((x_plus.z - 1.0).abs() < 1e-12);

        let y_plus = BlochVector::from_angles(FRAC_PI_2, FRAC_PI_2).apply(&Instruction::RX {
            angle: FRAC_PI_2,
            qubit: 0,
        });
        assert!((y_plus.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hadamard_twice_is_identity() {
        let state = BlochVector::from_angles(0.3, 1.1);
        let back = state
            .apply(&Instruction::H { qubit: 0 })
            .apply(&Instruction::H { qubit: 0 });
        assert!((back.x - state.x).abs() < 1e-12);
        assert!((back.y - state.y).abs() < 1e-12);
        assert!((back.z - state.z).abs() < 1e-12);
    }
}
