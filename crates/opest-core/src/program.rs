//! Append-only quantum program representation with a stable textual form.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Single-qubit gate or measurement understood by OPEST backends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "UPPERCASE")]
pub enum Instruction {
    /// Identity (no-op) on a qubit.
    I {
        /// Target qubit.
        qubit: usize,
    },
    /// Pauli X (bit flip).
    X {
        /// Target qubit.
        qubit: usize,
    },
    /// Pauli Y.
    Y {
        /// Target qubit.
        qubit: usize,
    },
    /// Pauli Z.
    Z {
        /// Target qubit.
        qubit: usize,
    },
    /// Hadamard.
    H {
        /// Target qubit.
        qubit: usize,
    },
    /// Rotation about the X axis by `angle` radians.
    RX {
        /// Rotation angle in radians.
        angle: f64,
        /// Target qubit.
        qubit: usize,
    },
    /// Rotation about the Y axis by `angle` radians.
    RY {
        /// Rotation angle in radians.
        angle: f64,
        /// Target qubit.
        qubit: usize,
    },
    /// Rotation about the Z axis by `angle` radians.
    RZ {
        /// Rotation angle in radians.
        angle: f64,
        /// Target qubit.
        qubit: usize,
    },
    /// Computational basis measurement into classical slot `ro[slot]`.
    Measure {
        /// Measured qubit.
        qubit: usize,
        /// Index into the classical readout register.
        slot: usize,
    },
}

impl Instruction {
    /// Returns the qubit the instruction acts on.
    pub fn qubit(&self) -> usize {
        match *self {
            Instruction::I { qubit }
            | Instruction::X { qubit }
            | Instruction::Y { qubit }
            | Instruction::Z { qubit }
            | Instruction::H { qubit }
            | Instruction::RX { qubit, .. }
            | Instruction::RY { qubit, .. }
            | Instruction::RZ { qubit, .. }
            | Instruction::Measure { qubit, .. } => qubit,
        }
    }

    /// True for measurement instructions.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Instruction::Measure { .. })
    }
}

fn format_angle(angle: f64) -> String {
    let halves = angle / FRAC_PI_2;
    let rounded = halves.round();
    if (halves - rounded).abs() > 1e-12 {
        return format!("{angle}");
    }
    match rounded as i64 {
        0 => "0".to_string(),
        1 => "pi/2".to_string(),
        -1 => "-pi/2".to_string(),
        2 => "pi".to_string(),
        -2 => "-pi".to_string(),
        k if k % 2 == 0 => format!("{}*pi", k / 2),
        k => format!("{k}*pi/2"),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::I { qubit } => write!(f, "I {qubit}"),
            Instruction::X { qubit } => write!(f, "X {qubit}"),
            Instruction::Y { qubit } => write!(f, "Y {qubit}"),
            Instruction::Z { qubit } => write!(f, "Z {qubit}"),
            Instruction::H { qubit } => write!(f, "H {qubit}"),
            Instruction::RX { angle, qubit } => write!(f, "RX({}) {qubit}", format_angle(angle)),
            Instruction::RY { angle, qubit } => write!(f, "RY({}) {qubit}", format_angle(angle)),
            Instruction::RZ { angle, qubit } => write!(f, "RZ({}) {qubit}", format_angle(angle)),
            Instruction::Measure { qubit, slot } => write!(f, "MEASURE {qubit} ro[{slot}]"),
        }
    }
}

/// Ordered instruction list. Composition only ever appends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction, builder style.
    pub fn inst(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends an instruction in place.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Appends all instructions of `other`.
    pub fn extend_from(&mut self, other: &Program) {
        self.instructions.extend_from_slice(&other.instructions);
    }

    /// Returns the instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True when the program holds no instruction.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Membership test, used to compare unordered rotation sets.
    pub fn contains(&self, instruction: &Instruction) -> bool {
        self.instructions.contains(instruction)
    }

    /// Iterates over the instructions.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// `(qubit, slot)` pairs of all measurements in program order.
    pub fn measurements(&self) -> Vec<(usize, usize)> {
        self.instructions
            .iter()
            .filter_map(|instruction| match *instruction {
                Instruction::Measure { qubit, slot } => Some((qubit, slot)),
                _ => None,
            })
            .collect()
    }

    /// Width of the classical readout register.
    pub fn num_slots(&self) -> usize {
        self.measurements()
            .iter()
            .map(|&(_, slot)| slot + 1)
            .max()
            .unwrap_or(0)
    }

    /// Textual form, one instruction per line.
    pub fn out(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

impl Add for Program {
    type Output = Program;

    fn add(mut self, rhs: Program) -> Program {
        self.instructions.extend(rhs.instructions);
        self
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
