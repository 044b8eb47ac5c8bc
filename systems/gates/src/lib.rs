#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Math gate assignment and the arithmetic applied when a gate is collected.
//!
//! Gates are assigned once per level in raster order. The k-th collectible
//! owns gate k for the lifetime of the level, so operations never shift when
//! other collectibles are consumed.

use gate_runner_core::{GateOp, MathGate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range of operand values drawn for a gate operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Smallest operand that may be drawn.
    pub min: i64,
    /// Largest operand that may be drawn.
    pub max: i64,
}

impl ValueRange {
    /// Creates a new inclusive range.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Range that always yields `value`.
    #[must_use]
    pub const fn fixed(value: i64) -> Self {
        Self::new(value, value)
    }

    /// Draws an operand uniformly from the range.
    ///
    /// A degenerate or inverted range yields `min` without consuming randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Operand ranges used for each gate operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateTuning {
    /// Operand range for addition gates.
    pub add: ValueRange,
    /// Operand range for multiplication gates.
    pub multiply: ValueRange,
    /// Operand range for subtraction gates.
    pub subtract: ValueRange,
}

impl Default for GateTuning {
    fn default() -> Self {
        Self {
            add: ValueRange::new(20, 49),
            multiply: ValueRange::new(2, 3),
            subtract: ValueRange::new(5, 24),
        }
    }
}

impl GateTuning {
    fn range_for(&self, operation: GateOp) -> ValueRange {
        match operation {
            GateOp::Add => self.add,
            GateOp::Multiply => self.multiply,
            GateOp::Subtract => self.subtract,
        }
    }
}

/// Operation bound to the gate at raster position `index`.
#[must_use]
pub const fn operation_for_slot(index: usize) -> GateOp {
    match index % 3 {
        0 => GateOp::Add,
        1 => GateOp::Multiply,
        _ => GateOp::Subtract,
    }
}

/// Builds the ordered gate sequence for a level with `count` collectibles.
pub fn assign_gates<R: Rng + ?Sized>(
    count: usize,
    tuning: &GateTuning,
    rng: &mut R,
) -> Vec<MathGate> {
    (0..count)
        .map(|index| {
            let operation = operation_for_slot(index);
            let value = tuning.range_for(operation).sample(rng);
            MathGate::new(operation, value)
        })
        .collect()
}

/// Applies `gate` to `army`, returning the new army size.
///
/// The result never drops below zero; subtraction past zero clamps.
#[must_use]
pub fn apply_gate(army: i64, gate: &MathGate) -> i64 {
    let raw = match gate.operation {
        GateOp::Add => army.saturating_add(gate.value),
        GateOp::Multiply => army.saturating_mul(gate.value),
        GateOp::Subtract => army.saturating_sub(gate.value),
    };
    raw.max(0)
}
