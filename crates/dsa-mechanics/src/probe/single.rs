//! Single-attribute probes (Eigenschaftsprobe).

use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;

/// Outcome of a single-attribute probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleProbeResult {
    /// The W20 roll.
    pub roll: u32,
    /// Whether the probe succeeded.
    pub success: bool,
}

/// Roll one W20 against `value - modifier`. A 1 always succeeds, a 20
/// always fails.
pub fn probe_single_attribute(
    value: i32,
    modifier: i32,
    dice: &mut impl DiceRoller,
) -> SingleProbeResult {
    let roll = dice.d20();
    let success = match roll {
        1 => true,
        20 => false,
        r => r as i32 <= value - modifier,
    };
    SingleProbeResult { roll, success }
}
