//! Concrete dice rollers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DiceRoller, Die};

/// Uniformly random dice backed by a seedable RNG.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    /// Dice seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic dice for replays and reproducible CLI runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for RandomDice {
    fn roll(&mut self, die: Die) -> u32 {
        self.rng.random_range(1..=die.sides())
    }
}

/// Dice that replay a fixed sequence, wrapping around at the end.
///
/// Values are clamped into the die's range, so a script of `[20]` used for
/// a W6 yields 6.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    values: Vec<u32>,
    next: usize,
}

impl ScriptedDice {
    /// Script the given values in order.
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
            next: 0,
        }
    }

    /// Number of values handed out so far.
    pub fn rolls_used(&self) -> usize {
        self.next
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self, die: Die) -> u32 {
        if self.values.is_empty() {
            return 1;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value.clamp(1, die.sides())
    }
}

/// Dice backed by a plain function, for callers that already own a source
/// of randomness.
pub struct FnDice<F>(pub F);

impl<F: FnMut(Die) -> u32> DiceRoller for FnDice<F> {
    fn roll(&mut self, die: Die) -> u32 {
        (self.0)(die).clamp(1, die.sides())
    }
}
