//! Dice and the injectable roller abstraction.
//!
//! Every rule takes a `&mut impl DiceRoller`, so production code rolls with
//! [`RandomDice`] while tests script exact outcomes with [`ScriptedDice`].

pub mod roller;

pub use roller::{FnDice, RandomDice, ScriptedDice};

use serde::{Deserialize, Serialize};

/// The dice DSA 4.1 uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    /// Six-sided die (W6).
    D6,
    /// Twenty-sided die (W20).
    D20,
}

impl Die {
    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D6 => 6,
            Self::D20 => 20,
        }
    }

    /// Parse a die from a string like "d20" or the German "W6".
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "d6" | "w6" => Some(Self::D6),
            "d20" | "w20" => Some(Self::D20),
            _ => None,
        }
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::D6 => write!(f, "W6"),
            Self::D20 => write!(f, "W20"),
        }
    }
}

/// Source of die rolls.
pub trait DiceRoller {
    /// Roll one die, returning a value in `1..=die.sides()`.
    fn roll(&mut self, die: Die) -> u32;

    /// Roll a W20.
    fn d20(&mut self) -> u32 {
        self.roll(Die::D20)
    }

    /// Roll a W6.
    fn d6(&mut self) -> u32 {
        self.roll(Die::D6)
    }
}

impl<R: DiceRoller + ?Sized> DiceRoller for &mut R {
    fn roll(&mut self, die: Die) -> u32 {
        (**self).roll(die)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_sides() {
        assert_eq!(Die::D6.sides(), 6);
        assert_eq!(Die::D20.sides(), 20);
    }

    #[test]
    fn die_from_str() {
        assert_eq!(Die::from_str_tag("d20"), Some(Die::D20));
        assert_eq!(Die::from_str_tag("W6"), Some(Die::D6));
        assert_eq!(Die::from_str_tag("d100"), None);
    }

    #[test]
    fn die_display() {
        assert_eq!(Die::D20.to_string(), "W20");
        assert_eq!(Die::D6.to_string(), "W6");
    }

    #[test]
    fn shortcuts_forward_to_roll() {
        let mut dice = ScriptedDice::new([4, 17]);
        assert_eq!(dice.d6(), 4);
        assert_eq!(dice.d20(), 17);
    }
}
