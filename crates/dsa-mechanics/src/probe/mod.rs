//! Three-attribute probe resolution.
//!
//! A probe rolls three W20, one against each attribute. Quality points start
//! at `skill - difficulty` and every point a die rolls above its attribute
//! is paid from them. Double and triple ones succeed outright; double and
//! triple twenties fail outright. When the difficulty reaches the skill
//! value the skill cannot absorb anything, so the difference is added to
//! every die instead and the probe can succeed with zero quality points at
//! best.

pub mod single;

pub use single::{SingleProbeResult, probe_single_attribute};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dice::DiceRoller;

/// Unit quality points are reported in, depending on what was probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualityLabel {
    /// Talent points (TaP*), for talents.
    #[default]
    TaP,
    /// Spell points (ZfP*), for spells.
    ZfP,
    /// Ritual points (RkP*), for rituals and magic signs.
    RkP,
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaP => write!(f, "TaP*"),
            Self::ZfP => write!(f, "ZfP*"),
            Self::RkP => write!(f, "RkP*"),
        }
    }
}

/// A special roll that overrides normal evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialRoll {
    /// Three ones.
    TripleOne,
    /// Exactly two ones.
    DoubleOne,
    /// Exactly two twenties (Patzer).
    DoubleTwenty,
    /// Three twenties.
    TripleTwenty,
}

impl SpecialRoll {
    /// Classify three rolls. Triples take precedence over doubles.
    pub fn classify(rolls: [u32; 3]) -> Option<Self> {
        let ones = rolls.iter().filter(|&&r| r == 1).count();
        let twenties = rolls.iter().filter(|&&r| r == 20).count();
        match (ones, twenties) {
            (3, _) => Some(Self::TripleOne),
            (2, _) => Some(Self::DoubleOne),
            (_, 3) => Some(Self::TripleTwenty),
            (_, 2) => Some(Self::DoubleTwenty),
            _ => None,
        }
    }

    /// Whether this roll forces success.
    pub fn is_success(self) -> bool {
        matches!(self, Self::TripleOne | Self::DoubleOne)
    }
}

/// Inputs of a three-attribute probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// Talent, spell or ritual value.
    pub skill_value: i32,
    /// Net difficulty; negative values make the probe easier.
    pub difficulty: i32,
    /// Attribute values, one per die.
    pub attributes: [i32; 3],
    /// Unit the quality points are labelled with.
    pub label: QualityLabel,
}

impl ProbeRequest {
    /// A talent probe.
    pub fn new(skill_value: i32, difficulty: i32, attributes: [i32; 3]) -> Self {
        Self {
            skill_value,
            difficulty,
            attributes,
            label: QualityLabel::TaP,
        }
    }

    /// Set the quality point label.
    pub fn with_label(mut self, label: QualityLabel) -> Self {
        self.label = label;
        self
    }
}

/// Outcome of a three-attribute probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Whether the probe succeeded.
    pub success: bool,
    /// Quality points left over; at least 1 on a normal success, 0 on failure.
    pub quality_points: i32,
    /// The three W20 rolls in attribute order.
    pub rolls: [u32; 3],
    /// Special roll, if any.
    pub special: Option<SpecialRoll>,
    /// Unit of the quality points.
    pub label: QualityLabel,
}

impl ProbeResult {
    /// Double or triple twenty.
    pub fn is_botch(&self) -> bool {
        matches!(
            self.special,
            Some(SpecialRoll::DoubleTwenty | SpecialRoll::TripleTwenty)
        )
    }

    /// Double or triple one.
    pub fn is_critical_success(&self) -> bool {
        self.special.is_some_and(SpecialRoll::is_success)
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.rolls;
        write!(f, "[{a}, {b}, {c}] ")?;
        match self.special {
            Some(SpecialRoll::TripleOne) => write!(f, "Dreifach-1! ")?,
            Some(SpecialRoll::DoubleOne) => write!(f, "Doppel-1! ")?,
            Some(SpecialRoll::DoubleTwenty) => return write!(f, "Patzer (Doppel-20)"),
            Some(SpecialRoll::TripleTwenty) => return write!(f, "Patzer (Dreifach-20)"),
            None => {}
        }
        if self.success {
            write!(f, "gelungen, {} {}", self.quality_points, self.label)
        } else {
            write!(f, "misslungen")
        }
    }
}

/// Roll three W20 and evaluate them against `request`.
pub fn perform_three_attribute_probe(
    request: &ProbeRequest,
    dice: &mut impl DiceRoller,
) -> ProbeResult {
    let rolls = [dice.d20(), dice.d20(), dice.d20()];
    evaluate_probe(request, rolls)
}

/// Evaluate already rolled dice against `request`.
pub fn evaluate_probe(request: &ProbeRequest, rolls: [u32; 3]) -> ProbeResult {
    let skill = request.skill_value;
    let special = SpecialRoll::classify(rolls);

    let (success, quality_points) = match special {
        Some(s) if s.is_success() => (true, skill.max(1)),
        Some(_) => (false, 0),
        None if skill > request.difficulty => {
            let overage: i32 = rolls
                .iter()
                .zip(request.attributes)
                .map(|(&roll, attr)| (roll as i32 - attr).max(0))
                .sum();
            let remaining = skill - request.difficulty - overage;
            if remaining >= 0 {
                (true, remaining.min(skill.max(0)).max(1))
            } else {
                (false, 0)
            }
        }
        None => {
            let penalty = request.difficulty - skill;
            let success = rolls
                .iter()
                .zip(request.attributes)
                .all(|(&roll, attr)| roll as i32 + penalty <= attr);
            (success, 0)
        }
    };

    ProbeResult {
        success,
        quality_points,
        rolls,
        special,
        label: request.label,
    }
}
