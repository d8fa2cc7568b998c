use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One of the eight primary attributes of a DSA 4.1 character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Mut (courage).
    MU,
    /// Klugheit (cleverness).
    KL,
    /// Intuition.
    IN,
    /// Charisma.
    CH,
    /// Fingerfertigkeit (dexterity).
    FF,
    /// Gewandtheit (agility).
    GE,
    /// Konstitution (constitution).
    KO,
    /// Körperkraft (strength).
    KK,
}

impl Attribute {
    /// All attributes in sheet order.
    pub const ALL: [Attribute; 8] = [
        Self::MU,
        Self::KL,
        Self::IN,
        Self::CH,
        Self::FF,
        Self::GE,
        Self::KO,
        Self::KK,
    ];

    /// The two-letter abbreviation.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::MU => "MU",
            Self::KL => "KL",
            Self::IN => "IN",
            Self::CH => "CH",
            Self::FF => "FF",
            Self::GE => "GE",
            Self::KO => "KO",
            Self::KK => "KK",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Attribute {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|a| a.abbreviation() == upper)
            .ok_or_else(|| CoreError::UnknownAttribute(s.to_string()))
    }
}

/// The attribute values of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Courage.
    pub mu: i32,
    /// Cleverness.
    pub kl: i32,
    /// Intuition.
    pub intuition: i32,
    /// Charisma.
    pub ch: i32,
    /// Dexterity.
    pub ff: i32,
    /// Agility.
    pub ge: i32,
    /// Constitution.
    pub ko: i32,
    /// Strength.
    pub kk: i32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(8)
    }
}

impl Attributes {
    /// All eight attributes set to the same value.
    pub fn uniform(value: i32) -> Self {
        Self {
            mu: value,
            kl: value,
            intuition: value,
            ch: value,
            ff: value,
            ge: value,
            ko: value,
            kk: value,
        }
    }

    /// Value of a single attribute.
    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::MU => self.mu,
            Attribute::KL => self.kl,
            Attribute::IN => self.intuition,
            Attribute::CH => self.ch,
            Attribute::FF => self.ff,
            Attribute::GE => self.ge,
            Attribute::KO => self.ko,
            Attribute::KK => self.kk,
        }
    }

    /// Return a copy with one attribute replaced.
    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        let slot = match attribute {
            Attribute::MU => &mut self.mu,
            Attribute::KL => &mut self.kl,
            Attribute::IN => &mut self.intuition,
            Attribute::CH => &mut self.ch,
            Attribute::FF => &mut self.ff,
            Attribute::GE => &mut self.ge,
            Attribute::KO => &mut self.ko,
            Attribute::KK => &mut self.kk,
        };
        *slot = value;
        self
    }

    /// Values for a triple of attributes, in order.
    pub fn triple(&self, attributes: [Attribute; 3]) -> [i32; 3] {
        attributes.map(|a| self.get(a))
    }
}
