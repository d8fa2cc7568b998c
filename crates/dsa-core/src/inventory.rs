//! Locations, items, weights and money.
//!
//! A location is a named container owned by a character. Every location has
//! exactly one self-item: a synthetic item standing for the container's own
//! tare weight, flagged with `is_self_item` and pointing back through
//! `self_item_for_location_id`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LocalId;

/// Ounces per stone.
pub const OUNCES_PER_STONE: i32 = 40;

/// A weight in stone and ounces, normalized so that `ounces < 40`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Weight {
    /// Whole stones.
    pub stone: i32,
    /// Remaining ounces.
    pub ounces: i32,
}

impl Weight {
    /// Build a normalized weight from a total in ounces. Negative totals
    /// clamp to zero.
    pub fn from_ounces(total: i32) -> Self {
        let total = total.max(0);
        Self {
            stone: total / OUNCES_PER_STONE,
            ounces: total % OUNCES_PER_STONE,
        }
    }

    /// Build a weight from stone and ounces, normalizing overflowing ounces.
    pub fn new(stone: i32, ounces: i32) -> Self {
        Self::from_ounces(stone * OUNCES_PER_STONE + ounces)
    }

    /// Total weight in ounces.
    pub fn total_ounces(&self) -> i32 {
        self.stone * OUNCES_PER_STONE + self.ounces
    }
}

impl std::ops::Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight::from_ounces(self.total_ounces() + rhs.total_ounces())
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stone, self.ounces) {
            (0, o) => write!(f, "{o} Unzen"),
            (s, 0) => write!(f, "{s} Stein"),
            (s, o) => write!(f, "{s} Stein {o} Unzen"),
        }
    }
}

/// A money amount broken into Mittelreich coins.
///
/// 1 Dukat = 10 Silbertaler = 100 Heller = 1000 Kreuzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// Ducats.
    pub ducats: i64,
    /// Silver thalers.
    pub silver: i64,
    /// Heller.
    pub heller: i64,
    /// Kreuzer.
    pub kreuzer: i64,
}

impl Currency {
    /// Break an amount of kreuzer into coins. Negative amounts clamp to zero.
    pub fn from_kreuzer(amount: i64) -> Self {
        let amount = amount.max(0);
        Self {
            ducats: amount / 1000,
            silver: (amount % 1000) / 100,
            heller: (amount % 100) / 10,
            kreuzer: amount % 10,
        }
    }

    /// Total value in kreuzer.
    pub fn to_kreuzer(&self) -> i64 {
        self.ducats * 1000 + self.silver * 100 + self.heller * 10 + self.kreuzer
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} D, {} S, {} H, {} K",
            self.ducats, self.silver, self.heller, self.kreuzer
        )
    }
}

/// A named container of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Device-local row id.
    pub id: LocalId,
    /// Owning character.
    pub character_id: LocalId,
    /// Name, unique per character. Used as the cross-device key.
    pub name: String,
    /// Default locations are never deleted or duplicated implicitly.
    pub is_default: bool,
    /// Whether the contents count towards carried weight.
    pub is_carried: bool,
    /// Display order.
    pub sort_order: i32,
}

impl Location {
    /// Name of the body location every character starts with.
    pub const BODY: &'static str = "Am Körper";
    /// Name of the backpack location every character starts with.
    pub const BACKPACK: &'static str = "Rucksack";

    /// A new, not yet persisted, non-default carried location.
    pub fn new(character_id: LocalId, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            character_id,
            name: name.into(),
            is_default: false,
            is_carried: true,
            sort_order: 0,
        }
    }

    /// The default locations created alongside a new character.
    pub fn defaults(character_id: LocalId) -> Vec<Location> {
        [Self::BODY, Self::BACKPACK]
            .into_iter()
            .enumerate()
            .map(|(i, name)| Location {
                is_default: true,
                sort_order: i as i32,
                ..Location::new(character_id, name)
            })
            .collect()
    }
}

/// A possession of a character, optionally placed in a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Device-local row id.
    pub id: LocalId,
    /// Owning character.
    pub character_id: LocalId,
    /// Containing location, `None` for "no location".
    pub location_id: Option<LocalId>,
    /// Display name.
    pub name: String,
    /// Weight of one unit.
    pub weight: Weight,
    /// Whether the item is a purse holding money.
    pub is_purse: bool,
    /// Money in the purse, in kreuzer.
    pub kreuzer: i64,
    /// Whether the item is a countable stack.
    pub is_countable: bool,
    /// Number of units in the stack.
    pub quantity: i32,
    /// Whether this item stands for its location's own tare weight.
    pub is_self_item: bool,
    /// The location this self-item belongs to.
    pub self_item_for_location_id: Option<LocalId>,
    /// Display order within the location.
    pub sort_order: i32,
}

impl Item {
    /// A new, not yet persisted, plain item of one unit.
    pub fn new(character_id: LocalId, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            character_id,
            location_id: None,
            name: name.into(),
            weight: Weight::default(),
            is_purse: false,
            kreuzer: 0,
            is_countable: false,
            quantity: 1,
            is_self_item: false,
            self_item_for_location_id: None,
            sort_order: 0,
        }
    }

    /// The synthetic self-item of a location.
    pub fn self_item_for(location: &Location) -> Self {
        Self {
            location_id: Some(location.id),
            is_self_item: true,
            self_item_for_location_id: Some(location.id),
            sort_order: -1,
            ..Item::new(location.character_id, location.name.clone())
        }
    }

    /// Copy placed in a different location. All other fields, including the
    /// self-item flags, are carried over unchanged.
    pub fn with_location(self, location_id: Option<LocalId>) -> Self {
        Self {
            location_id,
            ..self
        }
    }

    /// Copy with a different weight.
    pub fn with_weight(self, weight: Weight) -> Self {
        Self { weight, ..self }
    }

    /// Copy with a different display name.
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Total weight of the stack.
    pub fn total_weight(&self) -> Weight {
        let units = if self.is_countable {
            self.quantity.max(0)
        } else {
            1
        };
        Weight::from_ounces(self.weight.total_ounces() * units)
    }

    /// Coins in the purse, `None` for non-purse items.
    pub fn purse(&self) -> Option<Currency> {
        self.is_purse.then(|| Currency::from_kreuzer(self.kreuzer))
    }
}
