//! The Derian calendar (Bosparans Fall reckoning).
//!
//! A year has twelve months of 30 days followed by the five Nameless Days,
//! 365 days in total. Years count from the fall of Bosparan ("BF"). The new
//! year begins on 1 Praios, which is also the summer solstice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Days in a regular month.
pub const DAYS_PER_MONTH: u32 = 30;
/// Days in a year including the Nameless Days.
pub const DAYS_PER_YEAR: i64 = 365;

/// Months of the Derian year, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DerianMonth {
    /// Praios.
    Praios,
    /// Rondra.
    Rondra,
    /// Efferd.
    Efferd,
    /// Travia.
    Travia,
    /// Boron.
    Boron,
    /// Hesinde.
    Hesinde,
    /// Firun.
    Firun,
    /// Tsa.
    Tsa,
    /// Phex.
    Phex,
    /// Peraine.
    Peraine,
    /// Ingerimm.
    Ingerimm,
    /// Rahja.
    Rahja,
    /// The five Nameless Days at the end of the year.
    NamelessDays,
}

impl DerianMonth {
    /// All months in calendar order.
    pub const ALL: [DerianMonth; 13] = [
        Self::Praios,
        Self::Rondra,
        Self::Efferd,
        Self::Travia,
        Self::Boron,
        Self::Hesinde,
        Self::Firun,
        Self::Tsa,
        Self::Phex,
        Self::Peraine,
        Self::Ingerimm,
        Self::Rahja,
        Self::NamelessDays,
    ];

    /// Zero-based position in the year.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Number of days in this month.
    pub fn days(self) -> u32 {
        match self {
            Self::NamelessDays => 5,
            _ => DAYS_PER_MONTH,
        }
    }

    /// German display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Praios => "Praios",
            Self::Rondra => "Rondra",
            Self::Efferd => "Efferd",
            Self::Travia => "Travia",
            Self::Boron => "Boron",
            Self::Hesinde => "Hesinde",
            Self::Firun => "Firun",
            Self::Tsa => "Tsa",
            Self::Phex => "Phex",
            Self::Peraine => "Peraine",
            Self::Ingerimm => "Ingerimm",
            Self::Rahja => "Rahja",
            Self::NamelessDays => "Namenlose Tage",
        }
    }

    /// Parse a month name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name().to_lowercase() == lower)
    }
}

/// A day in the Derian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerianDate {
    /// Day of the month, starting at 1.
    pub day: u32,
    /// Month.
    pub month: DerianMonth,
    /// Year BF.
    pub year: i32,
}

impl DerianDate {
    /// Build a date, rejecting days outside the month.
    pub fn new(day: u32, month: DerianMonth, year: i32) -> MechResult<Self> {
        if day == 0 || day > month.days() {
            return Err(MechError::InvalidDate(format!(
                "{day} {} {year} BF",
                month.name()
            )));
        }
        Ok(Self { day, month, year })
    }

    /// Days since 1 Praios 0 BF.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * DAYS_PER_YEAR
            + i64::from(self.month.index() * DAYS_PER_MONTH)
            + i64::from(self.day - 1)
    }

    /// Inverse of [`ordinal`](Self::ordinal).
    pub fn from_ordinal(ordinal: i64) -> Self {
        let year = ordinal.div_euclid(DAYS_PER_YEAR);
        let day_of_year = ordinal.rem_euclid(DAYS_PER_YEAR) as u32;
        let index = (day_of_year / DAYS_PER_MONTH).min(12);
        Self {
            day: day_of_year - index * DAYS_PER_MONTH + 1,
            month: DerianMonth::ALL[index as usize],
            year: year as i32,
        }
    }

    /// The date `days` days later (or earlier, if negative).
    pub fn add_days(&self, days: i64) -> Self {
        Self::from_ordinal(self.ordinal() + days)
    }

    /// Days from `self` to `other`; negative if `other` lies in the past.
    pub fn days_until(&self, other: &DerianDate) -> i64 {
        other.ordinal() - self.ordinal()
    }

    /// The next occurrence of `day month` strictly after this date.
    pub fn next_occurrence(&self, day: u32, month: DerianMonth) -> Self {
        let this_year = Self {
            day,
            month,
            year: self.year,
        };
        if this_year.ordinal() > self.ordinal() {
            this_year
        } else {
            Self {
                year: self.year + 1,
                ..this_year
            }
        }
    }
}

impl PartialOrd for DerianDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DerianDate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for DerianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} BF", self.day, self.month.name(), self.year)
    }
}

impl FromStr for DerianDate {
    type Err = MechError;

    /// Parse "15 Rondra 1040 BF". The trailing "BF" is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MechError::InvalidDate(s.to_string());
        let mut parts: Vec<&str> = s.split_whitespace().collect();
        if parts.last().is_some_and(|p| p.eq_ignore_ascii_case("BF")) {
            parts.pop();
        }
        if parts.len() < 3 {
            return Err(invalid());
        }
        let day: u32 = parts[0].parse().map_err(|_| invalid())?;
        let year: i32 = parts[parts.len() - 1].parse().map_err(|_| invalid())?;
        let month = DerianMonth::from_name(&parts[1..parts.len() - 1].join(" ")).ok_or_else(invalid)?;
        Self::new(day, month, year).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> DerianDate {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        let d = date("15 Rondra 1040 BF");
        assert_eq!(d.day, 15);
        assert_eq!(d.month, DerianMonth::Rondra);
        assert_eq!(d.year, 1040);
        assert_eq!(d.to_string(), "15 Rondra 1040 BF");
        assert_eq!(date("3 namenlose tage 1039").month, DerianMonth::NamelessDays);
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<DerianDate>().is_err());
        assert!("31 Praios 1040 BF".parse::<DerianDate>().is_err());
        assert!("6 Namenlose Tage 1040 BF".parse::<DerianDate>().is_err());
        assert!("1 Januar 1040 BF".parse::<DerianDate>().is_err());
    }

    #[test]
    fn add_days_crosses_months() {
        assert_eq!(date("25 Praios 1040 BF").add_days(10), date("5 Rondra 1040 BF"));
    }

    #[test]
    fn add_days_crosses_nameless_days_into_new_year() {
        assert_eq!(date("28 Rahja 1040 BF").add_days(3), date("1 Namenlose Tage 1040 BF"));
        assert_eq!(date("4 Namenlose Tage 1040 BF").add_days(2), date("1 Praios 1041 BF"));
    }

    #[test]
    fn ordinal_round_trips_every_day_of_a_year() {
        let start = date("1 Praios 1040 BF");
        for offset in 0..DAYS_PER_YEAR {
            let d = start.add_days(offset);
            assert_eq!(DerianDate::from_ordinal(d.ordinal()), d);
        }
        assert_eq!(start.add_days(DAYS_PER_YEAR), date("1 Praios 1041 BF"));
    }

    #[test]
    fn next_occurrence_is_strictly_after() {
        let solstice = date("1 Praios 1040 BF");
        assert_eq!(
            solstice.next_occurrence(1, DerianMonth::Praios),
            date("1 Praios 1041 BF")
        );
        assert_eq!(
            date("30 Praios 1039 BF").next_occurrence(1, DerianMonth::Praios),
            date("1 Praios 1040 BF")
        );
        assert_eq!(
            date("5 Namenlose Tage 1039 BF").next_occurrence(1, DerianMonth::Praios),
            solstice
        );
    }

    #[test]
    fn days_until_and_ordering() {
        let a = date("1 Efferd 1040 BF");
        let b = date("1 Travia 1040 BF");
        assert_eq!(a.days_until(&b), 30);
        assert!(a < b);
    }
}
