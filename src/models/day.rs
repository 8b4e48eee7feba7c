// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training day of the week.
//!
//! Stored as the integer code 1 (Monday) through 7 (Sunday). Older
//! spreadsheets hold day names instead; [`Day::parse`] accepts both forms,
//! and nothing past the storage/import boundary sees anything but `Day`.

use crate::models::fold_label;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DayInput")]
pub enum Day {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown day: {0}")]
pub struct UnknownDay(pub String);

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Storage code, 1 = Monday.
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Name used on the original sheets.
    pub fn spanish_name(self) -> &'static str {
        match self {
            Day::Monday => "Lunes",
            Day::Tuesday => "Martes",
            Day::Wednesday => "Miércoles",
            Day::Thursday => "Jueves",
            Day::Friday => "Viernes",
            Day::Saturday => "Sábado",
            Day::Sunday => "Domingo",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    /// Accepts a code ("1".."7") or a Spanish or English day name.
    pub fn parse(input: &str) -> Option<Day> {
        let folded = fold_label(input);
        if let Ok(code) = folded.parse::<i64>() {
            return Day::from_code(code);
        }
        Day::ALL.into_iter().find(|d| {
            folded == fold_label(d.spanish_name()) || folded == fold_label(d.english_name())
        })
    }
}

impl FromStr for Day {
    type Err = UnknownDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::parse(s).ok_or_else(|| UnknownDay(s.to_string()))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_name())
    }
}

/// Wire form accepted for a day: its code or its name.
#[derive(Deserialize)]
#[serde(untagged)]
enum DayInput {
    Code(i64),
    Name(String),
}

impl TryFrom<DayInput> for Day {
    type Error = UnknownDay;

    fn try_from(input: DayInput) -> Result<Self, Self::Error> {
        match input {
            DayInput::Code(code) => Day::from_code(code).ok_or_else(|| UnknownDay(code.to_string())),
            DayInput::Name(name) => name.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_week_order() {
        let codes: Vec<i64> = Day::ALL.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(Day::Monday < Day::Wednesday);
        assert_eq!(Day::from_code(0), None);
        assert_eq!(Day::from_code(8), None);
    }

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!(Day::parse("Lunes"), Some(Day::Monday));
        assert_eq!(Day::parse("miercoles"), Some(Day::Wednesday));
        assert_eq!(Day::parse("MIÉRCOLES"), Some(Day::Wednesday));
        assert_eq!(Day::parse("Sabado"), Some(Day::Saturday));
        assert_eq!(Day::parse(" Friday "), Some(Day::Friday));
        assert_eq!(Day::parse("7"), Some(Day::Sunday));
        assert_eq!(Day::parse("9"), None);
        assert_eq!(Day::parse("Funday"), None);
    }

    #[test]
    fn test_json_accepts_name_or_code() {
        let from_code: Day = serde_json::from_str("3").unwrap();
        let from_name: Day = serde_json::from_str("\"Jueves\"").unwrap();
        assert_eq!(from_code, Day::Wednesday);
        assert_eq!(from_name, Day::Thursday);
        assert!(serde_json::from_str::<Day>("12").is_err());

        assert_eq!(serde_json::to_string(&Day::Monday).unwrap(), "\"Monday\"");
    }
}
