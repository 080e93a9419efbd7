#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Road accident taxonomy types shared across the pipeline.
//!
//! The raw yearly accident files encode outcomes and conditions as small
//! integer codes. This crate names the codes that the pipeline reasons
//! about directly (injury severity, light period) and the raw column names
//! that act as join keys and targets.

use strum_macros::Display;

/// Raw column holding the accident identifier shared by all three sources.
pub const ACCIDENT_ID_COLUMN: &str = "Num_Acc";

/// Raw column holding a user's injury severity code.
pub const RAW_SEVERITY_COLUMN: &str = "grav";

/// Cleaned column holding the prediction target.
pub const TARGET_COLUMN: &str = "injury_severity";

/// Injury outcome of one person involved in an accident.
///
/// The discriminants are the raw source codes. Note that the code order is
/// not the clinical order: `Killed` is code 2 while `LightInjury` is code 4.
/// The per-accident reduction keeps the maximum *code*, not the most severe
/// outcome. [`Display`](std::fmt::Display) gives the cleaned target label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum InjurySeverity {
    /// Code 1: uninjured
    Unharmed = 1,
    /// Code 2: killed within 30 days
    Killed = 2,
    /// Code 3: hospitalized for more than 24 hours
    Hospitalized = 3,
    /// Code 4: light injury
    #[strum(serialize = "Light injury")]
    LightInjury = 4,
}

impl InjurySeverity {
    /// Returns the raw source code of this severity.
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Unharmed,
            Self::Killed,
            Self::Hospitalized,
            Self::LightInjury,
        ]
    }
}

/// Light bucket an accident happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "PascalCase")]
pub enum LightPeriod {
    /// Full daylight
    Day,
    /// Dawn or dusk
    Twilight,
    /// Night, lit or unlit
    Night,
}

impl LightPeriod {
    /// Classifies an hour of the day (0-23) into a light period using fixed
    /// bands: day is 07-18h, twilight is 05-06h and 19-20h, night is the
    /// rest.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            7..=18 => Self::Day,
            5..=6 | 19..=20 => Self::Twilight,
            _ => Self::Night,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_codes_and_labels() {
        let pairs: Vec<(i64, String)> = InjurySeverity::all()
            .iter()
            .map(|s| (s.code(), s.to_string()))
            .collect();
        assert_eq!(
            pairs,
            [
                (1, "Unharmed".to_owned()),
                (2, "Killed".to_owned()),
                (3, "Hospitalized".to_owned()),
                (4, "Light injury".to_owned()),
            ]
        );
    }

    #[test]
    fn light_period_bands() {
        assert_eq!(LightPeriod::from_hour(8), LightPeriod::Day);
        assert_eq!(LightPeriod::from_hour(18), LightPeriod::Day);
        assert_eq!(LightPeriod::from_hour(5), LightPeriod::Twilight);
        assert_eq!(LightPeriod::from_hour(20), LightPeriod::Twilight);
        assert_eq!(LightPeriod::from_hour(22), LightPeriod::Night);
        assert_eq!(LightPeriod::from_hour(0), LightPeriod::Night);
        assert_eq!(LightPeriod::from_hour(4), LightPeriod::Night);
    }

    #[test]
    fn light_period_display() {
        assert_eq!(LightPeriod::Twilight.to_string(), "Twilight");
    }
}
