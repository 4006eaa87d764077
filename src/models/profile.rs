use std::fmt::Display;
use std::ops::RangeInclusive;

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Accepted eDPI range
pub const EDPI_RANGE: RangeInclusive<i64> = 150..=500;
/// Accepted range for the 1-10 self ratings
pub const RATING_RANGE: RangeInclusive<i64> = 1..=10;
/// Accepted range for hours played
pub const HOURS_RANGE: RangeInclusive<i64> = 0..=10_000;

/// Column names of the categorical features, in encoding order
pub const CATEGORICAL_COLUMNS: [&str; 4] = ["playstyle", "preferred_role", "favorite_map", "aim_type"];
/// Column names of the numeric features, in encoding order
pub const NUMERIC_COLUMNS: [&str; 4] = ["edpi", "ability_usage", "aggressiveness", "hours_played"];

/// How the player approaches rounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Playstyle {
    Aggressive,
    Balanced,
    Passive,
}

impl Playstyle {
    pub const ALL: [Playstyle; 3] = [Playstyle::Aggressive, Playstyle::Balanced, Playstyle::Passive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Playstyle::Aggressive => "aggressive",
            Playstyle::Balanced => "balanced",
            Playstyle::Passive => "passive",
        }
    }
}

/// Agent role the player prefers to fill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Duelist,
    Initiator,
    Controller,
    Sentinel,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Duelist, Role::Initiator, Role::Controller, Role::Sentinel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Duelist => "duelist",
            Role::Initiator => "initiator",
            Role::Controller => "controller",
            Role::Sentinel => "sentinel",
        }
    }
}

/// Maps in the competitive pool. Serialized with their display capitalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MapName {
    Ascent,
    Bind,
    Haven,
    Split,
    Icebox,
    Breeze,
    Fracture,
    Pearl,
    Lotus,
    Sunset,
    Abyss,
}

impl MapName {
    pub const ALL: [MapName; 11] = [
        MapName::Ascent,
        MapName::Bind,
        MapName::Haven,
        MapName::Split,
        MapName::Icebox,
        MapName::Breeze,
        MapName::Fracture,
        MapName::Pearl,
        MapName::Lotus,
        MapName::Sunset,
        MapName::Abyss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapName::Ascent => "Ascent",
            MapName::Bind => "Bind",
            MapName::Haven => "Haven",
            MapName::Split => "Split",
            MapName::Icebox => "Icebox",
            MapName::Breeze => "Breeze",
            MapName::Fracture => "Fracture",
            MapName::Pearl => "Pearl",
            MapName::Lotus => "Lotus",
            MapName::Sunset => "Sunset",
            MapName::Abyss => "Abyss",
        }
    }
}

/// Aim style preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AimType {
    Precise,
    Spray,
    Burst,
    Hybrid,
}

impl AimType {
    pub const ALL: [AimType; 4] = [AimType::Precise, AimType::Spray, AimType::Burst, AimType::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            AimType::Precise => "precise",
            AimType::Spray => "spray",
            AimType::Burst => "burst",
            AimType::Hybrid => "hybrid",
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(Playstyle, Role, MapName, AimType);

/// Self-reported player profile submitted for a recommendation
///
/// Numeric fields are kept signed so that out-of-range input survives
/// deserialization and is reported by [`PlayerProfile::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerProfile {
    pub playstyle: Playstyle,
    pub preferred_role: Role,
    pub favorite_map: MapName,
    pub aim_type: AimType,
    /// Effective DPI (DPI x in-game sensitivity)
    #[serde(deserialize_with = "whole_number")]
    pub edpi: i64,
    /// Ability usage frequency (1 = low, 10 = high)
    #[serde(deserialize_with = "whole_number")]
    pub ability_usage: i64,
    /// Aggressiveness level (1 = passive, 10 = aggressive)
    #[serde(deserialize_with = "whole_number")]
    pub aggressiveness: i64,
    #[serde(deserialize_with = "whole_number")]
    pub hours_played: i64,
}

/// A single out-of-range field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field that failed range validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationError(pub Vec<FieldError>);

/// Integer field that also takes floats without a fractional part (`320.0`)
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(value) => Ok(value),
        Number::Float(value)
            if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        Number::Float(value) => Err(de::Error::custom(format!(
            "expected an integer, got {}",
            value
        ))),
    }
}

fn check_range(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: i64,
    range: &RangeInclusive<i64>,
) {
    if !range.contains(&value) {
        errors.push(FieldError {
            field,
            message: format!(
                "value {} is outside the accepted range {}..={}",
                value,
                range.start(),
                range.end()
            ),
        });
    }
}

impl PlayerProfile {
    /// Checks numeric fields against their accepted ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        check_range(&mut errors, "edpi", self.edpi, &EDPI_RANGE);
        check_range(&mut errors, "ability_usage", self.ability_usage, &RATING_RANGE);
        check_range(&mut errors, "aggressiveness", self.aggressiveness, &RATING_RANGE);
        check_range(&mut errors, "hours_played", self.hours_played, &HOURS_RANGE);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(errors))
        }
    }

    /// Categorical features in [`CATEGORICAL_COLUMNS`] order
    pub fn categorical_values(&self) -> [&'static str; 4] {
        [
            self.playstyle.as_str(),
            self.preferred_role.as_str(),
            self.favorite_map.as_str(),
            self.aim_type.as_str(),
        ]
    }

    /// Numeric features in [`NUMERIC_COLUMNS`] order
    pub fn numeric_values(&self) -> [f64; 4] {
        [
            self.edpi as f64,
            self.ability_usage as f64,
            self.aggressiveness as f64,
            self.hours_played as f64,
        ]
    }
}
