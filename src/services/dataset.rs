use std::fs::File;
use std::io;
use std::ops::RangeInclusive;
use std::path::Path;

use rand::distributions::WeightedError;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    agents_for_role, round_to, AimType, MapName, PlayerProfile, Playstyle, Role, EDPI_RANGE,
    HOURS_RANGE, RATING_RANGE, REFERENCE_DPI,
};

/// Rows produced when no count is given
pub const DEFAULT_ROWS: usize = 500;

/// Mouse DPI values a synthetic player may use
const DPI_OPTIONS: [u32; 2] = [800, 1600];

/// Probability that an extreme aggressiveness roll overrides the role
const ROLE_NUDGE_PROBABILITY: f64 = 0.3;

/// Probability that an ability-usage special case picks from its narrow pool
const SPECIAL_POOL_PROBABILITY: f64 = 0.7;

/// Error types for dataset I/O
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Dataset is empty")]
    Empty,

    #[error("Cannot sample {0}: nothing to choose from")]
    EmptyPool(&'static str),

    #[error("Invalid sampling weights: {0}")]
    Weights(#[from] WeightedError),
}

/// One labeled synthetic player, as stored in the dataset CSV
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub playstyle: Playstyle,
    pub preferred_role: Role,
    pub favorite_map: MapName,
    pub aim_type: AimType,
    pub edpi: i64,
    pub ability_usage: i64,
    pub aggressiveness: i64,
    pub hours_played: i64,
    pub dpi: u32,
    /// Sensitivity at the player's own DPI
    pub sens: f64,
    pub sens_800: f64,
    pub sens_1600: f64,
    pub recommended_agent: String,
}

impl PlayerRecord {
    /// The model inputs of this record
    pub fn profile(&self) -> PlayerProfile {
        PlayerProfile {
            playstyle: self.playstyle,
            preferred_role: self.preferred_role,
            favorite_map: self.favorite_map,
            aim_type: self.aim_type,
            edpi: self.edpi,
            ability_usage: self.ability_usage,
            aggressiveness: self.aggressiveness,
            hours_played: self.hours_played,
        }
    }
}

fn aggressiveness_band(playstyle: Playstyle) -> RangeInclusive<i64> {
    match playstyle {
        Playstyle::Aggressive => 6..=10,
        Playstyle::Balanced => 3..=8,
        Playstyle::Passive => 1..=5,
    }
}

fn role_weights(playstyle: Playstyle) -> [(Role, u32); 4] {
    match playstyle {
        Playstyle::Aggressive => [
            (Role::Duelist, 50),
            (Role::Initiator, 25),
            (Role::Controller, 10),
            (Role::Sentinel, 15),
        ],
        Playstyle::Balanced => [
            (Role::Duelist, 25),
            (Role::Initiator, 25),
            (Role::Controller, 25),
            (Role::Sentinel, 25),
        ],
        Playstyle::Passive => [
            (Role::Duelist, 10),
            (Role::Initiator, 20),
            (Role::Controller, 35),
            (Role::Sentinel, 35),
        ],
    }
}

/// Narrower agent pool for a few role and ability-usage combinations
fn special_pool(role: Role, ability_usage: i64) -> Option<&'static [&'static str]> {
    match role {
        Role::Duelist if ability_usage >= 8 => Some(&["Raze", "Phoenix", "Yoru", "Waylay"]),
        Role::Duelist if ability_usage <= 3 => Some(&["Jett", "Reyna", "Neon", "Iso"]),
        Role::Controller if ability_usage >= 8 => Some(&["Viper", "Astra", "Harbor"]),
        Role::Sentinel if ability_usage <= 3 => Some(&["Chamber", "Vyse", "Veto"]),
        _ => None,
    }
}

/// Base eDPI range of a role
fn role_edpi_range(role: Role) -> (i64, i64) {
    match role {
        Role::Duelist => (300, 380),
        Role::Initiator => (280, 360),
        Role::Controller => (250, 330),
        Role::Sentinel => (220, 300),
    }
}

/// (low, high) shift applied to the role range
fn playstyle_edpi_shift(playstyle: Playstyle) -> (i64, i64) {
    match playstyle {
        Playstyle::Aggressive => (10, 40),
        Playstyle::Balanced => (0, 0),
        Playstyle::Passive => (-30, -10),
    }
}

/// (low, high) adjustment; positive low and negative high narrow the range
fn aim_edpi_adjustment(aim_type: AimType) -> (i64, i64) {
    match aim_type {
        AimType::Precise => (10, -10),
        AimType::Spray => (-20, 20),
        AimType::Burst => (0, 0),
        AimType::Hybrid => (-10, 10),
    }
}

/// eDPI range for a role, playstyle and aim type, clamped to the accepted range
pub fn edpi_range(role: Role, playstyle: Playstyle, aim_type: AimType) -> RangeInclusive<i64> {
    let (base_low, base_high) = role_edpi_range(role);
    let (shift_low, shift_high) = playstyle_edpi_shift(playstyle);
    let (aim_low, aim_high) = aim_edpi_adjustment(aim_type);

    let low = (base_low + shift_low + aim_low).clamp(*EDPI_RANGE.start(), *EDPI_RANGE.end());
    let high = (base_high + shift_high + aim_high).clamp(low, *EDPI_RANGE.end());
    low..=high
}

fn choose<T: Copy, R: Rng>(rng: &mut R, items: &[T], what: &'static str) -> Result<T, DatasetError> {
    items
        .choose(rng)
        .copied()
        .ok_or(DatasetError::EmptyPool(what))
}

/// Samples labeled synthetic player profiles
pub struct DatasetGenerator<R: Rng> {
    rng: R,
}

impl DatasetGenerator<ChaCha8Rng> {
    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> DatasetGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn choose_role(&mut self, playstyle: Playstyle, aggressiveness: i64) -> Result<Role, DatasetError> {
        let (role, _) = *role_weights(playstyle).choose_weighted(&mut self.rng, |(_, weight)| *weight)?;
        let role = if aggressiveness >= 9 && self.rng.gen_bool(ROLE_NUDGE_PROBABILITY) {
            Role::Duelist
        } else if aggressiveness <= 2 && self.rng.gen_bool(ROLE_NUDGE_PROBABILITY) {
            Role::Sentinel
        } else {
            role
        };
        Ok(role)
    }

    fn choose_agent(&mut self, role: Role, ability_usage: i64) -> Result<&'static str, DatasetError> {
        match special_pool(role, ability_usage) {
            Some(pool) if self.rng.gen_bool(SPECIAL_POOL_PROBABILITY) => {
                choose(&mut self.rng, pool, "agent")
            }
            _ => choose(&mut self.rng, agents_for_role(role), "agent"),
        }
    }

    fn choose_hours(&mut self) -> i64 {
        // Most players sit in the first couple thousand hours
        if self.rng.gen_bool(0.8) {
            self.rng.gen_range(*HOURS_RANGE.start()..=2_000)
        } else {
            self.rng.gen_range(2_001..=*HOURS_RANGE.end())
        }
    }

    /// Samples a single labeled player
    pub fn record(&mut self) -> Result<PlayerRecord, DatasetError> {
        let playstyle = choose(&mut self.rng, &Playstyle::ALL, "playstyle")?;
        let aggressiveness = self.rng.gen_range(aggressiveness_band(playstyle));
        let preferred_role = self.choose_role(playstyle, aggressiveness)?;
        let favorite_map = choose(&mut self.rng, &MapName::ALL, "map")?;
        let aim_type = choose(&mut self.rng, &AimType::ALL, "aim type")?;
        let ability_usage = self.rng.gen_range(RATING_RANGE);
        let hours_played = self.choose_hours();
        let recommended_agent = self.choose_agent(preferred_role, ability_usage)?.to_string();

        let edpi = self
            .rng
            .gen_range(edpi_range(preferred_role, playstyle, aim_type));
        let dpi = choose(&mut self.rng, &DPI_OPTIONS, "DPI")?;

        Ok(PlayerRecord {
            playstyle,
            preferred_role,
            favorite_map,
            aim_type,
            edpi,
            ability_usage,
            aggressiveness,
            hours_played,
            dpi,
            sens: round_to(edpi as f64 / dpi as f64, 3),
            sens_800: round_to(edpi as f64 / REFERENCE_DPI, 3),
            sens_1600: round_to(edpi as f64 / (2.0 * REFERENCE_DPI), 3),
            recommended_agent,
        })
    }

    pub fn generate(&mut self, rows: usize) -> Result<Vec<PlayerRecord>, DatasetError> {
        (0..rows).map(|_| self.record()).collect()
    }
}

pub fn write_csv<W: io::Write>(writer: W, records: &[PlayerRecord]) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, records: &[PlayerRecord]) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(File::create(path)?, records)
}

pub fn read_csv<Rd: io::Read>(reader: Rd) -> Result<Vec<PlayerRecord>, DatasetError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let records = csv_reader
        .deserialize()
        .collect::<Result<Vec<PlayerRecord>, _>>()?;

    if records.is_empty() {
        return Err(DatasetError::Empty);
    }
    Ok(records)
}

pub fn read_csv_file(path: &Path) -> Result<Vec<PlayerRecord>, DatasetError> {
    read_csv(File::open(path)?)
}
