mod agent;
mod prediction;
mod profile;

pub use agent::{agents_for_role, role_of};
pub use prediction::{round_to, Prediction, REFERENCE_DPI};
pub use profile::{
    AimType, FieldError, MapName, PlayerProfile, Playstyle, Role, ValidationError,
    CATEGORICAL_COLUMNS, EDPI_RANGE, HOURS_RANGE, NUMERIC_COLUMNS, RATING_RANGE,
};
