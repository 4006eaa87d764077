use serde::{Deserialize, Serialize};

/// DPI the regressor's sensitivity target is expressed at
pub const REFERENCE_DPI: f64 = 800.0;

/// Agent and sensitivity recommendation returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub recommended_agent: String,
    /// Recommended in-game sensitivity at 800 DPI
    pub recommended_sens_800: f64,
    /// Recommended in-game sensitivity at 1600 DPI
    pub recommended_sens_1600: f64,
    /// Effective DPI implied by the recommendation (same for both DPI settings)
    pub edpi: i64,
}

/// Rounds half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl Prediction {
    /// Builds a prediction from raw model output.
    ///
    /// The 800 DPI sensitivity is rounded to three decimals first; the 1600 DPI
    /// value and the eDPI are both derived from that rounded value.
    pub fn from_raw(agent: impl Into<String>, raw_sens_800: f64) -> Self {
        let sens_800 = round_to(raw_sens_800, 3);
        let sens_1600 = round_to(sens_800 / 2.0, 3);
        let edpi = (sens_800 * REFERENCE_DPI).round() as i64;

        Self {
            recommended_agent: agent.into(),
            recommended_sens_800: sens_800,
            recommended_sens_1600: sens_1600,
            edpi,
        }
    }
}
