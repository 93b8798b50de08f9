//! Simulation settings
//!
//! Game geometry is fixed in [`crate::consts`]; what a host may tune at
//! startup (layout seed, solver effort) lives here and round-trips
//! through JSON.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SEED;
use crate::error::Result;
use crate::sim::SolverConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Seed for brick colors; a reset replays the same layout
    pub seed: u64,
    /// Solver iteration counts
    pub solver: SolverConfig,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            solver: SolverConfig::default(),
        }
    }
}

impl SimSettings {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.solver.sub_steps == 0 {
            log::warn!("sub_steps = 0 in settings, the world will run one sub-step");
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorldError;

    #[test]
    fn test_json_round_trip() {
        let mut settings = SimSettings::with_seed(7);
        settings.solver.velocity_iterations = 12;

        let json = settings.to_json().unwrap();
        assert_eq!(SimSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = SimSettings::from_json(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.solver, SolverConfig::default());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = SimSettings::from_json("{ seed: }").unwrap_err();
        assert!(matches!(err, WorldError::Settings(_)));
    }
}
