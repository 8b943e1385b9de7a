use serde::{Deserialize, Serialize};
use sketch_solver::SolverConfig;

use crate::types::EngineError;

const MM_PER_INCH: f64 = 25.4;

/// Units lengths are shown and typed in. Internally everything is millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    #[default]
    Millimeters,
    Inches,
}

/// Engine configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenConfig {
    pub solver: SolverConfig,
    /// Groups with more unknowns than this are not handed to the solver.
    pub max_unknowns: usize,
    pub view_units: Units,
    /// Snapshots kept for undo; the oldest is dropped beyond this.
    pub max_undo: usize,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            max_unknowns: 1024,
            view_units: Units::Millimeters,
            max_undo: 100,
        }
    }
}

impl RegenConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Config {
            reason: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Config {
            reason: e.to_string(),
        })
    }

    /// Format a length in millimeters for display in the view units.
    pub fn format_length(&self, mm: f64) -> String {
        match self.view_units {
            Units::Millimeters => format!("{:.2}", mm),
            Units::Inches => format!("{:.3}", mm / MM_PER_INCH),
        }
    }

    /// Convert a length typed in view units to millimeters.
    pub fn length_from_user(&self, value: f64) -> f64 {
        match self.view_units {
            Units::Millimeters => value,
            Units::Inches => value * MM_PER_INCH,
        }
    }
}
