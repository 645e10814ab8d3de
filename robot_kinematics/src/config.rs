use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Numeric tolerances used by the inverse solver.
///
/// ```rust
/// use robot_kinematics::SolverConfig;
///
/// let config = SolverConfig {
///     duplicate_tolerance: 1e-3,
///     ..SolverConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct SolverConfig {
    /// Candidates closer than this in joint space (degrees) are merged.
    pub duplicate_tolerance: f64,
    /// Angular distance (degrees) below which the shoulder or wrist counts as singular.
    pub singularity_tolerance: f64,
    /// Slack allowed on cosine arguments before a target is declared unreachable.
    pub reach_tolerance: f64,
    /// Largest TCP position error accepted when re-checking a candidate with FK.
    pub position_tolerance: f64,
    /// Largest TCP orientation error (degrees) accepted in the same check.
    pub orientation_tolerance: f64,
}

impl SolverConfig {
    pub fn new(
        duplicate_tolerance: f64,
        singularity_tolerance: f64,
        reach_tolerance: f64,
        position_tolerance: f64,
        orientation_tolerance: f64,
    ) -> Self {
        Self {
            duplicate_tolerance,
            singularity_tolerance,
            reach_tolerance,
            position_tolerance,
            orientation_tolerance,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("DuplicateTolerance", self.duplicate_tolerance),
            ("SingularityTolerance", self.singularity_tolerance),
            ("ReachTolerance", self.reach_tolerance),
            ("PositionTolerance", self.position_tolerance),
            ("OrientationTolerance", self.orientation_tolerance),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            duplicate_tolerance: 1e-4,
            singularity_tolerance: 1e-3,
            reach_tolerance: 1e-9,
            position_tolerance: 1e-4,
            orientation_tolerance: 1e-3,
        }
    }
}
