use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract violations in a chain description.
///
/// These are raised when a [`KinematicChain`](crate::KinematicChain) is built
/// or deserialized, never while solving. A chain that fails here cannot be
/// used at all.
#[derive(Error, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("a kinematic chain needs exactly 6 joints, got {0}")]
    JointCount(usize),
    #[error("axis {axis} has a zero-length or non-finite rotation axis")]
    ZeroAxis { axis: usize },
    #[error("axis {axis} has a non-finite attachment frame")]
    NonFiniteFrame { axis: usize },
    #[error("axis {axis} has non-finite limits")]
    NonFiniteLimits { axis: usize },
    #[error("axis {axis} has inverted limits: min {min} > max {max}")]
    InvertedLimits { axis: usize, min: f64, max: f64 },
    #[error("{frame} transform is not finite")]
    NonFiniteTransform { frame: String },
    #[error("chain geometry is not solvable in closed form: {reason}")]
    UnsupportedGeometry { reason: String },
}

/// Raw pose input that cannot be turned into a rigid transform.
#[derive(Error, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("quaternion has zero norm")]
    DegenerateQuaternion,
    #[error("rotation axis has zero length")]
    ZeroAxis,
    #[error("pose contains non-finite values")]
    NonFinite,
}

/// Rejected solver tolerances.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite and greater than 0, got {value}")]
    NonPositive { field: String, value: f64 },
}
