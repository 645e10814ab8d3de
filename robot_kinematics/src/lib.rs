//! Forward and closed-form inverse kinematics for six-axis industrial arms.
//!
//! The crate covers arms whose first axis is vertical-ish and perpendicular to
//! the second, whose second and third axes are parallel, and whose last three
//! axes meet in a spherical wrist. For such an arm every reachable TCP pose has
//! at most eight joint solutions, found without iteration.
//!
//! Angles are in degrees at the API; lengths use the chain's own unit.
//!
//! # Example
//!
//! ```rust
//! use robot_kinematics::{ArmDimensions, JointLimits, JointVector, KinematicChain};
//!
//! let dims = ArmDimensions { a1: 150.0, a2: 0.0, b: 0.0, c1: 486.5, c2: 700.0, c3: 600.0, c4: 65.0 };
//! let chain = KinematicChain::from_dimensions(dims, [JointLimits::new(-180.0, 180.0); 6]).unwrap();
//!
//! let joints = JointVector::new([10.0, 20.0, -30.0, 40.0, 50.0, 60.0]);
//! let pose = chain.evaluate(&joints).tcp;
//!
//! let solutions = chain.solve(&pose);
//! let closest = solutions.closest_to(&joints).unwrap();
//! assert!(closest.joints.distance(&joints) < 1e-6);
//! ```

pub mod chain;
pub mod config;
pub mod configuration;
pub mod diagnostics;
pub mod errors;
pub mod forward;
pub mod geometry;
pub mod inverse;
pub mod solution;
mod subproblem;

pub use chain::{ArmDimensions, AxisKind, ChainDescription, JointDescriptor, JointLimits, KinematicChain};
pub use config::SolverConfig;
pub use configuration::{AxisConfiguration, ConfigurationSignature};
pub use diagnostics::Diagnostic;
pub use errors::{ChainError, ConfigError, PoseError};
pub use forward::ForwardResult;
pub use geometry::{normalize_degrees, ExternalAxisVector, JointTarget, JointVector, Pose, AXIS_COUNT};
pub use inverse::InverseKinematics;
pub use solution::{Solution, SolutionSet};

/// TCP pose of `chain` at `joints`. Shorthand for [`forward::evaluate`].
pub fn evaluate(chain: &KinematicChain, joints: &JointVector) -> ForwardResult {
    forward::evaluate(chain, joints)
}

/// All joint solutions for `target` with default tolerances. Shorthand for [`inverse::solve`].
pub fn solve(chain: &KinematicChain, target: &Pose) -> SolutionSet {
    inverse::solve(chain, target)
}
