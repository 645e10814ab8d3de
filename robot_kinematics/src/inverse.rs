//! Closed-form inverse kinematics for arms with a spherical wrist.
//!
//! The solve runs in three stages:
//!
//! 1. Axis 1 from the wrist center seen from above: two branches.
//! 2. Axes 2 and 3 from the shoulder-elbow-wrist triangle: two elbow branches
//!    per axis-1 branch.
//! 3. Axes 4 to 6 from the rotation left after the arm: two wrist branches per
//!    arm branch.
//!
//! Up to eight candidates come out. Each is wrapped into the axis limits where
//! possible, merged with near-duplicates, checked against the target with FK
//! and sorted by [`configuration::compare`].

use std::f64::consts::PI;

use nalgebra::{Point3, UnitQuaternion, Vector3};
use tracing::{debug, trace};

use crate::chain::{ArmGeometry, KinematicChain};
use crate::config::SolverConfig;
use crate::configuration::{self, ConfigurationSignature};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::ConfigError;
use crate::forward;
use crate::geometry::{normalize_degrees, JointVector, Pose, AXIS_COUNT};
use crate::solution::{Solution, SolutionSet};
use crate::subproblem::{project, rotation_angle, two_axis_pivots};

const BRANCHES: usize = 8;

/// Below this a length is treated as exactly zero, relative to the arm size.
const DEGENERATE_LENGTH: f64 = 1e-9;

/// Below this a unit-vector component is treated as exactly zero.
const DEGENERATE_DIRECTION: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    angles: [f64; AXIS_COUNT],
    singular: bool,
}

#[derive(Debug, Clone, Copy)]
struct WristBranch {
    angles: [f64; 3],
    singular: bool,
}

/// Solves with [`SolverConfig::default`].
pub fn solve(chain: &KinematicChain, target: &Pose) -> SolutionSet {
    InverseKinematics::default().solve(chain, target)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InverseKinematics {
    config: SolverConfig,
}

impl InverseKinematics {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// All joint vectors that put the TCP of `chain` at `target`.
    ///
    /// Never fails: unreachable targets give an empty set and the reason is in
    /// [`SolutionSet::diagnostics`].
    pub fn solve(&self, chain: &KinematicChain, target: &Pose) -> SolutionSet {
        let mut diagnostics = Diagnostics::new();
        if !target.is_finite() {
            diagnostics.push(Diagnostic::unreachable("target pose is not finite"));
            return SolutionSet::new(Vec::new(), diagnostics.into_vec());
        }

        let geometry = chain.geometry();
        let flange = chain.base().inverse() * *target * chain.tool().inverse();
        let motion = flange.to_isometry() * geometry.home_flange.inverse();
        let wrist = motion
            .transform_point(&Point3::from(geometry.wrist_center))
            .coords;

        let mut candidates: [Option<Candidate>; BRANCHES] = [None; BRANCHES];
        let shoulder = self.shoulder(geometry, &wrist, &mut diagnostics);
        if let Some((shoulders, shoulder_singular)) = shoulder {
            for (i, &a1) in shoulders.iter().enumerate() {
                let Some(arms) = self.arm(geometry, &wrist, a1, &mut diagnostics) else {
                    continue;
                };
                for (j, &[a2, a3]) in arms.iter().enumerate() {
                    let Some(wrists) =
                        self.wrist(geometry, &motion.rotation, [a1, a2, a3], &mut diagnostics)
                    else {
                        continue;
                    };
                    for (k, branch) in wrists.iter().enumerate() {
                        let [a4, a5, a6] = branch.angles;
                        candidates[i * 4 + j * 2 + k] = Some(Candidate {
                            angles: [a1, a2, a3, a4, a5, a6],
                            singular: shoulder_singular || branch.singular,
                        });
                    }
                }
            }
        }

        let solutions = self.finish(chain, target, &candidates, &mut diagnostics);
        let diagnostics = diagnostics.into_vec();
        debug!(
            "IK found {} solution(s) with {} diagnostic(s)",
            solutions.len(),
            diagnostics.len()
        );
        SolutionSet::new(solutions, diagnostics)
    }

    /// Axis 1 angles (radians) that bring the wrist center into the arm plane.
    fn shoulder(
        &self,
        geometry: &ArmGeometry,
        wrist: &Vector3<f64>,
        diagnostics: &mut Diagnostics,
    ) -> Option<([f64; 2], bool)> {
        let axis = geometry.axes[0].into_inner();
        let normal = geometry.axes[1].into_inner();
        let offset = geometry.lateral_offset;
        let v = wrist - geometry.points[0];
        let a = v.dot(&normal);
        let b = v.dot(&axis.cross(&normal));
        let radius = a.hypot(b);

        if radius <= DEGENERATE_LENGTH * geometry.scale {
            if offset.abs() > DEGENERATE_LENGTH * geometry.scale {
                diagnostics.push(Diagnostic::unreachable(
                    "wrist center lies on axis 1 but the arm has a lateral offset",
                ));
                return None;
            }
            diagnostics.push(Diagnostic::ShoulderSingularity);
            return Some(([0.0, PI], true));
        }

        let ratio = offset / radius;
        if ratio.abs() > 1.0 + self.config.reach_tolerance {
            diagnostics.push(Diagnostic::unreachable(format!(
                "wrist center is {:.3} from axis 1, closer than the lateral offset {:.3}",
                radius,
                offset.abs()
            )));
            return None;
        }

        let singular = radius < self.config.singularity_tolerance.to_radians() * geometry.scale;
        if singular {
            diagnostics.push(Diagnostic::ShoulderSingularity);
        }
        let heading = b.atan2(a);
        let spread = ratio.clamp(-1.0, 1.0).acos();
        Some(([heading + spread, heading - spread], singular))
    }

    /// Axis 2 and 3 angles (radians) for one axis-1 angle, elbow up first.
    fn arm(
        &self,
        geometry: &ArmGeometry,
        wrist: &Vector3<f64>,
        shoulder: f64,
        diagnostics: &mut Diagnostics,
    ) -> Option<[[f64; 2]; 2]> {
        let normal = geometry.axes[1].into_inner();
        let local = geometry
            .screw(0, -shoulder)
            .transform_point(&Point3::from(*wrist))
            .coords;
        let reach = project(&(local - geometry.points[1]), &normal);
        let distance = reach.norm();
        let (upper, fore) = (geometry.upper_arm, geometry.forearm);

        let cosine = (distance * distance - upper * upper - fore * fore) / (2.0 * upper * fore);
        if cosine.abs() > 1.0 + self.config.reach_tolerance {
            diagnostics.push(Diagnostic::unreachable(format!(
                "wrist center is {:.3} from axis 2, outside the arm's range [{:.3}, {:.3}]",
                distance,
                (upper - fore).abs(),
                upper + fore
            )));
            return None;
        }
        let bend = cosine.clamp(-1.0, 1.0).acos();

        let mut result = [[0.0; 2]; 2];
        for (slot, sign) in result.iter_mut().zip([1.0, -1.0]) {
            let elbow = geometry.elbow_sign * (sign * bend - geometry.elbow_offset);
            let moved = geometry
                .screw(2, elbow)
                .transform_point(&Point3::from(geometry.wrist_center))
                .coords;
            let lift = rotation_angle(&normal, &(moved - geometry.points[1]), &reach);
            *slot = [lift, elbow];
        }
        Some(result)
    }

    /// Axis 4 to 6 angles (radians) for one arm branch, both wrist flips.
    fn wrist(
        &self,
        geometry: &ArmGeometry,
        orientation: &UnitQuaternion<f64>,
        arm: [f64; 3],
        diagnostics: &mut Diagnostics,
    ) -> Option<[WristBranch; 2]> {
        let arm_rotation = geometry.rotation(0, arm[0])
            * geometry.rotation(1, arm[1])
            * geometry.rotation(2, arm[2]);
        let residual = arm_rotation.inverse() * orientation;
        let [w4, w5, w6] = [3, 4, 5].map(|index| geometry.axes[index].into_inner());
        let pointing = residual * w6;

        let Some(pivots) = two_axis_pivots(&w4, &w5, &w6, &pointing) else {
            diagnostics.push(Diagnostic::unreachable(
                "the wrist axes cannot produce the requested orientation",
            ));
            return None;
        };

        // Axis 6 lined up with axis 4: only the sum of the two is defined.
        let off_axis = project(&pointing, &w4).norm();
        let singular = off_axis < self.config.singularity_tolerance.to_radians().sin();
        let aligned = off_axis <= DEGENERATE_DIRECTION;

        let probe = project(
            &if w6.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() },
            &w6,
        );
        let mut result = [WristBranch {
            angles: [0.0; 3],
            singular,
        }; 2];
        for (slot, pivot) in result.iter_mut().zip(pivots) {
            let (roll, tilt) = if aligned {
                (0.0, rotation_angle(&w5, &w6, &pointing))
            } else {
                (
                    rotation_angle(&w4, &pivot, &pointing),
                    rotation_angle(&w5, &w6, &pivot),
                )
            };
            if singular {
                diagnostics.push(Diagnostic::WristSingularity {
                    axis5: normalize_degrees(tilt.to_degrees()),
                    tie_break: aligned,
                });
            }
            let remainder =
                (geometry.rotation(3, roll) * geometry.rotation(4, tilt)).inverse() * residual;
            let twist = rotation_angle(&w6, &probe, &(remainder * probe));
            *slot = WristBranch {
                angles: [roll, tilt, twist],
                singular,
            };
        }
        Some(result)
    }

    /// Wraps, merges, verifies and orders the raw branches.
    fn finish(
        &self,
        chain: &KinematicChain,
        target: &Pose,
        candidates: &[Option<Candidate>; BRANCHES],
        diagnostics: &mut Diagnostics,
    ) -> Vec<Solution> {
        let limits = chain.limits();
        let mut kept: Vec<(JointVector, bool)> = Vec::with_capacity(BRANCHES);

        for candidate in candidates.iter().flatten() {
            if candidate.angles.iter().any(|a| !a.is_finite()) {
                diagnostics.push(Diagnostic::RoundTripMismatch {
                    position_error: f64::INFINITY,
                    orientation_error: f64::INFINITY,
                });
                continue;
            }
            let mut joints = JointVector::from_radians(candidate.angles);
            for (axis, range) in limits.iter().enumerate() {
                let angle = normalize_degrees(joints[axis]);
                joints[axis] = [angle, angle - 360.0, angle + 360.0]
                    .into_iter()
                    .find(|a| range.contains(*a))
                    .unwrap_or(angle);
            }

            if let Some(existing) = kept
                .iter_mut()
                .find(|(other, _)| self.is_duplicate(other, &joints))
            {
                existing.1 |= candidate.singular;
                continue;
            }

            let reached = forward::evaluate(chain, &joints).tcp;
            let (position_error, orientation_error) = reached.distance(target);
            // Written so that a NaN error fails the check.
            if !(position_error <= self.config.position_tolerance
                && orientation_error <= self.config.orientation_tolerance)
            {
                diagnostics.push(Diagnostic::RoundTripMismatch {
                    position_error,
                    orientation_error,
                });
                continue;
            }
            trace!("IK candidate {}", joints);
            kept.push((joints, candidate.singular));
        }

        let geometry = chain.geometry();
        let mut solutions: Vec<Solution> = kept
            .into_iter()
            .map(|(joints, singular)| {
                let in_limits = chain.in_limits(&joints);
                for (axis, ok) in in_limits.iter().enumerate() {
                    if !ok {
                        diagnostics.push(Diagnostic::OutOfLimits {
                            axis: axis + 1,
                            angle: joints[axis],
                            min: limits[axis].min,
                            max: limits[axis].max,
                        });
                    }
                }
                Solution {
                    joints,
                    valid: in_limits.iter().all(|&ok| ok),
                    in_limits,
                    signature: ConfigurationSignature::of(&joints),
                    configuration: geometry.axis_configuration(&joints),
                    singular,
                }
            })
            .collect();
        solutions.sort_by(|a, b| configuration::compare(&a.joints, &b.joints));
        solutions
    }

    fn is_duplicate(&self, a: &JointVector, b: &JointVector) -> bool {
        let distance = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| normalize_degrees(x - y).powi(2))
            .sum::<f64>()
            .sqrt();
        distance < self.config.duplicate_tolerance
    }
}
