//! Kinematic chain model.
//!
//! A chain is six revolute joints, each placed by an attachment frame relative
//! to the previous link, plus a tool (flange to TCP) and a base (world to robot
//! base). Construction validates the description and derives the zero-pose
//! screw geometry that the closed-form solver needs.

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::configuration::AxisConfiguration;
use crate::errors::ChainError;
use crate::forward::{self, ForwardResult};
use crate::geometry::{JointVector, Pose, AXIS_COUNT};
use crate::inverse;
use crate::solution::SolutionSet;
use crate::subproblem::{project, rotation_angle};

const ANGULAR_TOLERANCE: f64 = 1e-6;
const LINEAR_TOLERANCE: f64 = 1e-6;

/// Joint type. Only revolute axes are modeled.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisKind {
    #[default]
    Rotational,
}

/// Travel range of one axis in degrees, inclusive on both ends.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct JointLimits {
    pub min: f64,
    pub max: f64,
}

impl JointLimits {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        Self::new(-180.0, 180.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct JointDescriptor {
    /// Placement of this joint relative to the previous link (or the base).
    pub frame: Pose,
    /// Rotation axis in the joint's own frame.
    pub axis: Vector3<f64>,
    #[serde(default)]
    pub kind: AxisKind,
    pub limits: JointLimits,
}

impl JointDescriptor {
    pub fn new(frame: Pose, axis: Vector3<f64>, limits: JointLimits) -> Self {
        Self {
            frame,
            axis,
            kind: AxisKind::Rotational,
            limits,
        }
    }

    pub fn revolute(frame: Pose, axis: Vector3<f64>, min: f64, max: f64) -> Self {
        Self::new(frame, axis, JointLimits::new(min, max))
    }
}

/// Link dimensions of an ortho-parallel arm with a spherical wrist.
///
/// At zero angles the upper arm stands vertical and the forearm points along
/// +X. Lengths share the chain's unit.
///
/// | field | meaning |
/// |-------|---------|
/// | `a1`  | shoulder offset from axis 1 along X |
/// | `a2`  | forearm offset above axis 3 |
/// | `b`   | lateral shoulder offset along Y |
/// | `c1`  | base height to axis 2 |
/// | `c2`  | upper arm length |
/// | `c3`  | forearm length to the wrist center |
/// | `c4`  | wrist center to flange |
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ArmDimensions {
    pub a1: f64,
    pub a2: f64,
    pub b: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub c4: f64,
}

/// Serialized form of a [`KinematicChain`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ChainDescription {
    pub joints: Vec<JointDescriptor>,
    #[serde(default)]
    pub tool: Pose,
    #[serde(default)]
    pub base: Pose,
}

/// A validated six-axis chain.
///
/// ```rust
/// use robot_kinematics::{ArmDimensions, JointLimits, JointVector, KinematicChain};
///
/// let dims = ArmDimensions { a1: 150.0, a2: 0.0, b: 0.0, c1: 486.5, c2: 700.0, c3: 600.0, c4: 65.0 };
/// let chain = KinematicChain::from_dimensions(dims, [JointLimits::default(); 6]).unwrap();
/// let fk = chain.evaluate(&JointVector::zeros());
/// assert!((fk.tcp.position.x - 815.0).abs() < 1e-9);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "ChainDescription", into = "ChainDescription")]
pub struct KinematicChain {
    joints: [JointDescriptor; AXIS_COUNT],
    axes: [Unit<Vector3<f64>>; AXIS_COUNT],
    tool: Pose,
    base: Pose,
    geometry: ArmGeometry,
}

impl KinematicChain {
    pub fn new(
        mut joints: [JointDescriptor; AXIS_COUNT],
        tool: Pose,
        base: Pose,
    ) -> Result<Self, ChainError> {
        let mut axes = [Vector3::z_axis(); AXIS_COUNT];
        for (index, joint) in joints.iter_mut().enumerate() {
            let axis = index + 1;
            if !joint.frame.is_finite() {
                return Err(ChainError::NonFiniteFrame { axis });
            }
            if joint.axis.iter().any(|v| !v.is_finite()) {
                return Err(ChainError::ZeroAxis { axis });
            }
            let unit = Unit::try_new(joint.axis, f64::EPSILON).ok_or(ChainError::ZeroAxis { axis })?;
            joint.axis = unit.into_inner();
            axes[index] = unit;

            let JointLimits { min, max } = joint.limits;
            if !min.is_finite() || !max.is_finite() {
                return Err(ChainError::NonFiniteLimits { axis });
            }
            if min > max {
                return Err(ChainError::InvertedLimits { axis, min, max });
            }
        }
        check_transform(&tool, "tool")?;
        check_transform(&base, "base")?;

        let geometry = ArmGeometry::derive(&joints, &axes)?;
        Ok(Self {
            joints,
            axes,
            tool,
            base,
            geometry,
        })
    }

    pub fn from_description(description: ChainDescription) -> Result<Self, ChainError> {
        let ChainDescription { joints, tool, base } = description;
        let joints: [JointDescriptor; AXIS_COUNT] = joints
            .try_into()
            .map_err(|rejected: Vec<JointDescriptor>| ChainError::JointCount(rejected.len()))?;
        Self::new(joints, tool, base)
    }

    pub fn from_dimensions(
        dims: ArmDimensions,
        limits: [JointLimits; AXIS_COUNT],
    ) -> Result<Self, ChainError> {
        let flange_tilt = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2);
        let frames = [
            Pose::identity(),
            Pose::from_translation(dims.a1, dims.b, dims.c1),
            Pose::from_translation(0.0, 0.0, dims.c2),
            Pose::from_translation(0.0, 0.0, dims.a2),
            Pose::from_translation(dims.c3, 0.0, 0.0),
            Pose::new(Vector3::new(dims.c4, 0.0, 0.0), flange_tilt),
        ];
        let axes = [
            Vector3::z(),
            Vector3::y(),
            Vector3::y(),
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
        ];
        let joints = std::array::from_fn(|i| JointDescriptor::new(frames[i], axes[i], limits[i]));
        Self::new(joints, Pose::identity(), Pose::identity())
    }

    /// Same chain with a different flange-to-TCP transform.
    pub fn with_tool(&self, tool: Pose) -> Result<Self, ChainError> {
        check_transform(&tool, "tool")?;
        Ok(Self {
            tool,
            ..self.clone()
        })
    }

    /// Same chain mounted at a different place in the world.
    pub fn with_base(&self, base: Pose) -> Result<Self, ChainError> {
        check_transform(&base, "base")?;
        Ok(Self {
            base,
            ..self.clone()
        })
    }

    pub fn joints(&self) -> &[JointDescriptor; AXIS_COUNT] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&JointDescriptor> {
        self.joints.get(index)
    }

    pub fn tool(&self) -> &Pose {
        &self.tool
    }

    pub fn base(&self) -> &Pose {
        &self.base
    }

    pub fn limits(&self) -> [JointLimits; AXIS_COUNT] {
        self.joints.clone().map(|joint| joint.limits)
    }

    pub(crate) fn unit_axis(&self, index: usize) -> &Unit<Vector3<f64>> {
        &self.axes[index]
    }

    pub(crate) fn geometry(&self) -> &ArmGeometry {
        &self.geometry
    }

    pub fn in_limits(&self, joints: &JointVector) -> [bool; AXIS_COUNT] {
        let mut flags = [false; AXIS_COUNT];
        for (index, flag) in flags.iter_mut().enumerate() {
            *flag = self.joints[index].limits.contains(joints[index]);
        }
        flags
    }

    /// Wrist center expressed in the flange frame.
    pub fn wrist_offset(&self) -> Vector3<f64> {
        self.geometry
            .home_flange
            .inverse_transform_point(&Point3::from(self.geometry.wrist_center))
            .coords
    }

    pub fn evaluate(&self, joints: &JointVector) -> ForwardResult {
        forward::evaluate(self, joints)
    }

    pub fn solve(&self, target: &Pose) -> SolutionSet {
        inverse::solve(self, target)
    }

    pub fn axis_configuration(&self, joints: &JointVector) -> AxisConfiguration {
        self.geometry.axis_configuration(joints)
    }
}

impl TryFrom<ChainDescription> for KinematicChain {
    type Error = ChainError;

    fn try_from(description: ChainDescription) -> Result<Self, Self::Error> {
        KinematicChain::from_description(description)
    }
}

impl From<KinematicChain> for ChainDescription {
    fn from(chain: KinematicChain) -> Self {
        Self {
            joints: chain.joints.to_vec(),
            tool: chain.tool,
            base: chain.base,
        }
    }
}

/// Zero-pose screw geometry of the arm, expressed in the robot base frame.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ArmGeometry {
    pub(crate) axes: [Unit<Vector3<f64>>; AXIS_COUNT],
    pub(crate) points: [Vector3<f64>; AXIS_COUNT],
    pub(crate) wrist_center: Vector3<f64>,
    pub(crate) home_flange: Isometry3<f64>,
    /// Characteristic length used to scale linear tolerances.
    pub(crate) scale: f64,
    /// Offset of the wrist center from axis 1 measured along axis 2.
    pub(crate) lateral_offset: f64,
    pub(crate) upper_arm: f64,
    pub(crate) forearm: f64,
    /// Zero-pose angle from the upper arm to the forearm about axis 2 (radians).
    pub(crate) elbow_offset: f64,
    /// +1 when axis 3 points the same way as axis 2, -1 otherwise.
    pub(crate) elbow_sign: f64,
    /// Direction "in front of" axis 1 at zero angles.
    pub(crate) heading: Vector3<f64>,
}

fn check_transform(pose: &Pose, frame: &str) -> Result<(), ChainError> {
    if pose.is_finite() {
        Ok(())
    } else {
        Err(ChainError::NonFiniteTransform {
            frame: frame.to_string(),
        })
    }
}

fn unsupported(reason: &str) -> ChainError {
    ChainError::UnsupportedGeometry {
        reason: reason.to_string(),
    }
}

impl ArmGeometry {
    fn derive(
        joints: &[JointDescriptor; AXIS_COUNT],
        local_axes: &[Unit<Vector3<f64>>; AXIS_COUNT],
    ) -> Result<Self, ChainError> {
        let mut frame = Isometry3::identity();
        let mut axes = [Vector3::z_axis(); AXIS_COUNT];
        let mut points = [Vector3::zeros(); AXIS_COUNT];
        for (index, joint) in joints.iter().enumerate() {
            frame *= joint.frame.to_isometry();
            axes[index] = frame.rotation * local_axes[index];
            points[index] = frame.translation.vector;
        }
        let home_flange = frame;

        let scale = points
            .iter()
            .map(|p| p.norm())
            .chain(std::iter::once(home_flange.translation.vector.norm()))
            .fold(1.0_f64, f64::max);
        let linear = LINEAR_TOLERANCE * scale;

        let [w1, w2, w3, w4, w5, w6] = axes.map(Unit::into_inner);
        if w1.dot(&w2).abs() > ANGULAR_TOLERANCE {
            return Err(unsupported("axis 2 is not perpendicular to axis 1"));
        }
        if w2.cross(&w3).norm() > ANGULAR_TOLERANCE {
            return Err(unsupported("axes 2 and 3 are not parallel"));
        }
        if w4.cross(&w5).norm() < ANGULAR_TOLERANCE {
            return Err(unsupported("axes 4 and 5 are parallel"));
        }

        // Closest points between the lines of axes 4 and 5.
        let offset = points[3] - points[4];
        let k = w4.dot(&w5);
        let d = w4.dot(&offset);
        let e = w5.dot(&offset);
        let denom = 1.0 - k * k;
        let on_four = points[3] + w4 * ((k * e - d) / denom);
        let on_five = points[4] + w5 * ((e - k * d) / denom);
        if (on_four - on_five).norm() > linear {
            return Err(unsupported("axes 4 and 5 do not intersect"));
        }
        let wrist_center = (on_four + on_five) * 0.5;
        if (wrist_center - points[5]).cross(&w6).norm() > linear {
            return Err(unsupported("axis 6 does not pass through the wrist center"));
        }

        let upper = project(&(points[2] - points[1]), &w2);
        let fore = project(&(wrist_center - points[2]), &w2);
        let upper_arm = upper.norm();
        let forearm = fore.norm();
        if upper_arm <= linear {
            return Err(unsupported("axes 2 and 3 are coincident"));
        }
        if forearm <= linear {
            return Err(unsupported("wrist center lies on axis 3"));
        }

        Ok(Self {
            axes,
            points,
            wrist_center,
            home_flange,
            scale,
            lateral_offset: w2.dot(&(wrist_center - points[0])),
            upper_arm,
            forearm,
            elbow_offset: rotation_angle(&w2, &upper, &fore),
            elbow_sign: w2.dot(&w3).signum(),
            heading: w2.cross(&w1),
        })
    }

    /// Rotation about joint `index` by `angle` radians, through that joint's line.
    pub(crate) fn screw(&self, index: usize, angle: f64) -> Isometry3<f64> {
        let rotation = self.rotation(index, angle);
        let point = self.points[index];
        Isometry3::from_parts(Translation3::from(point - rotation * point), rotation)
    }

    pub(crate) fn rotation(&self, index: usize, angle: f64) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&self.axes[index], angle)
    }

    /// Wrist center after moving the first three axes (radians).
    pub(crate) fn wrist_center_at(&self, angles: &[f64; AXIS_COUNT]) -> Vector3<f64> {
        let arm = self.screw(0, angles[0]) * self.screw(1, angles[1]) * self.screw(2, angles[2]);
        arm.transform_point(&Point3::from(self.wrist_center)).coords
    }

    pub(crate) fn axis_configuration(&self, joints: &JointVector) -> AxisConfiguration {
        let angles = joints.to_radians();
        let wrist = self.wrist_center_at(&angles);
        let heading = self.rotation(0, angles[0]) * self.heading;
        let behind = (wrist - self.points[0]).dot(&heading) < 0.0;
        let folded = (self.elbow_offset + self.elbow_sign * angles[2]).sin() < 0.0;
        let flipped = joints[4] < 0.0;
        AxisConfiguration::from_joints(joints, behind, folded, flipped)
    }
}

/// 20 kg class arm shared by the unit tests (millimeters).
#[cfg(test)]
pub(crate) fn demo_chain() -> KinematicChain {
    let limits = [
        JointLimits::new(-180.0, 180.0),
        JointLimits::new(-63.0, 136.0),
        JointLimits::new(-235.0, 55.0),
        JointLimits::new(-200.0, 200.0),
        JointLimits::new(-115.0, 115.0),
        JointLimits::new(-400.0, 400.0),
    ];
    let dims = ArmDimensions {
        a1: 150.0,
        a2: 0.0,
        b: 0.0,
        c1: 486.5,
        c2: 700.0,
        c3: 600.0,
        c4: 65.0,
    };
    KinematicChain::from_dimensions(dims, limits).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dimensions_give_expected_geometry() {
        let chain = demo_chain();
        let geometry = chain.geometry();
        assert_relative_eq!(geometry.wrist_center, Vector3::new(750.0, 0.0, 1186.5), epsilon = 1e-9);
        assert_relative_eq!(geometry.upper_arm, 700.0, epsilon = 1e-9);
        assert_relative_eq!(geometry.forearm, 600.0, epsilon = 1e-9);
        assert_relative_eq!(geometry.elbow_offset.to_degrees(), 90.0, epsilon = 1e-9);
        assert_relative_eq!(geometry.lateral_offset, 0.0, epsilon = 1e-9);
        assert_relative_eq!(chain.wrist_offset(), Vector3::new(0.0, 0.0, -65.0), epsilon = 1e-9);
    }

    #[test]
    fn axes_are_normalized() {
        let mut joints = demo_chain()
            .joints()
            .clone();
        joints[0].axis = Vector3::new(0.0, 0.0, 5.0);
        let chain = KinematicChain::new(joints, Pose::identity(), Pose::identity()).unwrap();
        assert_relative_eq!(chain.joints()[0].axis.norm(), 1.0);
    }

    #[test]
    fn rejects_bad_joints() {
        let joints = demo_chain()
            .joints()
            .clone();

        let mut zero = joints.clone();
        zero[2].axis = Vector3::zeros();
        assert_eq!(
            KinematicChain::new(zero, Pose::identity(), Pose::identity()),
            Err(ChainError::ZeroAxis { axis: 3 })
        );

        let mut inverted = joints.clone();
        inverted[1].limits = JointLimits::new(10.0, -10.0);
        assert_eq!(
            KinematicChain::new(inverted, Pose::identity(), Pose::identity()),
            Err(ChainError::InvertedLimits {
                axis: 2,
                min: 10.0,
                max: -10.0
            })
        );

        let mut infinite = joints;
        infinite[5].limits = JointLimits::new(f64::NEG_INFINITY, 0.0);
        assert_eq!(
            KinematicChain::new(infinite, Pose::identity(), Pose::identity()),
            Err(ChainError::NonFiniteLimits { axis: 6 })
        );
    }

    #[test]
    fn rejects_offset_wrist() {
        let mut joints = demo_chain()
            .joints()
            .clone();
        joints[5].frame = Pose::new(
            Vector3::new(65.0, 20.0, 0.0),
            joints[5].frame.orientation,
        );
        let err = KinematicChain::new(joints, Pose::identity(), Pose::identity()).unwrap_err();
        assert!(matches!(err, ChainError::UnsupportedGeometry { .. }));
    }

    #[test]
    fn rejects_wrong_joint_count() {
        let mut description: ChainDescription = demo_chain().into();
        description.joints.pop();
        assert_eq!(
            KinematicChain::from_description(description),
            Err(ChainError::JointCount(5))
        );
    }

    #[test]
    fn tool_and_base_do_not_touch_geometry() {
        let chain = demo_chain();
        let moved = chain
            .with_tool(Pose::from_translation(0.0, 0.0, 100.0))
            .unwrap()
            .with_base(Pose::from_translation(1000.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(moved.geometry(), chain.geometry());
        assert_eq!(moved.tool().position.z, 100.0);
        assert_eq!(moved.base().position.x, 1000.0);
    }

    #[test]
    fn rejects_non_finite_tool_and_base() {
        let chain = demo_chain();
        assert_eq!(
            chain.with_tool(Pose::from_translation(f64::NAN, 0.0, 0.0)),
            Err(ChainError::NonFiniteTransform {
                frame: "tool".to_string()
            })
        );
        assert_eq!(
            chain.with_base(Pose::from_translation(0.0, f64::INFINITY, 0.0)),
            Err(ChainError::NonFiniteTransform {
                frame: "base".to_string()
            })
        );
        assert_eq!(
            KinematicChain::new(
                chain.joints().clone(),
                Pose::identity(),
                Pose::from_translation(0.0, 0.0, f64::NAN)
            ),
            Err(ChainError::NonFiniteTransform {
                frame: "base".to_string()
            })
        );
    }
}
