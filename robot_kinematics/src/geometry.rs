//! Value types shared by the forward and inverse solvers.
//!
//! Angles that cross the public API are in degrees. Lengths are in whatever
//! unit the chain geometry was given in (millimeters for controller data).
//!
//! # Examples
//!
//! ```rust
//! use robot_kinematics::{JointVector, Pose};
//! use nalgebra::Isometry3;
//!
//! let pose = Pose::from_xyzwpr(100.0, 200.0, 300.0, 0.0, 90.0, 0.0);
//! let iso: Isometry3<f64> = pose.into();
//! assert!((iso.translation.x - 100.0).abs() < 1e-12);
//!
//! let joints = JointVector::new([0.0, 30.0, -30.0, 0.0, 45.0, 0.0]);
//! assert_eq!(joints[4], 45.0);
//! ```

use std::fmt;
use std::ops::{Index, IndexMut, Mul};

use nalgebra::{Isometry3, Matrix3, Matrix4, Point3, Quaternion, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::errors::PoseError;

/// Number of robot axes handled by the core solvers.
pub const AXIS_COUNT: usize = 6;

/// Angles of the six robot axes in degrees, axis 1 first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct JointVector(pub [f64; AXIS_COUNT]);

impl JointVector {
    pub const fn new(angles: [f64; AXIS_COUNT]) -> Self {
        Self(angles)
    }

    pub const fn zeros() -> Self {
        Self([0.0; AXIS_COUNT])
    }

    pub fn from_radians(angles: [f64; AXIS_COUNT]) -> Self {
        Self(angles.map(f64::to_degrees))
    }

    pub fn to_radians(&self) -> [f64; AXIS_COUNT] {
        self.0.map(f64::to_radians)
    }

    pub fn angles(&self) -> &[f64; AXIS_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Euclidean distance in joint space, in degrees.
    ///
    /// Angles are compared as given: 190° and -170° are different joint
    /// positions for an axis that can travel past a half turn.
    pub fn distance(&self, other: &JointVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<[f64; AXIS_COUNT]> for JointVector {
    fn from(angles: [f64; AXIS_COUNT]) -> Self {
        Self(angles)
    }
}

impl Index<usize> for JointVector {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        &self.0[axis]
    }
}

impl IndexMut<usize> for JointVector {
    fn index_mut(&mut self, axis: usize) -> &mut f64 {
        &mut self.0[axis]
    }
}

impl fmt::Display for JointVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [j1, j2, j3, j4, j5, j6] = self.0;
        write!(
            f,
            "[{:.3}, {:.3}, {:.3}, {:.3}, {:.3}, {:.3}]",
            j1, j2, j3, j4, j5, j6
        )
    }
}

/// Positions of linear tracks or positioners, passed through untouched.
pub type ExternalAxisVector = Vec<f64>;

/// Robot axes plus any external axes, the way a controller stores a joint target.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct JointTarget {
    pub joints: JointVector,
    #[serde(default)]
    pub external: ExternalAxisVector,
}

impl JointTarget {
    pub fn new(joints: JointVector, external: ExternalAxisVector) -> Self {
        Self { joints, external }
    }

    /// Same external axes, different robot axes.
    pub fn with_joints(&self, joints: JointVector) -> Self {
        Self {
            joints,
            external: self.external.clone(),
        }
    }
}

/// Wraps an angle in degrees into `(-180, 180]`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// A rigid transform: position plus unit-quaternion orientation.
///
/// Serialized as `{"Position": [x, y, z], "Orientation": [w, x, y, z]}`;
/// the quaternion is renormalized on the way in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(into = "PoseRepr", try_from = "PoseRepr")]
pub struct Pose {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PoseRepr {
    position: [f64; 3],
    orientation: [f64; 4],
}

impl From<Pose> for PoseRepr {
    fn from(pose: Pose) -> Self {
        Self {
            position: pose.position.into(),
            orientation: pose.quaternion_wxyz(),
        }
    }
}

impl TryFrom<PoseRepr> for Pose {
    type Error = PoseError;

    fn try_from(repr: PoseRepr) -> Result<Self, Self::Error> {
        Pose::from_quaternion(repr.position, repr.orientation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Vector3::new(x, y, z), UnitQuaternion::identity())
    }

    /// Builds a pose from raw quaternion components in `[w, x, y, z]` order.
    ///
    /// Small drift away from unit norm is corrected.
    pub fn from_quaternion(position: [f64; 3], wxyz: [f64; 4]) -> Result<Self, PoseError> {
        if position.iter().chain(wxyz.iter()).any(|v| !v.is_finite()) {
            return Err(PoseError::NonFinite);
        }
        let [w, x, y, z] = wxyz;
        let raw = Quaternion::new(w, x, y, z);
        if raw.norm() <= f64::EPSILON {
            return Err(PoseError::DegenerateQuaternion);
        }
        Ok(Self::new(
            Vector3::from(position),
            UnitQuaternion::from_quaternion(raw),
        ))
    }

    /// Quaternion components in `[w, x, y, z]` order.
    pub fn quaternion_wxyz(&self) -> [f64; 4] {
        let q = self.orientation.quaternion();
        [q.w, q.i, q.j, q.k]
    }

    /// Rotation of `angle` degrees about `axis` (any non-zero length).
    pub fn from_axis_angle(
        position: Vector3<f64>,
        axis: Vector3<f64>,
        angle: f64,
    ) -> Result<Self, PoseError> {
        let axis = Unit::try_new(axis, f64::EPSILON).ok_or(PoseError::ZeroAxis)?;
        Ok(Self::new(
            position,
            UnitQuaternion::from_axis_angle(&axis, angle.to_radians()),
        ))
    }

    /// Rotation axis and angle in degrees, `None` for the identity rotation.
    pub fn axis_angle(&self) -> Option<(Unit<Vector3<f64>>, f64)> {
        self.orientation
            .axis_angle()
            .map(|(axis, angle)| (axis, angle.to_degrees()))
    }

    /// X, Y, Z plus W-P-R angles in degrees (R = Rz(r) * Ry(p) * Rx(w)).
    pub fn from_xyzwpr(x: f64, y: f64, z: f64, w: f64, p: f64, r: f64) -> Self {
        Self::new(
            Vector3::new(x, y, z),
            UnitQuaternion::from_euler_angles(w.to_radians(), p.to_radians(), r.to_radians()),
        )
    }

    pub fn to_xyzwpr(&self) -> [f64; 6] {
        let (w, p, r) = self.orientation.euler_angles();
        [
            self.position.x,
            self.position.y,
            self.position.z,
            w.to_degrees(),
            p.to_degrees(),
            r.to_degrees(),
        ]
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }

    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self::new(iso.translation.vector, iso.rotation)
    }

    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        self.to_isometry().to_homogeneous()
    }

    /// Reads a 4x4 homogeneous matrix; the rotation block is re-orthonormalized.
    pub fn from_homogeneous(matrix: &Matrix4<f64>) -> Result<Self, PoseError> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(PoseError::NonFinite);
        }
        let rotation: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let position = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
        Ok(Self::new(position, UnitQuaternion::from_matrix(&rotation)))
    }

    pub fn inverse(&self) -> Self {
        let orientation = self.orientation.inverse();
        Self::new(-(orientation * self.position), orientation)
    }

    /// `self * other`: `other` expressed in this pose's frame.
    pub fn compose(&self, other: &Pose) -> Self {
        Self::new(
            self.position + self.orientation * other.position,
            self.orientation * other.orientation,
        )
    }

    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.to_isometry().transform_point(&Point3::from(*point)).coords
    }

    /// Position error and orientation error (degrees) between two poses.
    pub fn distance(&self, other: &Pose) -> (f64, f64) {
        // atan2 form stays accurate for tiny angles where acos(w) does not.
        let delta = self.orientation.inverse() * other.orientation;
        let angle = 2.0 * delta.imag().norm().atan2(delta.w.abs());
        ((self.position - other.position).norm(), angle.to_degrees())
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.quaternion_wxyz().iter().all(|v| v.is_finite())
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

impl From<Pose> for Isometry3<f64> {
    fn from(pose: Pose) -> Self {
        pose.to_isometry()
    }
}

impl From<&Pose> for Isometry3<f64> {
    fn from(pose: &Pose) -> Self {
        pose.to_isometry()
    }
}

impl From<Isometry3<f64>> for Pose {
    fn from(iso: Isometry3<f64>) -> Self {
        Pose::from_isometry(&iso)
    }
}
