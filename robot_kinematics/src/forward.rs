use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::chain::KinematicChain;
use crate::geometry::{JointVector, Pose, AXIS_COUNT};

/// TCP pose for a joint vector, plus which axes sit inside their limits.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ForwardResult {
    pub tcp: Pose,
    pub in_limits: [bool; AXIS_COUNT],
}

impl ForwardResult {
    pub fn is_within_limits(&self) -> bool {
        self.in_limits.iter().all(|&ok| ok)
    }
}

/// World pose of every joint frame after its own rotation has been applied.
///
/// Element 5 is the flange.
pub fn joint_frames(chain: &KinematicChain, joints: &JointVector) -> [Pose; AXIS_COUNT] {
    let mut current = chain.base().to_isometry();
    let mut frames = [Pose::identity(); AXIS_COUNT];
    for (index, joint) in chain.joints().iter().enumerate() {
        let turn = UnitQuaternion::from_axis_angle(chain.unit_axis(index), joints[index].to_radians());
        current = current * joint.frame.to_isometry() * Isometry3::from_parts(Translation3::identity(), turn);
        frames[index] = Pose::from_isometry(&current);
    }
    frames
}

/// World pose of the flange, tool not applied.
pub fn flange(chain: &KinematicChain, joints: &JointVector) -> Pose {
    joint_frames(chain, joints)[AXIS_COUNT - 1]
}

/// Forward kinematics: base, then each attachment frame and joint rotation, then the tool.
///
/// Limit violations are reported in [`ForwardResult::in_limits`]; the pose is
/// computed regardless.
pub fn evaluate(chain: &KinematicChain, joints: &JointVector) -> ForwardResult {
    let tcp = flange(chain, joints) * *chain.tool();
    let in_limits = chain.in_limits(joints);
    trace!(
        "FK {} -> ({:.3}, {:.3}, {:.3})",
        joints, tcp.position.x, tcp.position.y, tcp.position.z
    );
    ForwardResult { tcp, in_limits }
}
