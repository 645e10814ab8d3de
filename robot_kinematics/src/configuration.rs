//! Controller axis-configuration data and the solution ordering built on it.
//!
//! `cf1`, `cf4` and `cf6` are the quarter-turn indices of axes 1, 4 and 6:
//! `floor(angle / 90)`, rounding toward negative infinity, so -100° is -2
//! and 0° to 89.99° is 0.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::JointVector;

fn quarter_turns(angle: f64) -> i32 {
    (angle / 90.0).floor() as i32
}

/// `(cf1, cf4, cf6)`. Orders lexicographically in that field order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigurationSignature {
    pub cf1: i32,
    pub cf4: i32,
    pub cf6: i32,
}

impl ConfigurationSignature {
    pub const fn new(cf1: i32, cf4: i32, cf6: i32) -> Self {
        Self { cf1, cf4, cf6 }
    }

    pub fn of(joints: &JointVector) -> Self {
        Self {
            cf1: quarter_turns(joints[0]),
            cf4: quarter_turns(joints[3]),
            cf6: quarter_turns(joints[5]),
        }
    }
}

impl fmt::Display for ConfigurationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.cf1, self.cf4, self.cf6)
    }
}

/// Full controller configuration: the signature plus the `cfx` branch index.
///
/// `cfx` packs three bits, `shoulder << 2 | elbow << 1 | wrist`:
/// shoulder is set when the wrist center is behind axis 1, elbow when the
/// forearm folds below the upper-arm line, wrist when axis 5 is negative.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "PascalCase")]
pub struct AxisConfiguration {
    pub cf1: i32,
    pub cf4: i32,
    pub cf6: i32,
    pub cfx: u8,
}

impl AxisConfiguration {
    pub(crate) fn from_joints(joints: &JointVector, behind: bool, folded: bool, flipped: bool) -> Self {
        let signature = ConfigurationSignature::of(joints);
        Self {
            cf1: signature.cf1,
            cf4: signature.cf4,
            cf6: signature.cf6,
            cfx: (u8::from(behind) << 2) | (u8::from(folded) << 1) | u8::from(flipped),
        }
    }

    pub fn signature(&self) -> ConfigurationSignature {
        ConfigurationSignature::new(self.cf1, self.cf4, self.cf6)
    }

    pub fn is_shoulder_back(&self) -> bool {
        self.cfx & 0b100 != 0
    }

    pub fn is_elbow_down(&self) -> bool {
        self.cfx & 0b010 != 0
    }

    pub fn is_wrist_flipped(&self) -> bool {
        self.cfx & 0b001 != 0
    }
}

impl fmt::Display for AxisConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.cf1, self.cf4, self.cf6, self.cfx)
    }
}

/// Solution ordering.
///
/// Signatures ascend lexicographically. Ties fall back to the raw angles,
/// axis 1 first, and the larger angle sorts first. Equal floats compare
/// equal; everything else goes through `total_cmp`, so NaN cannot break a sort.
pub fn compare(a: &JointVector, b: &JointVector) -> Ordering {
    ConfigurationSignature::of(a)
        .cmp(&ConfigurationSignature::of(b))
        .then_with(|| {
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| if x == y { Ordering::Equal } else { y.total_cmp(x) })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

/// Stable in-place sort by [`compare`].
pub fn sort(joints: &mut [JointVector]) {
    joints.sort_by(compare);
}
