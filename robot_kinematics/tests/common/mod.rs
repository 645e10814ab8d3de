#![allow(dead_code)]

use robot_kinematics::{ArmDimensions, JointLimits, KinematicChain};

/// 20 kg class arm used throughout the integration tests (millimeters).
pub fn demo_dimensions() -> ArmDimensions {
    ArmDimensions {
        a1: 150.0,
        a2: 0.0,
        b: 0.0,
        c1: 486.5,
        c2: 700.0,
        c3: 600.0,
        c4: 65.0,
    }
}

pub fn demo_limits() -> [JointLimits; 6] {
    [
        JointLimits::new(-180.0, 180.0),
        JointLimits::new(-63.0, 136.0),
        JointLimits::new(-235.0, 55.0),
        JointLimits::new(-200.0, 200.0),
        JointLimits::new(-115.0, 115.0),
        JointLimits::new(-400.0, 400.0),
    ]
}

pub fn demo_chain() -> KinematicChain {
    KinematicChain::from_dimensions(demo_dimensions(), demo_limits()).expect("demo arm is valid")
}
