/// Degenerate targets: singular, out of reach, out of limits.
mod common;

use common::{demo_chain, demo_dimensions, demo_limits};
use nalgebra::{UnitQuaternion, Vector3};
use robot_kinematics::{ArmDimensions, Diagnostic, JointVector, KinematicChain, Pose};

/// Flange pointing straight down with the wrist center on axis 1.
fn overhead_target() -> Pose {
    Pose::new(
        Vector3::new(0.0, 0.0, 1200.0),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::PI),
    )
}

#[test]
fn test_shoulder_singularity() {
    let chain = demo_chain();
    let target = overhead_target();
    let set = chain.solve(&target);

    println!("{:?}", set.messages());
    assert!(!set.is_empty());
    assert!(set.diagnostics().contains(&Diagnostic::ShoulderSingularity));
    assert!(set.iter().all(|s| s.singular));
    assert!(set.iter().all(|s| s.joints.iter().all(|a| a.is_finite())));
    assert!(set.iter().any(|s| s.joints[0] == 0.0));
    assert!(set
        .iter()
        .all(|s| s.joints[0] == 0.0 || (s.joints[0].abs() - 180.0).abs() < 1e-9));

    for solution in &set {
        let (position_error, orientation_error) = chain.evaluate(&solution.joints).tcp.distance(&target);
        assert!(position_error < 1e-6, "position error {}", position_error);
        assert!(orientation_error < 1e-6, "orientation error {}", orientation_error);
    }
}

#[test]
fn test_shoulder_singularity_with_lateral_offset_is_unreachable() {
    let dims = ArmDimensions {
        b: 100.0,
        ..demo_dimensions()
    };
    let chain = KinematicChain::from_dimensions(dims, demo_limits()).unwrap();
    let set = chain.solve(&overhead_target());
    assert!(set.is_empty());
    assert!(matches!(set.diagnostics()[0], Diagnostic::Unreachable { .. }));
}

#[test]
fn test_lateral_offset_round_trip() {
    let dims = ArmDimensions {
        b: 100.0,
        ..demo_dimensions()
    };
    let chain = KinematicChain::from_dimensions(dims, demo_limits()).unwrap();
    let joints = JointVector::new([25.0, 35.0, -15.0, -60.0, 45.0, 120.0]);
    let target = chain.evaluate(&joints).tcp;
    let set = chain.solve(&target);
    assert!(set.len() <= 8);
    assert!(set.iter().any(|s| s.joints.distance(&joints) < 1e-6));
}

#[test]
fn test_wrist_singularity() {
    let chain = demo_chain();
    let joints = JointVector::new([0.0, 30.0, -20.0, 45.0, 0.0, 30.0]);
    let target = chain.evaluate(&joints).tcp;
    let set = chain.solve(&target);

    assert!(set
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::WristSingularity { tie_break: true, .. })));
    let held = set
        .iter()
        .find(|s| s.joints.distance(&JointVector::new([0.0, 30.0, -20.0, 0.0, 0.0, 75.0])) < 1e-6)
        .expect("axis 4 held at zero, axis 6 takes the sum");
    assert!(held.singular);
    assert!(held.valid);

    for solution in &set {
        let (position_error, orientation_error) = chain.evaluate(&solution.joints).tcp.distance(&target);
        assert!(position_error < 1e-6);
        assert!(orientation_error < 1e-6);
    }
}

#[test]
fn test_near_wrist_singularity_keeps_axis_four() {
    // Inside the singular band but not aligned: no tie-break is applied.
    let chain = demo_chain();
    let joints = JointVector::new([0.0, 30.0, -20.0, 45.0, 0.0005, 30.0]);
    let target = chain.evaluate(&joints).tcp;
    let set = chain.solve(&target);

    println!("{:?}", set.messages());
    let wrist: Vec<&Diagnostic> = set
        .diagnostics()
        .iter()
        .filter(|d| matches!(d, Diagnostic::WristSingularity { .. }))
        .collect();
    assert!(!wrist.is_empty());
    assert!(wrist
        .iter()
        .all(|d| matches!(d, Diagnostic::WristSingularity { tie_break: false, .. })));
    assert!(set.messages().iter().all(|m| !m.contains("fixed at 0")));

    let kept = set
        .iter()
        .find(|s| s.joints.distance(&joints) < 1e-3)
        .expect("axis 4 keeps its computed angle");
    assert!(kept.singular);
    assert!((kept.joints[3] - 45.0).abs() < 1e-3);
}

#[test]
fn test_unreachable_target() {
    let chain = demo_chain();
    let set = chain.solve(&Pose::from_translation(0.0, 3000.0, 500.0));
    assert!(set.is_empty());
    assert!(!set.messages().is_empty());
    assert!(set
        .diagnostics()
        .iter()
        .all(|d| matches!(d, Diagnostic::Unreachable { .. })));
}

#[test]
fn test_non_finite_target() {
    let chain = demo_chain();
    let target = Pose::from_translation(f64::NAN, 0.0, 0.0);
    let set = chain.solve(&target);
    assert!(set.is_empty());
    assert_eq!(set.diagnostics().len(), 1);
}

#[test]
fn test_out_of_limits_are_flagged() {
    let chain = demo_chain();
    let joints = JointVector::new([0.0, 150.0, -20.0, 0.0, 30.0, 0.0]);
    let fk = chain.evaluate(&joints);
    assert_eq!(fk.in_limits[1], false);

    let set = chain.solve(&fk.tcp);
    let hit = set
        .iter()
        .find(|s| s.joints.distance(&joints) < 1e-6)
        .expect("out-of-limit solution is kept");
    assert!(!hit.valid);
    assert_eq!(hit.in_limits, [true, false, true, true, true, true]);
    assert!(set.diagnostics().iter().any(|d| matches!(
        d,
        Diagnostic::OutOfLimits { axis: 2, min, max, .. } if *min == -63.0 && *max == 136.0
    )));

    for solution in &set {
        assert_eq!(solution.valid, solution.in_limits.iter().all(|&ok| ok));
    }
}

#[test]
fn test_stretched_elbow_merges_branches() {
    let chain = demo_chain();
    let joints = JointVector::new([0.0, 20.0, -90.0, 10.0, 40.0, 10.0]);
    let target = chain.evaluate(&joints).tcp;
    let set = chain.solve(&target);
    assert!(!set.is_empty());
    assert!(set.len() < 8);
    assert!(set.iter().any(|s| s.joints.distance(&joints) < 1e-4));
}
