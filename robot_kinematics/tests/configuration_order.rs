/// Ordering of solutions by controller configuration data.
mod common;

use std::cmp::Ordering;

use common::demo_chain;
use proptest::prelude::*;
use robot_kinematics::configuration::{compare, sort};
use robot_kinematics::{ConfigurationSignature, JointVector};

fn jv(angles: [f64; 6]) -> JointVector {
    JointVector::new(angles)
}

#[test]
fn test_controller_ordering_example() {
    let mut joints = vec![
        jv([180.0, 10.0, -100.0, 10.0, 10.0, 10.0]),
        jv([-10.0, 10.0, 10.0, 0.0, 0.0, 0.0]),
        jv([-100.0, 0.0, 0.0, 100.0, 0.0, 101.0]),
        jv([-100.0, 0.0, 0.0, 100.0, 0.0, 100.0]),
        jv([30.0, 0.0, 0.0, 100.0, 0.0, 100.0]),
        jv([180.0, 10.0, -100.0, -90.0, 10.0, 10.0]),
    ];
    sort(&mut joints);

    let expected = vec![
        jv([-100.0, 0.0, 0.0, 100.0, 0.0, 101.0]),
        jv([-100.0, 0.0, 0.0, 100.0, 0.0, 100.0]),
        jv([-10.0, 10.0, 10.0, 0.0, 0.0, 0.0]),
        jv([30.0, 0.0, 0.0, 100.0, 0.0, 100.0]),
        jv([180.0, 10.0, -100.0, -90.0, 10.0, 10.0]),
        jv([180.0, 10.0, -100.0, 10.0, 10.0, 10.0]),
    ];
    assert_eq!(joints, expected);

    // Sorting a sorted list changes nothing.
    sort(&mut joints);
    assert_eq!(joints, expected);
}

#[test]
fn test_signature_values() {
    assert_eq!(
        ConfigurationSignature::of(&jv([-100.0, 0.0, 0.0, 100.0, 0.0, 101.0])),
        ConfigurationSignature::new(-2, 1, 1)
    );
    assert_eq!(
        ConfigurationSignature::of(&jv([180.0, 10.0, -100.0, -90.0, 10.0, 10.0])),
        ConfigurationSignature::new(2, -1, 0)
    );
    assert_eq!(
        ConfigurationSignature::of(&jv([-0.001, 0.0, 0.0, 89.999, 0.0, 90.0])),
        ConfigurationSignature::new(-1, 0, 1)
    );
}

#[test]
fn test_nan_sorts_without_panic() {
    let mut joints = vec![
        jv([f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0]),
        jv([10.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        jv([f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0]),
    ];
    sort(&mut joints);
    assert_eq!(joints.len(), 3);
}

#[test]
fn test_solver_configuration_matches_geometry() {
    let chain = demo_chain();
    let joints = jv([10.0, -20.0, 20.0, 40.0, 50.0, 60.0]);
    let configuration = chain.axis_configuration(&joints);
    assert_eq!(configuration.signature(), ConfigurationSignature::new(0, 0, 0));
    assert_eq!(configuration.cfx, 0);

    // Same pose reached from behind, elbow folded, wrist flipped.
    let set = chain.solve(&chain.evaluate(&joints).tcp);
    let back = set
        .iter()
        .find(|s| s.configuration.cfx == 0b111)
        .expect("back/down/flip branch");
    assert!(back.configuration.is_shoulder_back());
    assert!(back.joints[4] < 0.0);
    assert_eq!(back.configuration, chain.axis_configuration(&back.joints));
}

fn angle() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-4i32..4).prop_map(|q| f64::from(q) * 90.0),
        -360.0..360.0f64,
    ]
}

fn joint_vector() -> impl Strategy<Value = JointVector> {
    prop::array::uniform6(angle()).prop_map(JointVector::new)
}

proptest! {
    #[test]
    fn prop_compare_is_antisymmetric(a in joint_vector(), b in joint_vector()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
        prop_assert_eq!(compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn prop_compare_is_transitive(a in joint_vector(), b in joint_vector(), c in joint_vector()) {
        if compare(&a, &b) != Ordering::Greater && compare(&b, &c) != Ordering::Greater {
            prop_assert_ne!(compare(&a, &c), Ordering::Greater);
        }
    }

    #[test]
    fn prop_sort_is_idempotent(mut joints in prop::collection::vec(joint_vector(), 0..12)) {
        sort(&mut joints);
        let once = joints.clone();
        sort(&mut joints);
        prop_assert_eq!(once, joints);
    }
}
