use serde::{Deserialize, Serialize};

use crate::configuration::{AxisConfiguration, ConfigurationSignature};
use crate::diagnostics::Diagnostic;
use crate::geometry::{ExternalAxisVector, JointTarget, JointVector, AXIS_COUNT};

/// One joint-space answer to an IK query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Solution {
    pub joints: JointVector,
    /// Every axis lies inside its limits.
    pub valid: bool,
    pub in_limits: [bool; AXIS_COUNT],
    pub signature: ConfigurationSignature,
    pub configuration: AxisConfiguration,
    /// Near a shoulder or wrist singularity. The matching diagnostic says
    /// whether an axis was set to its tie-break value.
    pub singular: bool,
}

impl Solution {
    /// Pairs the robot axes with the given external axes.
    pub fn to_target(&self, external: &ExternalAxisVector) -> JointTarget {
        JointTarget::new(self.joints, external.clone())
    }
}

/// Ordered solutions of one solve together with what went wrong on the way.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct SolutionSet {
    solutions: Vec<Solution>,
    diagnostics: Vec<Diagnostic>,
}

impl SolutionSet {
    pub(crate) fn new(solutions: Vec<Solution>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            solutions,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    pub fn valid(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter().filter(|s| s.valid)
    }

    /// The valid solution nearest to `current` in joint space.
    pub fn closest_to(&self, current: &JointVector) -> Option<&Solution> {
        self.valid().min_by(|a, b| {
            a.joints
                .distance(current)
                .total_cmp(&b.joints.distance(current))
        })
    }

    pub fn matching<'a>(
        &'a self,
        signature: &'a ConfigurationSignature,
    ) -> impl Iterator<Item = &'a Solution> + 'a {
        self.solutions
            .iter()
            .filter(move |s| s.signature == *signature)
    }

    pub fn into_solutions(self) -> Vec<Solution> {
        self.solutions
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}
