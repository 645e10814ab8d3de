use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A non-fatal condition met while solving.
///
/// Diagnostics travel with the [`SolutionSet`](crate::SolutionSet) they were
/// raised for. An unreachable target is a diagnostic with an empty set, not an
/// error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    Unreachable { reason: String },
    ShoulderSingularity,
    /// `tie_break` is set when axis 4 was held at 0 and axis 6 took the whole
    /// rotation; otherwise both keep their computed, poorly conditioned values.
    WristSingularity { axis5: f64, tie_break: bool },
    OutOfLimits { axis: usize, angle: f64, min: f64, max: f64 },
    RoundTripMismatch { position_error: f64, orientation_error: f64 },
}

impl Diagnostic {
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Diagnostic::Unreachable {
            reason: reason.into(),
        }
    }

    pub fn is_singularity(&self) -> bool {
        matches!(
            self,
            Diagnostic::ShoulderSingularity | Diagnostic::WristSingularity { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Diagnostic::Unreachable { ref reason } => write!(f, "Target unreachable: {}", reason),
            Diagnostic::ShoulderSingularity => write!(
                f,
                "Shoulder singularity: wrist center on axis 1, axis 1 set to its tie-break angle"
            ),
            Diagnostic::WristSingularity {
                axis5,
                tie_break: true,
            } => write!(
                f,
                "Wrist singularity: axis 5 at {:.4} deg, axis 4 fixed at 0 and axis 6 takes the rotation",
                axis5
            ),
            Diagnostic::WristSingularity {
                axis5,
                tie_break: false,
            } => write!(
                f,
                "Wrist singularity: axis 5 at {:.4} deg, axes 4 and 6 are nearly coupled",
                axis5
            ),
            Diagnostic::OutOfLimits {
                axis,
                angle,
                min,
                max,
            } => write!(
                f,
                "Axis {} at {:.4} deg is outside its limits [{}, {}]",
                axis, angle, min, max
            ),
            Diagnostic::RoundTripMismatch {
                position_error,
                orientation_error,
            } => write!(
                f,
                "Candidate discarded: FK misses the target by {:.6} (position) and {:.6} deg (orientation)",
                position_error, orientation_error
            ),
        }
    }
}

/// Per-solve collector. Drops repeats and mirrors each entry to `tracing`.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        if self.entries.contains(&diagnostic) {
            return;
        }
        debug!("IK diagnostic: {}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_drops_repeats() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::ShoulderSingularity);
        diagnostics.push(Diagnostic::unreachable("too far"));
        diagnostics.push(Diagnostic::ShoulderSingularity);
        let entries = diagnostics.into_vec();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_singularity());
        assert!(!entries[1].is_singularity());
    }

    #[test]
    fn messages_name_the_axis() {
        let message = Diagnostic::OutOfLimits {
            axis: 3,
            angle: 70.0,
            min: -235.0,
            max: 55.0,
        }
        .to_string();
        assert!(message.starts_with("Axis 3 at 70.0000 deg"));
        assert!(message.contains("[-235, 55]"));
    }

    #[test]
    fn wrist_message_follows_the_tie_break() {
        let held = Diagnostic::WristSingularity {
            axis5: 0.0,
            tie_break: true,
        }
        .to_string();
        assert!(held.contains("axis 4 fixed at 0"));

        let kept = Diagnostic::WristSingularity {
            axis5: 0.0005,
            tie_break: false,
        }
        .to_string();
        assert!(!kept.contains("fixed"));
        assert!(kept.contains("axis 5 at 0.0005 deg"));
    }
}
