//! Deviation domain module.
//!
//! When a peer review is submitted, its aggregate score is compared with
//! what the other reviewers of the same work gave. The statistics belong to
//! a scoring collaborator; this module owns the guard that decides whether
//! to ask at all and the event raised when the answer is "significant".

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, MapId, ResponseId, Timestamp};
use crate::domain::review_map::MapKind;
use crate::domain_event;

/// Result of comparing a submission with its reference aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationAssessment {
    pub submitted_score: f64,
    pub reference_score: f64,
    /// `submitted_score - reference_score`.
    pub delta: f64,
    pub significant: bool,
}

/// Raised when a freshly submitted review deviates significantly from its peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDeviationDetected {
    pub event_id: EventId,
    pub response_id: ResponseId,
    pub map_id: MapId,
    pub submitted_score: f64,
    pub reference_score: f64,
    pub delta: f64,
    pub detected_at: Timestamp,
}

domain_event!(
    ReviewDeviationDetected,
    event_type = "review.deviation_detected.v1",
    aggregate_id = response_id,
    aggregate_type = "Response",
    occurred_at = detected_at,
    event_id = event_id
);

impl ReviewDeviationDetected {
    pub fn from_assessment(
        response_id: ResponseId,
        map_id: MapId,
        assessment: &DeviationAssessment,
        detected_at: Timestamp,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            response_id,
            map_id,
            submitted_score: assessment.submitted_score,
            reference_score: assessment.reference_score,
            delta: assessment.delta,
            detected_at,
        }
    }
}

/// The deviation check runs only on the Draft → Submitted edge of a map kind
/// where comparing against peers means something.
pub fn should_evaluate(kind: MapKind, was_submitted_before: bool, is_submitted_now: bool) -> bool {
    !was_submitted_before && is_submitted_now && kind.triggers_deviation_check()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;

    #[test]
    fn guard_fires_only_on_submission_edge() {
        assert!(should_evaluate(MapKind::Review, false, true));
        assert!(!should_evaluate(MapKind::Review, true, true));
        assert!(!should_evaluate(MapKind::Review, false, false));
        assert!(!should_evaluate(MapKind::Review, true, false));
    }

    #[test]
    fn guard_ignores_non_peer_kinds() {
        for kind in MapKind::ALL {
            if kind != MapKind::Review {
                assert!(!should_evaluate(kind, false, true), "{:?} must not fire", kind);
            }
        }
    }

    #[test]
    fn event_carries_delta() {
        let assessment = DeviationAssessment {
            submitted_score: 1.0,
            reference_score: 4.5,
            delta: -3.5,
            significant: true,
        };
        let event = ReviewDeviationDetected::from_assessment(
            ResponseId::new(),
            MapId::new(),
            &assessment,
            Timestamp::now(),
        );
        let envelope = event.to_envelope().unwrap();
        assert_eq!(envelope.event_type, "review.deviation_detected.v1");
        assert_eq!(envelope.payload["delta"], -3.5);
    }
}
