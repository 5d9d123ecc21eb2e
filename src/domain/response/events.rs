//! Response lifecycle events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, MapId, ResponseId, Timestamp, UserId};
use crate::domain::review_map::MapKind;
use crate::domain_event;

/// Published when a response moves from Draft to Submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSubmitted {
    pub event_id: EventId,
    pub response_id: ResponseId,
    pub map_id: MapId,
    pub map_kind: MapKind,
    pub round: Option<u32>,
    pub submitted_by: UserId,
    pub submitted_at: Timestamp,
}

domain_event!(
    ResponseSubmitted,
    event_type = "response.submitted.v1",
    aggregate_id = response_id,
    aggregate_type = "Response",
    occurred_at = submitted_at,
    event_id = event_id
);

/// Published when a response version is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDeleted {
    pub event_id: EventId,
    pub response_id: ResponseId,
    pub map_id: MapId,
    pub deleted_by: UserId,
    pub deleted_at: Timestamp,
}

domain_event!(
    ResponseDeleted,
    event_type = "response.deleted.v1",
    aggregate_id = response_id,
    aggregate_type = "Response",
    occurred_at = deleted_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;

    #[test]
    fn submitted_event_envelope_is_routed_by_response() {
        let response_id = ResponseId::new();
        let event = ResponseSubmitted {
            event_id: EventId::new(),
            response_id,
            map_id: MapId::new(),
            map_kind: MapKind::Review,
            round: Some(2),
            submitted_by: UserId::new("alice").unwrap(),
            submitted_at: Timestamp::now(),
        };
        let envelope = event.to_envelope().unwrap();
        assert_eq!(envelope.event_type, "response.submitted.v1");
        assert_eq!(envelope.aggregate_type, "Response");
        assert_eq!(envelope.aggregate_id, response_id.to_string());
        assert_eq!(envelope.payload["map_kind"], "review");
        assert_eq!(envelope.payload["round"], 2);
    }
}
