//! Deviation Notifier - guards and forwards deviation notifications.
//!
//! The notifier owns only the guard (first submission of a peer review) and
//! the hand-off to the publisher. The statistics belong to the scorer.

use std::sync::Arc;

use crate::domain::answer::Answer;
use crate::domain::deviation::{should_evaluate, ReviewDeviationDetected};
use crate::domain::foundation::{CommandMetadata, SerializableDomainEvent};
use crate::domain::response::{Response, ResponseError};
use crate::domain::review_map::ResponseMap;
use crate::ports::{Clock, DeviationScorer, EventPublisher};

/// Outcome of one evaluation. Never an error: delivery problems are
/// reported here and the submission stands.
#[derive(Debug, Clone, Default)]
pub struct DeviationReport {
    /// The guard passed and the scorer was consulted.
    pub evaluated: bool,
    /// Set when the scorer found a significant deviation.
    pub event: Option<ReviewDeviationDetected>,
    pub delivery_error: Option<ResponseError>,
}

impl DeviationReport {
    fn skipped() -> Self {
        Self::default()
    }
}

pub struct DeviationNotifier {
    scorer: Arc<dyn DeviationScorer>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl DeviationNotifier {
    pub fn new(scorer: Arc<dyn DeviationScorer>, publisher: Arc<dyn EventPublisher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scorer,
            publisher,
            clock,
        }
    }

    pub async fn evaluate(
        &self,
        map: &ResponseMap,
        response: &Response,
        answers: &[Answer],
        was_submitted_before: bool,
        metadata: &CommandMetadata,
    ) -> DeviationReport {
        if !should_evaluate(map.kind(), was_submitted_before, response.is_submitted()) {
            return DeviationReport::skipped();
        }

        let assessment = match self.scorer.assess(map, response, answers).await {
            Ok(Some(assessment)) if assessment.significant => assessment,
            Ok(_) => {
                return DeviationReport {
                    evaluated: true,
                    ..DeviationReport::default()
                }
            }
            Err(e) => {
                tracing::warn!(response_id = %response.id(), error = %e, "deviation scoring failed");
                return DeviationReport {
                    evaluated: true,
                    ..DeviationReport::default()
                };
            }
        };

        let event = ReviewDeviationDetected::from_assessment(*response.id(), *map.id(), &assessment, self.clock.now());
        tracing::info!(
            response_id = %response.id(),
            delta = assessment.delta,
            reference = assessment.reference_score,
            "significant review deviation detected"
        );

        let delivery_error = self.deliver(&event, metadata).await.err();
        DeviationReport {
            evaluated: true,
            event: Some(event),
            delivery_error,
        }
    }

    async fn deliver(&self, event: &ReviewDeviationDetected, metadata: &CommandMetadata) -> Result<(), ResponseError> {
        let envelope = event
            .to_envelope()
            .map_err(|e| ResponseError::NotificationDeliveryFailed(e.to_string()))?
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.user_id.to_string());

        self.publisher.publish(envelope).await.map_err(|e| {
            tracing::warn!(response_id = %event.response_id, error = %e, "deviation notification not delivered");
            ResponseError::NotificationDeliveryFailed(e.message)
        })
    }
}
