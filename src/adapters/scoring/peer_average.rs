//! Peer-average deviation scorer.
//!
//! Reference aggregate: the mean of the latest submitted version of every
//! sibling map (same assignment, reviewee and kind) in the same round.
//! Significance: `|delta| / max_score * 100 > threshold_percent`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::answer::{mean_score, Answer};
use crate::domain::deviation::DeviationAssessment;
use crate::domain::foundation::DomainError;
use crate::domain::response::versioning::recency_order;
use crate::domain::response::Response;
use crate::domain::review_map::ResponseMap;
use crate::ports::{AnswerRepository, DeviationScorer, ResponseMapReader, ResponseRepository};

/// Significance policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationPolicy {
    pub threshold_percent: f64,
    pub max_score: u32,
}

impl Default for DeviationPolicy {
    fn default() -> Self {
        Self {
            threshold_percent: 15.0,
            max_score: 5,
        }
    }
}

impl DeviationPolicy {
    pub fn is_significant(&self, delta: f64) -> bool {
        if self.max_score == 0 {
            return false;
        }
        delta.abs() / f64::from(self.max_score) * 100.0 > self.threshold_percent
    }
}

pub struct PeerAverageScorer {
    maps: Arc<dyn ResponseMapReader>,
    responses: Arc<dyn ResponseRepository>,
    answers: Arc<dyn AnswerRepository>,
    policy: DeviationPolicy,
}

impl PeerAverageScorer {
    pub fn new(
        maps: Arc<dyn ResponseMapReader>,
        responses: Arc<dyn ResponseRepository>,
        answers: Arc<dyn AnswerRepository>,
        policy: DeviationPolicy,
    ) -> Self {
        Self {
            maps,
            responses,
            answers,
            policy,
        }
    }

    /// Mean score of a sibling's latest submitted version, if it has one.
    async fn peer_mean(&self, sibling: &ResponseMap, round: Option<u32>) -> Result<Option<f64>, DomainError> {
        let versions = self.responses.find_by_map_and_round(sibling.id(), round).await?;
        let latest = versions
            .iter()
            .filter(|v| v.is_submitted())
            .min_by(|a, b| recency_order(a, b));
        match latest {
            Some(version) => {
                let answers = self.answers.find_by_response(version.id()).await?;
                Ok(mean_score(&answers))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DeviationScorer for PeerAverageScorer {
    async fn assess(
        &self,
        map: &ResponseMap,
        response: &Response,
        answers: &[Answer],
    ) -> Result<Option<DeviationAssessment>, DomainError> {
        let submitted_score = match mean_score(answers) {
            Some(score) => score,
            None => return Ok(None),
        };

        let mut peer_means = Vec::new();
        for sibling in self.maps.find_siblings(map).await? {
            if let Some(mean) = self.peer_mean(&sibling, response.round()).await? {
                peer_means.push(mean);
            }
        }
        if peer_means.is_empty() {
            return Ok(None);
        }

        let reference_score = peer_means.iter().sum::<f64>() / peer_means.len() as f64;
        let delta = submitted_score - reference_score;
        Ok(Some(DeviationAssessment {
            submitted_score,
            reference_score,
            delta,
            significant: self.policy.is_significant(delta),
        }))
    }
}
