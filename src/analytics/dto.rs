use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use super::engine::{RankedMovie, SentimentDistribution};
use crate::feedback::dto::FeedbackView;
use crate::store::{AgeGroup, MovieStatus};

/// Site-wide analytics view.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub total_movies: u64,
    pub total_feedbacks: u64,
    pub average_rating: f64,
    pub top_movies: Vec<RankedMovie>,
    pub sentiment_distribution: SentimentDistribution,
    pub age_group_distribution: BTreeMap<AgeGroup, u64>,
    pub rating_distribution: BTreeMap<i16, u64>,
    pub recent_feedbacks: Vec<FeedbackView>,
}

/// Machine-readable movie projection for `/api/movies`. Field names and
/// presence are a compatibility contract.
#[derive(Debug, Serialize)]
pub struct MovieSummary {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub status: MovieStatus,
    pub average_rating: f64,
    pub total_feedbacks: u64,
}

/// Aggregate statistics for one movie, for `/api/movies/:id/stats`.
#[derive(Debug, Serialize)]
pub struct MovieStats {
    pub average_rating: f64,
    pub total_feedbacks: u64,
    pub rating_distribution: BTreeMap<i16, u64>,
    pub sentiment_distribution: SentimentDistribution,
}
