use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::store::{AgeGroup, Feedback, Sentiment};

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Request body for submitting feedback on a movie.
#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub rating: i16,
    pub review: String,
    /// Calendar date in `YYYY-MM-DD` form; validated by the submission flow.
    pub watch_date: String,
    pub age_group: AgeGroup,
    #[serde(default)]
    pub would_recommend: bool,
}

/// Feedback as shown to clients. The reviewer's email stays private.
#[derive(Debug, Serialize)]
pub struct FeedbackView {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub customer_name: String,
    pub rating: i16,
    pub review: String,
    pub sentiment: Sentiment,
    #[serde(with = "date_format")]
    pub watch_date: Date,
    pub age_group: AgeGroup,
    pub would_recommend: bool,
    pub created_at: OffsetDateTime,
}

impl From<Feedback> for FeedbackView {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            movie_id: f.movie_id,
            customer_name: f.customer_name,
            rating: f.rating,
            review: f.review,
            sentiment: f.sentiment,
            watch_date: f.watch_date,
            age_group: f.age_group,
            would_recommend: f.would_recommend,
            created_at: f.created_at,
        }
    }
}
