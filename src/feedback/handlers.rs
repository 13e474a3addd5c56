use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{FeedbackView, SubmitFeedbackRequest},
    submission,
};
use crate::{
    auth::jwt::AuthUser,
    error::{store_error, ErrorResponse},
    state::AppState,
    store::StoreError,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/movies/:id/feedback", post(submit_feedback))
}

/// POST /movies/:id/feedback
///
/// Validated -> SentimentAssigned -> Persisted; any validation failure
/// aborts before the store is touched.
#[instrument(skip(state, payload))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(movie_id): Path<Uuid>,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackView>), ErrorResponse> {
    let movie = state.store.get_movie(movie_id).await.map_err(|e| match e {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Movie not found".into()),
        e => store_error(e),
    })?;

    let reviewer = state
        .store
        .get_user(user_id)
        .await
        .map_err(|_| (StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let today = OffsetDateTime::now_utc().date();
    let new = submission::prepare(movie.id, &reviewer, payload, today)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let feedback = state.store.create_feedback(new).await.map_err(store_error)?;

    info!(
        feedback_id = %feedback.id,
        movie_id = %movie.id,
        rating = feedback.rating,
        sentiment = feedback.sentiment.as_str(),
        "feedback submitted"
    );
    Ok((StatusCode::CREATED, Json(feedback.into())))
}
