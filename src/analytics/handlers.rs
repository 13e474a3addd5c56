use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::{
    dto::{AnalyticsResponse, MovieStats, MovieSummary},
    engine,
};
use crate::{
    error::{store_error, ErrorResponse},
    feedback::dto::FeedbackView,
    state::AppState,
    store::{Feedback, FeedbackFilter, Movie, MovieFilter, StoreError},
};

const RECENT_FEEDBACK_LIMIT: usize = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(site_analytics))
        .route("/api/movies", get(api_movies))
        .route("/api/movies/:id/stats", get(api_movie_stats))
}

/// Snapshot of all movies, degrading to empty on store failure so the
/// analytics view never errors out.
async fn movie_snapshot(state: &AppState) -> Vec<Movie> {
    match state.store.list_movies(MovieFilter::default()).await {
        Ok(movies) => movies,
        Err(e) => {
            error!(error = %e, "movie scan failed; serving empty aggregates");
            Vec::new()
        }
    }
}

async fn feedback_snapshot(state: &AppState, filter: FeedbackFilter) -> Vec<Feedback> {
    match state.store.list_feedback(filter).await {
        Ok(feedback) => feedback,
        Err(e) => {
            error!(error = %e, "feedback scan failed; serving empty aggregates");
            Vec::new()
        }
    }
}

/// GET /analytics — aggregate view over the full feedback snapshot.
#[instrument(skip(state))]
pub async fn site_analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    let movies = movie_snapshot(&state).await;
    let feedbacks = feedback_snapshot(&state, FeedbackFilter::default()).await;

    // snapshot comes back newest-first
    let recent_feedbacks = feedbacks
        .iter()
        .take(RECENT_FEEDBACK_LIMIT)
        .cloned()
        .map(FeedbackView::from)
        .collect();

    Json(AnalyticsResponse {
        total_movies: movies.len() as u64,
        total_feedbacks: feedbacks.len() as u64,
        average_rating: engine::average_rating(&feedbacks),
        top_movies: engine::top_movies(&movies, &feedbacks, engine::TOP_MOVIES_LIMIT),
        sentiment_distribution: engine::sentiment_distribution(&feedbacks),
        age_group_distribution: engine::age_group_distribution(&feedbacks),
        rating_distribution: engine::rating_histogram(&feedbacks),
        recent_feedbacks,
    })
}

/// GET /api/movies — summary projection of every movie.
#[instrument(skip(state))]
pub async fn api_movies(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let movies = movie_snapshot(&state).await;
    let feedbacks = feedback_snapshot(&state, FeedbackFilter::default()).await;
    let ratings = engine::per_movie_ratings(&feedbacks);

    let summaries = movies
        .into_iter()
        .map(|movie| {
            let summary = ratings.get(&movie.id).copied();
            MovieSummary {
                id: movie.id,
                title: movie.title,
                genre: movie.genre,
                status: movie.status,
                average_rating: summary.map_or(0.0, |s| s.average_rating),
                total_feedbacks: summary.map_or(0, |s| s.total_feedbacks),
            }
        })
        .collect();
    Json(summaries)
}

/// GET /api/movies/:id/stats — aggregate statistics scoped to one movie.
#[instrument(skip(state))]
pub async fn api_movie_stats(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<MovieStats>, ErrorResponse> {
    let movie = state.store.get_movie(movie_id).await.map_err(|e| match e {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Movie not found".into()),
        e => store_error(e),
    })?;

    let feedbacks = feedback_snapshot(
        &state,
        FeedbackFilter {
            movie_id: Some(movie.id),
            user_id: None,
        },
    )
    .await;

    Ok(Json(MovieStats {
        average_rating: engine::average_rating(&feedbacks),
        total_feedbacks: feedbacks.len() as u64,
        rating_distribution: engine::rating_histogram(&feedbacks),
        sentiment_distribution: engine::sentiment_distribution(&feedbacks),
    }))
}
