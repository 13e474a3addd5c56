use serde::{Deserialize, Serialize};

use crate::analytics::engine::SentimentDistribution;
use crate::feedback::dto::FeedbackView;
use crate::store::{Movie, MovieStatus};

/// Query string for the movie listing; absent fields mean "all".
#[derive(Debug, Default, Deserialize)]
pub struct MovieListQuery {
    pub status: Option<MovieStatus>,
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    /// Every genre tag in the catalog, sorted.
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    pub movie: Movie,
    pub average_rating: f64,
    pub total_feedbacks: u64,
    pub sentiment_distribution: SentimentDistribution,
    pub recent_feedback: Vec<FeedbackView>,
}

/// Home page summary.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub now_showing: Vec<Movie>,
    pub upcoming: Vec<Movie>,
    pub total_movies: u64,
    pub total_feedbacks: u64,
    pub average_rating: f64,
}

/// Request body for the admin create-movie endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: String,
    pub genre: String,
    pub director: String,
    pub cast: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub release_date: String,
    pub duration_minutes: i32,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub status: Option<MovieStatus>,
}

#[derive(Debug, Serialize)]
pub struct AdminMoviesResponse {
    pub movies: Vec<Movie>,
    pub total_users: u64,
}
