use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use time::macros::format_description;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    AdminMoviesResponse, CreateMovieRequest, MovieDetailResponse, MovieListQuery,
    MovieListResponse, OverviewResponse,
};
use crate::{
    analytics::engine,
    auth::jwt::AdminUser,
    error::{store_error, ErrorResponse},
    feedback::dto::FeedbackView,
    state::AppState,
    store::{FeedbackFilter, MovieFilter, MovieStatus, NewMovie, StoreError},
};

const NOW_SHOWING_LIMIT: usize = 6;
const UPCOMING_LIMIT: usize = 3;
const RECENT_FEEDBACK_LIMIT: usize = 10;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/movies", get(list_movies))
        .route("/movies/:id", get(movie_detail))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/movies", get(admin_movies).post(create_movie))
        .route("/admin/movies/:id", delete(delete_movie))
}

/// GET /overview — home page summary.
#[instrument(skip(state))]
pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, ErrorResponse> {
    let mut now_showing = state
        .store
        .list_movies(MovieFilter {
            status: Some(MovieStatus::NowShowing),
            genre: None,
        })
        .await
        .map_err(store_error)?;
    now_showing.truncate(NOW_SHOWING_LIMIT);

    let mut upcoming = state
        .store
        .list_movies(MovieFilter {
            status: Some(MovieStatus::Upcoming),
            genre: None,
        })
        .await
        .map_err(store_error)?;
    upcoming.truncate(UPCOMING_LIMIT);

    let total_movies = state.store.count_movies().await.map_err(store_error)?;
    let feedbacks = state
        .store
        .list_feedback(FeedbackFilter::default())
        .await
        .map_err(store_error)?;

    Ok(Json(OverviewResponse {
        now_showing,
        upcoming,
        total_movies,
        total_feedbacks: feedbacks.len() as u64,
        average_rating: engine::average_rating(&feedbacks),
    }))
}

/// GET /movies — filtered listing plus the set of known genre tags.
#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieListQuery>,
) -> Result<Json<MovieListResponse>, ErrorResponse> {
    let movies = state
        .store
        .list_movies(MovieFilter {
            status: query.status,
            genre: query.genre.clone(),
        })
        .await
        .map_err(store_error)?;

    let genres: BTreeSet<String> = state
        .store
        .list_movies(MovieFilter::default())
        .await
        .map_err(store_error)?
        .iter()
        .flat_map(|m| m.genre_tags())
        .collect();

    Ok(Json(MovieListResponse {
        movies,
        genres: genres.into_iter().collect(),
    }))
}

/// GET /movies/:id — detail with recent feedback and aggregates.
#[instrument(skip(state))]
pub async fn movie_detail(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<MovieDetailResponse>, ErrorResponse> {
    let movie = state.store.get_movie(movie_id).await.map_err(|e| match e {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Movie not found".into()),
        e => store_error(e),
    })?;

    let feedbacks = state
        .store
        .list_feedback(FeedbackFilter {
            movie_id: Some(movie.id),
            user_id: None,
        })
        .await
        .map_err(store_error)?;

    let recent_feedback = feedbacks
        .iter()
        .take(RECENT_FEEDBACK_LIMIT)
        .cloned()
        .map(FeedbackView::from)
        .collect();

    Ok(Json(MovieDetailResponse {
        average_rating: engine::average_rating(&feedbacks),
        total_feedbacks: feedbacks.len() as u64,
        sentiment_distribution: engine::sentiment_distribution(&feedbacks),
        recent_feedback,
        movie,
    }))
}

/// GET /admin/movies — management listing, newest first.
#[instrument(skip(state))]
pub async fn admin_movies(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<AdminMoviesResponse>, ErrorResponse> {
    let mut movies = state
        .store
        .list_movies(MovieFilter::default())
        .await
        .map_err(store_error)?;
    movies.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total_users = state.store.count_users().await.map_err(store_error)?;

    info!(admin = %admin.username, "admin movie listing");
    Ok(Json(AdminMoviesResponse {
        movies,
        total_users,
    }))
}

/// POST /admin/movies — add a movie to the catalog.
#[instrument(skip(state, payload))]
pub async fn create_movie(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<crate::store::Movie>), ErrorResponse> {
    for (field, value) in [
        ("title", &payload.title),
        ("description", &payload.description),
        ("genre", &payload.genre),
        ("director", &payload.director),
        ("cast", &payload.cast),
    ] {
        if value.trim().is_empty() {
            return Err((StatusCode::BAD_REQUEST, format!("{field} is required")));
        }
    }
    if payload.duration_minutes <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "duration_minutes must be positive".into(),
        ));
    }

    let format = format_description!("[year]-[month]-[day]");
    let release_date = time::Date::parse(payload.release_date.trim(), &format)
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid release date".to_string()))?;

    let movie = state
        .store
        .create_movie(NewMovie {
            title: payload.title.trim().to_string(),
            description: payload.description,
            genre: payload.genre,
            director: payload.director,
            cast: payload.cast,
            release_date,
            duration_minutes: payload.duration_minutes,
            poster_url: payload.poster_url,
            trailer_url: payload.trailer_url,
            status: payload.status.unwrap_or(MovieStatus::Upcoming),
        })
        .await
        .map_err(store_error)?;

    info!(movie_id = %movie.id, title = %movie.title, admin = %admin.username, "movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// DELETE /admin/movies/:id — removes the movie and its feedback.
#[instrument(skip(state))]
pub async fn delete_movie(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(movie_id): Path<Uuid>,
) -> Result<StatusCode, ErrorResponse> {
    state.store.delete_movie(movie_id).await.map_err(|e| match e {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Movie not found".into()),
        e => store_error(e),
    })?;

    info!(movie_id = %movie_id, admin = %admin.username, "movie deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{AgeGroup, NewFeedback, NewUser, Sentiment, User};
    use time::{Date, Month};

    fn new_movie(title: &str, status: MovieStatus) -> NewMovie {
        NewMovie {
            title: title.into(),
            description: "d".into(),
            genre: "Action, Drama".into(),
            director: "dir".into(),
            cast: "cast".into(),
            release_date: Date::from_calendar_date(2024, Month::May, 1).unwrap(),
            duration_minutes: 100,
            poster_url: None,
            trailer_url: None,
            status,
        }
    }

    fn new_feedback(movie_id: Uuid, rating: i16) -> NewFeedback {
        NewFeedback {
            movie_id,
            user_id: None,
            customer_name: "n".into(),
            customer_email: "e@example.com".into(),
            rating,
            review: "r".into(),
            sentiment: Sentiment::from_rating(rating),
            watch_date: Date::from_calendar_date(2025, Month::March, 3).unwrap(),
            age_group: AgeGroup::From18To25,
            would_recommend: true,
        }
    }

    async fn admin(state: &AppState) -> User {
        state
            .store
            .create_user(NewUser {
                username: "admin".into(),
                email: "admin@cinemapulse.com".into(),
                password_hash: "hash".into(),
                full_name: Some("Admin User".into()),
                is_admin: true,
            })
            .await
            .unwrap()
    }

    fn create_request(title: &str) -> CreateMovieRequest {
        CreateMovieRequest {
            title: title.into(),
            description: "d".into(),
            genre: "Drama".into(),
            director: "dir".into(),
            cast: "cast".into(),
            release_date: "2025-12-15".into(),
            duration_minutes: 140,
            poster_url: None,
            trailer_url: None,
            status: Some(MovieStatus::Upcoming),
        }
    }

    #[tokio::test]
    async fn overview_limits_the_carousels() {
        let state = AppState::fake();
        for i in 0..8 {
            state
                .store
                .create_movie(new_movie(&format!("showing-{i}"), MovieStatus::NowShowing))
                .await
                .unwrap();
        }
        for i in 0..4 {
            state
                .store
                .create_movie(new_movie(&format!("upcoming-{i}"), MovieStatus::Upcoming))
                .await
                .unwrap();
        }

        let view = overview(State(state)).await.expect("overview").0;
        assert_eq!(view.now_showing.len(), 6);
        assert_eq!(view.upcoming.len(), 3);
        assert_eq!(view.total_movies, 12);
        assert_eq!(view.total_feedbacks, 0);
        assert_eq!(view.average_rating, 0.0);
    }

    #[tokio::test]
    async fn listing_filters_and_reports_genres() {
        let state = AppState::fake();
        state
            .store
            .create_movie(new_movie("a", MovieStatus::NowShowing))
            .await
            .unwrap();
        let mut comedy = new_movie("b", MovieStatus::Upcoming);
        comedy.genre = "Comedy".into();
        state.store.create_movie(comedy).await.unwrap();

        let all = list_movies(State(state.clone()), Query(MovieListQuery::default()))
            .await
            .expect("listing")
            .0;
        assert_eq!(all.movies.len(), 2);
        assert_eq!(all.genres, vec!["Action", "Comedy", "Drama"]);

        let filtered = list_movies(
            State(state),
            Query(MovieListQuery {
                status: Some(MovieStatus::Upcoming),
                genre: Some("Comedy".into()),
            }),
        )
        .await
        .expect("listing")
        .0;
        assert_eq!(filtered.movies.len(), 1);
        assert_eq!(filtered.movies[0].title, "b");
        // genre tags still come from the whole catalog
        assert_eq!(filtered.genres.len(), 3);
    }

    #[tokio::test]
    async fn detail_carries_scoped_aggregates() {
        let state = AppState::fake();
        let movie = state
            .store
            .create_movie(new_movie("m", MovieStatus::NowShowing))
            .await
            .unwrap();
        for rating in [5, 3] {
            state
                .store
                .create_feedback(new_feedback(movie.id, rating))
                .await
                .unwrap();
        }

        let detail = movie_detail(State(state), Path(movie.id))
            .await
            .expect("detail")
            .0;
        assert_eq!(detail.average_rating, 4.0);
        assert_eq!(detail.total_feedbacks, 2);
        assert_eq!(detail.sentiment_distribution.positive, 1);
        assert_eq!(detail.sentiment_distribution.neutral, 1);
        assert_eq!(detail.recent_feedback.len(), 2);
    }

    #[tokio::test]
    async fn detail_for_unknown_movie_is_not_found() {
        let state = AppState::fake();
        let err = movie_detail(State(state), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_can_create_and_delete_movies() {
        let state = AppState::fake();
        let admin_user = admin(&state).await;

        let (status, created) = create_movie(
            State(state.clone()),
            AdminUser(admin_user.clone()),
            Json(create_request("Pushpa 2: The Rule")),
        )
        .await
        .expect("create");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.0.status, MovieStatus::Upcoming);

        state
            .store
            .create_feedback(new_feedback(created.0.id, 4))
            .await
            .unwrap();

        let status = delete_movie(
            State(state.clone()),
            AdminUser(admin_user),
            Path(created.0.id),
        )
        .await
        .expect("delete");
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.store.count_movies().await.unwrap(), 0);
        // cascade removed the feedback as well
        assert_eq!(state.store.count_feedback().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_rejects_malformed_release_date() {
        let state = AppState::fake();
        let admin_user = admin(&state).await;
        let mut bad = create_request("x");
        bad.release_date = "15/12/2025".into();
        let err = create_movie(State(state.clone()), AdminUser(admin_user), Json(bad))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(state.store.count_movies().await.unwrap(), 0);
    }
}
