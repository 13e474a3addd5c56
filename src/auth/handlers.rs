use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
    },
    error::{internal, store_error, ErrorResponse},
    feedback::dto::FeedbackView,
    state::AppState,
    store::{FeedbackFilter, NewUser},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/feedback", get(my_feedback))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ErrorResponse> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();
    let full_name = payload
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    if payload.username.is_empty()
        || payload.email.is_empty()
        || payload.password.is_empty()
        || payload.confirm_password.is_empty()
    {
        return Err((StatusCode::BAD_REQUEST, "All fields are required".into()));
    }

    if payload.password != payload.confirm_password {
        return Err((StatusCode::BAD_REQUEST, "Passwords do not match".into()));
    }

    if payload.password.len() < 6 {
        warn!("password too short");
        return Err((
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters".into(),
        ));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if state
        .store
        .find_user_by_username(&payload.username)
        .await
        .map_err(store_error)?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err((StatusCode::CONFLICT, "Username already exists".into()));
    }

    if state
        .store
        .find_user_by_email(&payload.email)
        .await
        .map_err(store_error)?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password).map_err(internal)?;

    // The first registered account gets the admin flag.
    let is_admin = state.store.count_users().await.map_err(store_error)? == 0;

    let user = state
        .store
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            full_name,
            is_admin,
        })
        .await
        .map_err(store_error)?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id).map_err(internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(internal)?;

    info!(user_id = %user.id, username = %user.username, admin = user.is_admin, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ErrorResponse> {
    let username = payload.username.trim();

    let user = match state
        .store
        .find_user_by_username(username)
        .await
        .map_err(store_error)?
    {
        Some(u) => u,
        None => {
            warn!(username = %username, "login unknown username");
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".into(),
            ));
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(internal)?;
    if !ok {
        warn!(username = %username, user_id = %user.id, "login invalid password");
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid username or password".into(),
        ));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id).map_err(internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(internal)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ErrorResponse> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("{}", e)))?;

    let user = state
        .store
        .get_user(claims.sub)
        .await
        .map_err(|_| (StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let access_token = keys.sign_access(user.id).map_err(internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(internal)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ErrorResponse> {
    let user = state
        .store
        .get_user(user_id)
        .await
        .map_err(|_| (StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    Ok(Json(PublicUser::from(user)))
}

/// The caller's feedback history, newest first.
#[instrument(skip(state))]
pub async fn my_feedback(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FeedbackView>>, ErrorResponse> {
    let feedback = state
        .store
        .list_feedback(FeedbackFilter {
            movie_id: None,
            user_id: Some(user_id),
        })
        .await
        .map_err(store_error)?;
    Ok(Json(feedback.into_iter().map(FeedbackView::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            full_name: None,
            password: "password123".into(),
            confirm_password: "password123".into(),
        }
    }

    #[tokio::test]
    async fn first_account_is_admin_later_ones_are_not() {
        let state = AppState::fake();
        let first = register(State(state.clone()), Json(payload("admin", "admin@cinemapulse.com")))
            .await
            .expect("first registration");
        assert!(first.0.user.is_admin);

        let second = register(State(state.clone()), Json(payload("john_doe", "john@email.com")))
            .await
            .expect("second registration");
        assert!(!second.0.user.is_admin);
    }

    #[tokio::test]
    async fn duplicate_username_does_not_create_a_user() {
        let state = AppState::fake();
        register(State(state.clone()), Json(payload("john_doe", "john@email.com")))
            .await
            .expect("first registration");

        let err = register(
            State(state.clone()),
            Json(payload("john_doe", "other@email.com")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
        assert_eq!(state.store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let state = AppState::fake();
        register(State(state.clone()), Json(payload("john_doe", "john@email.com")))
            .await
            .expect("first registration");

        let err = register(
            State(state.clone()),
            Json(payload("jane_smith", "john@email.com")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn mismatched_passwords_are_rejected() {
        let state = AppState::fake();
        let mut bad = payload("john_doe", "john@email.com");
        bad.confirm_password = "different".into();
        let err = register(State(state), Json(bad)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let state = AppState::fake();
        let mut bad = payload("john_doe", "john@email.com");
        bad.password = "abc".into();
        bad.confirm_password = "abc".into();
        let err = register(State(state), Json(bad)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_credentials() {
        let state = AppState::fake();
        register(State(state.clone()), Json(payload("jane_smith", "jane@email.com")))
            .await
            .expect("registration");

        let response = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "jane_smith".into(),
                password: "password123".into(),
            }),
        )
        .await
        .expect("login");
        assert_eq!(response.0.user.username, "jane_smith");

        let err = login(
            State(state),
            Json(LoginRequest {
                username: "jane_smith".into(),
                password: "wrong".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }
}
