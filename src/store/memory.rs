use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Feedback, FeedbackFilter, Movie, MovieFilter, NewFeedback, NewMovie, NewUser, RecordStore,
    StoreError, StoreResult, User, DEFAULT_POSTER_URL,
};

/// In-process key-value store. Interchangeable with [`super::PostgresStore`]
/// behind the [`RecordStore`] trait; also serves as the test double.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    movies: Vec<Movie>,
    feedback: Vec<Feedback>,
    users: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_movie(&self, new: NewMovie) -> StoreResult<Movie> {
        let movie = Movie {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            genre: new.genre,
            director: new.director,
            cast: new.cast,
            release_date: new.release_date,
            duration_minutes: new.duration_minutes,
            poster_url: new
                .poster_url
                .unwrap_or_else(|| DEFAULT_POSTER_URL.to_string()),
            trailer_url: new.trailer_url,
            status: new.status,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.movies.push(movie.clone());
        Ok(movie)
    }

    async fn get_movie(&self, id: Uuid) -> StoreResult<Movie> {
        self.tables
            .read()
            .await
            .movies
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_movies(&self, filter: MovieFilter) -> StoreResult<Vec<Movie>> {
        let tables = self.tables.read().await;
        let mut movies: Vec<Movie> = tables
            .movies
            .iter()
            .filter(|m| filter.status.map_or(true, |s| m.status == s))
            .filter(|m| {
                filter
                    .genre
                    .as_deref()
                    .map_or(true, |g| m.genre.contains(g))
            })
            .cloned()
            .collect();
        movies.sort_by(|a, b| b.release_date.cmp(&a.release_date));
        Ok(movies)
    }

    async fn delete_movie(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.movies.len();
        tables.movies.retain(|m| m.id != id);
        if tables.movies.len() == before {
            return Err(StoreError::NotFound);
        }
        // cascade
        tables.feedback.retain(|f| f.movie_id != id);
        Ok(())
    }

    async fn count_movies(&self) -> StoreResult<u64> {
        Ok(self.tables.read().await.movies.len() as u64)
    }

    async fn create_feedback(&self, new: NewFeedback) -> StoreResult<Feedback> {
        let mut tables = self.tables.write().await;
        if !tables.movies.iter().any(|m| m.id == new.movie_id) {
            return Err(StoreError::NotFound);
        }
        let feedback = Feedback {
            id: Uuid::new_v4(),
            movie_id: new.movie_id,
            user_id: new.user_id,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            rating: new.rating,
            review: new.review,
            sentiment: new.sentiment,
            watch_date: new.watch_date,
            age_group: new.age_group,
            would_recommend: new.would_recommend,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.feedback.push(feedback.clone());
        Ok(feedback)
    }

    async fn list_feedback(&self, filter: FeedbackFilter) -> StoreResult<Vec<Feedback>> {
        let tables = self.tables.read().await;
        // Collect newest-insertion-first so the stable sort keeps that order
        // for records sharing a timestamp.
        let mut feedback: Vec<Feedback> = tables
            .feedback
            .iter()
            .rev()
            .filter(|f| filter.movie_id.map_or(true, |id| f.movie_id == id))
            .filter(|f| filter.user_id.map_or(true, |id| f.user_id == Some(id)))
            .cloned()
            .collect();
        feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feedback)
    }

    async fn count_feedback(&self) -> StoreResult<u64> {
        Ok(self.tables.read().await.feedback.len() as u64)
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::Duplicate("username"));
        }
        if tables.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            is_admin: new.is_admin,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count_users(&self) -> StoreResult<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}
