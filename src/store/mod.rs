use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
mod types;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use types::*;

/// Errors surfaced by a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{0} already taken")]
    Duplicate(&'static str),
    #[error("store unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator for movies, feedback and users.
///
/// Both backends implement the same contract so call sites never
/// special-case the storage flavor. Listings come back newest-first:
/// movies by release date, feedback by creation time.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_movie(&self, new: NewMovie) -> StoreResult<Movie>;
    async fn get_movie(&self, id: Uuid) -> StoreResult<Movie>;
    async fn list_movies(&self, filter: MovieFilter) -> StoreResult<Vec<Movie>>;
    /// Deletes the movie and all of its feedback.
    async fn delete_movie(&self, id: Uuid) -> StoreResult<()>;
    async fn count_movies(&self) -> StoreResult<u64>;

    async fn create_feedback(&self, new: NewFeedback) -> StoreResult<Feedback>;
    async fn list_feedback(&self, filter: FeedbackFilter) -> StoreResult<Vec<Feedback>>;
    async fn count_feedback(&self) -> StoreResult<u64>;

    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: Uuid) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn count_users(&self) -> StoreResult<u64>;
}
