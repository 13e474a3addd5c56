use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{
    AgeGroup, Feedback, FeedbackFilter, Movie, MovieFilter, MovieStatus, NewFeedback, NewMovie,
    NewUser, RecordStore, Sentiment, StoreError, StoreResult, User, DEFAULT_POSTER_URL,
};

/// Relational store backed by Postgres.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_sqlx(e: sqlx::Error) -> StoreError {
    if matches!(e, sqlx::Error::RowNotFound) {
        return StoreError::NotFound;
    }
    if let sqlx::Error::Database(db) = &e {
        match db.constraint() {
            Some("users_username_key") => return StoreError::Duplicate("username"),
            Some("users_email_key") => return StoreError::Duplicate("email"),
            _ => {}
        }
    }
    StoreError::Unavailable(e.into())
}

#[derive(Debug, FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    description: String,
    genre: String,
    director: String,
    cast_members: String,
    release_date: Date,
    duration_minutes: i32,
    poster_url: String,
    trailer_url: Option<String>,
    status: String,
    created_at: OffsetDateTime,
}

impl MovieRow {
    fn into_movie(self) -> StoreResult<Movie> {
        let status = MovieStatus::parse(&self.status)
            .ok_or_else(|| anyhow::anyhow!("unknown movie status: {}", self.status))?;
        Ok(Movie {
            id: self.id,
            title: self.title,
            description: self.description,
            genre: self.genre,
            director: self.director,
            cast: self.cast_members,
            release_date: self.release_date,
            duration_minutes: self.duration_minutes,
            poster_url: self.poster_url,
            trailer_url: self.trailer_url,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct FeedbackRow {
    id: Uuid,
    movie_id: Uuid,
    user_id: Option<Uuid>,
    customer_name: String,
    customer_email: String,
    rating: i16,
    review: String,
    sentiment: String,
    watch_date: Date,
    age_group: String,
    would_recommend: bool,
    created_at: OffsetDateTime,
}

impl FeedbackRow {
    fn into_feedback(self) -> StoreResult<Feedback> {
        let sentiment = Sentiment::parse(&self.sentiment)
            .ok_or_else(|| anyhow::anyhow!("unknown sentiment: {}", self.sentiment))?;
        let age_group = AgeGroup::parse(&self.age_group)
            .ok_or_else(|| anyhow::anyhow!("unknown age group: {}", self.age_group))?;
        Ok(Feedback {
            id: self.id,
            movie_id: self.movie_id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            rating: self.rating,
            review: self.review,
            sentiment,
            watch_date: self.watch_date,
            age_group,
            would_recommend: self.would_recommend,
            created_at: self.created_at,
        })
    }
}

const MOVIE_COLUMNS: &str = "id, title, description, genre, director, cast_members, release_date, \
     duration_minutes, poster_url, trailer_url, status, created_at";

const FEEDBACK_COLUMNS: &str = "id, movie_id, user_id, customer_name, customer_email, rating, \
     review, sentiment, watch_date, age_group, would_recommend, created_at";

#[async_trait]
impl RecordStore for PostgresStore {
    async fn create_movie(&self, new: NewMovie) -> StoreResult<Movie> {
        let poster_url = new
            .poster_url
            .unwrap_or_else(|| DEFAULT_POSTER_URL.to_string());
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            r#"
            INSERT INTO movies (title, description, genre, director, cast_members,
                                release_date, duration_minutes, poster_url, trailer_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {MOVIE_COLUMNS}
            "#
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.genre)
        .bind(&new.director)
        .bind(&new.cast)
        .bind(new.release_date)
        .bind(new.duration_minutes)
        .bind(&poster_url)
        .bind(&new.trailer_url)
        .bind(new.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        row.into_movie()
    }

    async fn get_movie(&self, id: Uuid) -> StoreResult<Movie> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or(StoreError::NotFound)?;
        row.into_movie()
    }

    async fn list_movies(&self, filter: MovieFilter) -> StoreResult<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(&format!(
            r#"
            SELECT {MOVIE_COLUMNS}
            FROM movies
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR genre LIKE '%' || $2 || '%')
            ORDER BY release_date DESC
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.genre)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.into_iter().map(MovieRow::into_movie).collect()
    }

    async fn delete_movie(&self, id: Uuid) -> StoreResult<()> {
        // feedback rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_movies(&self) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn create_feedback(&self, new: NewFeedback) -> StoreResult<Feedback> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            r#"
            INSERT INTO feedback (movie_id, user_id, customer_name, customer_email, rating,
                                  review, sentiment, watch_date, age_group, would_recommend)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {FEEDBACK_COLUMNS}
            "#
        ))
        .bind(new.movie_id)
        .bind(new.user_id)
        .bind(&new.customer_name)
        .bind(&new.customer_email)
        .bind(new.rating)
        .bind(&new.review)
        .bind(new.sentiment.as_str())
        .bind(new.watch_date)
        .bind(new.age_group.as_str())
        .bind(new.would_recommend)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let missing_movie = matches!(&e, sqlx::Error::Database(db)
                if db.constraint() == Some("feedback_movie_id_fkey"));
            if missing_movie {
                StoreError::NotFound
            } else {
                map_sqlx(e)
            }
        })?;
        row.into_feedback()
    }

    async fn list_feedback(&self, filter: FeedbackFilter) -> StoreResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            r#"
            SELECT {FEEDBACK_COLUMNS}
            FROM feedback
            WHERE ($1::uuid IS NULL OR movie_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.movie_id)
        .bind(filter.user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.into_iter().map(FeedbackRow::into_feedback).collect()
    }

    async fn count_feedback(&self) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedback")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, is_admin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, full_name, is_admin, created_at
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .bind(new.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, is_admin, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .ok_or(StoreError::NotFound)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, is_admin, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, is_admin, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(user)
    }

    async fn count_users(&self) -> StoreResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as u64)
    }
}
