use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Poster shown when a movie is created without one.
pub const DEFAULT_POSTER_URL: &str = "https://via.placeholder.com/300x450";

/// Release status of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieStatus {
    Upcoming,
    NowShowing,
    Released,
}

impl MovieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::Upcoming => "upcoming",
            MovieStatus::NowShowing => "now_showing",
            MovieStatus::Released => "released",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(MovieStatus::Upcoming),
            "now_showing" => Some(MovieStatus::NowShowing),
            "released" => Some(MovieStatus::Released),
            _ => None,
        }
    }
}

/// Three-valued classification derived from the numeric rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Classify a 1..=5 star rating. Computed once at submission time and
    /// stored on the record; never recomputed on read.
    pub fn from_rating(rating: i16) -> Self {
        if rating >= 4 {
            Sentiment::Positive
        } else if rating == 3 {
            Sentiment::Neutral
        } else {
            Sentiment::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

/// Age bracket reported by the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46+")]
    Over45,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::From18To25 => "18-25",
            AgeGroup::From26To35 => "26-35",
            AgeGroup::From36To45 => "36-45",
            AgeGroup::Over45 => "46+",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "18-25" => Some(AgeGroup::From18To25),
            "26-35" => Some(AgeGroup::From26To35),
            "36-45" => Some(AgeGroup::From36To45),
            "46+" => Some(AgeGroup::Over45),
            _ => None,
        }
    }
}

/// Movie record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre: String, // comma-separated tag list, e.g. "Action, Drama"
    pub director: String,
    pub cast: String,
    #[serde(with = "date_format")]
    pub release_date: Date,
    pub duration_minutes: i32,
    pub poster_url: String,
    pub trailer_url: Option<String>,
    pub status: MovieStatus,
    pub created_at: OffsetDateTime,
}

impl Movie {
    /// Individual genre tags, trimmed.
    pub fn genre_tags(&self) -> Vec<String> {
        self.genre
            .split(',')
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect()
    }
}

/// Feedback record. Immutable once persisted; `sentiment` always equals
/// `Sentiment::from_rating(rating)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub rating: i16,
    pub review: String,
    pub sentiment: Sentiment,
    #[serde(with = "date_format")]
    pub watch_date: Date,
    pub age_group: AgeGroup,
    pub would_recommend: bool,
    pub created_at: OffsetDateTime,
}

/// User record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Display name snapshotted onto feedback records.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// Fields required to create a movie.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub genre: String,
    pub director: String,
    pub cast: String,
    pub release_date: Date,
    pub duration_minutes: i32,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub status: MovieStatus,
}

/// Fields required to create a feedback record. Built only by the
/// submission flow, which validates the rating and assigns the sentiment.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub movie_id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub rating: i16,
    pub review: String,
    pub sentiment: Sentiment,
    pub watch_date: Date,
    pub age_group: AgeGroup,
    pub would_recommend: bool,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_admin: bool,
}

/// Optional criteria for movie listings.
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub status: Option<MovieStatus>,
    /// Substring match against the comma-separated genre list.
    pub genre: Option<String>,
}

/// Optional criteria for feedback listings.
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub movie_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}
