use time::{macros::format_description, Date};
use uuid::Uuid;

use super::dto::SubmitFeedbackRequest;
use crate::store::{NewFeedback, Sentiment, User};

/// A submission rejected before persistence, keyed to the failing field.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

fn invalid(field: &'static str, message: &'static str) -> ValidationError {
    ValidationError { field, message }
}

/// Validates a submission and assigns the derived sentiment, yielding a
/// record ready to persist. Any failure aborts before a write happens;
/// the sentiment is computed here exactly once, never on read.
pub fn prepare(
    movie_id: Uuid,
    reviewer: &User,
    input: SubmitFeedbackRequest,
    today: Date,
) -> Result<NewFeedback, ValidationError> {
    if !(1..=5).contains(&input.rating) {
        return Err(invalid("rating", "rating must be between 1 and 5"));
    }

    let review = input.review.trim();
    if review.is_empty() {
        return Err(invalid("review", "review is required"));
    }

    let raw_date = input.watch_date.trim();
    if raw_date.is_empty() {
        return Err(invalid(
            "watch_date",
            "please select the date you watched the movie",
        ));
    }
    let format = format_description!("[year]-[month]-[day]");
    let watch_date = Date::parse(raw_date, &format)
        .map_err(|_| invalid("watch_date", "invalid date format"))?;
    if watch_date > today {
        return Err(invalid("watch_date", "watch date must not be in the future"));
    }

    let sentiment = Sentiment::from_rating(input.rating);

    Ok(NewFeedback {
        movie_id,
        user_id: Some(reviewer.id),
        customer_name: reviewer.display_name().to_string(),
        customer_email: reviewer.email.clone(),
        rating: input.rating,
        review: review.to_string(),
        sentiment,
        watch_date,
        age_group: input.age_group,
        would_recommend: input.would_recommend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AgeGroup;
    use time::{Month, OffsetDateTime};

    fn reviewer() -> User {
        User {
            id: Uuid::new_v4(),
            username: "john_doe".into(),
            email: "john@email.com".into(),
            password_hash: "hash".into(),
            full_name: Some("John Doe".into()),
            is_admin: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn request(rating: i16, watch_date: &str) -> SubmitFeedbackRequest {
        SubmitFeedbackRequest {
            rating,
            review: "solid film".into(),
            watch_date: watch_date.into(),
            age_group: AgeGroup::From26To35,
            would_recommend: true,
        }
    }

    fn today() -> Date {
        Date::from_calendar_date(2025, Month::August, 1).unwrap()
    }

    #[test]
    fn assigns_sentiment_from_rating() {
        let user = reviewer();
        let fb = prepare(Uuid::new_v4(), &user, request(4, "2025-07-15"), today()).unwrap();
        assert_eq!(fb.sentiment, Sentiment::Positive);
        assert_eq!(fb.customer_name, "John Doe");
        assert_eq!(fb.customer_email, "john@email.com");

        let fb = prepare(Uuid::new_v4(), &user, request(3, "2025-07-15"), today()).unwrap();
        assert_eq!(fb.sentiment, Sentiment::Neutral);

        let fb = prepare(Uuid::new_v4(), &user, request(1, "2025-07-15"), today()).unwrap();
        assert_eq!(fb.sentiment, Sentiment::Negative);
    }

    #[test]
    fn snapshots_username_when_full_name_missing() {
        let mut user = reviewer();
        user.full_name = None;
        let fb = prepare(Uuid::new_v4(), &user, request(5, "2025-07-15"), today()).unwrap();
        assert_eq!(fb.customer_name, "john_doe");
    }

    #[test]
    fn out_of_range_ratings_are_rejected() {
        let user = reviewer();
        for rating in [0, 6, -1] {
            let err = prepare(Uuid::new_v4(), &user, request(rating, "2025-07-15"), today())
                .unwrap_err();
            assert_eq!(err.field, "rating");
        }
    }

    #[test]
    fn empty_review_is_rejected() {
        let user = reviewer();
        let mut req = request(4, "2025-07-15");
        req.review = "   ".into();
        let err = prepare(Uuid::new_v4(), &user, req, today()).unwrap_err();
        assert_eq!(err.field, "review");
    }

    #[test]
    fn missing_or_malformed_watch_date_is_rejected() {
        let user = reviewer();
        let err = prepare(Uuid::new_v4(), &user, request(4, ""), today()).unwrap_err();
        assert_eq!(err.field, "watch_date");

        let err = prepare(Uuid::new_v4(), &user, request(4, "15/07/2025"), today()).unwrap_err();
        assert_eq!(err.field, "watch_date");
    }

    #[test]
    fn future_watch_date_is_rejected() {
        let user = reviewer();
        let err = prepare(Uuid::new_v4(), &user, request(4, "2025-08-02"), today()).unwrap_err();
        assert_eq!(err.field, "watch_date");

        // same-day watch is fine
        assert!(prepare(Uuid::new_v4(), &user, request(4, "2025-08-01"), today()).is_ok());
    }
}
