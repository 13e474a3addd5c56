//! Feedback aggregation. Pure functions over a snapshot of records; the
//! caller owns fetching the snapshot from the store.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use uuid::Uuid;

use crate::store::{AgeGroup, Feedback, Movie, Sentiment};

/// Default size of the top-movies ranking.
pub const TOP_MOVIES_LIMIT: usize = 5;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Counts by derived sentiment; all three buckets are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentDistribution {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// Per-movie rating summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_feedbacks: u64,
}

/// Entry in the top-movies ranking.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMovie {
    pub movie: Movie,
    pub average_rating: f64,
    pub total_feedbacks: u64,
}

/// Mean rating rounded to one decimal place; `0.0` for an empty snapshot.
pub fn average_rating(feedbacks: &[Feedback]) -> f64 {
    if feedbacks.is_empty() {
        return 0.0;
    }
    let sum: i64 = feedbacks.iter().map(|f| f.rating as i64).sum();
    round1(sum as f64 / feedbacks.len() as f64)
}

/// Count of feedback per star value. All five keys are always present.
pub fn rating_histogram(feedbacks: &[Feedback]) -> BTreeMap<i16, u64> {
    let mut histogram: BTreeMap<i16, u64> = (1..=5).map(|star| (star, 0)).collect();
    for f in feedbacks {
        if let Some(count) = histogram.get_mut(&f.rating) {
            *count += 1;
        }
    }
    histogram
}

/// Counts by stored sentiment.
pub fn sentiment_distribution(feedbacks: &[Feedback]) -> SentimentDistribution {
    let mut dist = SentimentDistribution::default();
    for f in feedbacks {
        match f.sentiment {
            Sentiment::Positive => dist.positive += 1,
            Sentiment::Neutral => dist.neutral += 1,
            Sentiment::Negative => dist.negative += 1,
        }
    }
    dist
}

/// Counts by age group. Zero-count groups are omitted, unlike
/// [`rating_histogram`] which always carries all five keys; consumers
/// depend on the difference.
pub fn age_group_distribution(feedbacks: &[Feedback]) -> BTreeMap<AgeGroup, u64> {
    let mut dist = BTreeMap::new();
    for f in feedbacks {
        *dist.entry(f.age_group).or_insert(0u64) += 1;
    }
    dist
}

/// Rating summaries keyed by movie id, for movies that have feedback.
pub fn per_movie_ratings(feedbacks: &[Feedback]) -> HashMap<Uuid, RatingSummary> {
    let mut sums: HashMap<Uuid, (i64, u64)> = HashMap::new();
    for f in feedbacks {
        let entry = sums.entry(f.movie_id).or_insert((0, 0));
        entry.0 += f.rating as i64;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(movie_id, (sum, count))| {
            (
                movie_id,
                RatingSummary {
                    average_rating: round1(sum as f64 / count as f64),
                    total_feedbacks: count,
                },
            )
        })
        .collect()
}

/// Movies ranked by average rating, best first. Movies without feedback are
/// excluded; ties keep the input order of `movies` (stable sort).
pub fn top_movies(movies: &[Movie], feedbacks: &[Feedback], limit: usize) -> Vec<RankedMovie> {
    let ratings = per_movie_ratings(feedbacks);
    let mut ranked: Vec<RankedMovie> = movies
        .iter()
        .filter_map(|movie| {
            ratings.get(&movie.id).map(|summary| RankedMovie {
                movie: movie.clone(),
                average_rating: summary.average_rating,
                total_feedbacks: summary.total_feedbacks,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MovieStatus;
    use time::{Date, Month, OffsetDateTime};

    fn movie(title: &str) -> Movie {
        Movie {
            id: Uuid::new_v4(),
            title: title.into(),
            description: "d".into(),
            genre: "Drama".into(),
            director: "dir".into(),
            cast: "cast".into(),
            release_date: Date::from_calendar_date(2024, Month::May, 1).unwrap(),
            duration_minutes: 120,
            poster_url: "p".into(),
            trailer_url: None,
            status: MovieStatus::NowShowing,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn feedback(movie_id: Uuid, rating: i16, age_group: AgeGroup) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            movie_id,
            user_id: None,
            customer_name: "n".into(),
            customer_email: "e@example.com".into(),
            rating,
            review: "r".into(),
            sentiment: Sentiment::from_rating(rating),
            watch_date: Date::from_calendar_date(2025, Month::January, 2).unwrap(),
            age_group,
            would_recommend: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn feedbacks(movie_id: Uuid, ratings: &[i16]) -> Vec<Feedback> {
        ratings
            .iter()
            .map(|&r| feedback(movie_id, r, AgeGroup::From26To35))
            .collect()
    }

    #[test]
    fn average_of_empty_snapshot_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let fbs = feedbacks(Uuid::new_v4(), &[5, 5, 4]);
        assert_eq!(average_rating(&fbs), 4.7);
    }

    #[test]
    fn histogram_always_has_five_keys_summing_to_input_len() {
        let empty = rating_histogram(&[]);
        assert_eq!(empty.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(empty.values().sum::<u64>(), 0);

        let fbs = feedbacks(Uuid::new_v4(), &[1, 1, 3, 5, 5, 5]);
        let histogram = rating_histogram(&fbs);
        assert_eq!(histogram.len(), 5);
        assert_eq!(histogram[&1], 2);
        assert_eq!(histogram[&2], 0);
        assert_eq!(histogram[&3], 1);
        assert_eq!(histogram[&4], 0);
        assert_eq!(histogram[&5], 3);
        assert_eq!(histogram.values().sum::<u64>(), fbs.len() as u64);
    }

    #[test]
    fn sentiment_counts_cover_every_record() {
        let fbs = feedbacks(Uuid::new_v4(), &[1, 2, 3, 4, 5]);
        let dist = sentiment_distribution(&fbs);
        assert_eq!(dist.positive, 2);
        assert_eq!(dist.neutral, 1);
        assert_eq!(dist.negative, 2);
        assert_eq!(
            dist.positive + dist.neutral + dist.negative,
            fbs.len() as u64
        );

        assert_eq!(sentiment_distribution(&[]), SentimentDistribution::default());
    }

    #[test]
    fn age_groups_with_no_feedback_are_omitted() {
        let movie_id = Uuid::new_v4();
        let fbs = vec![
            feedback(movie_id, 4, AgeGroup::From18To25),
            feedback(movie_id, 5, AgeGroup::From18To25),
            feedback(movie_id, 3, AgeGroup::Over45),
        ];
        let dist = age_group_distribution(&fbs);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[&AgeGroup::From18To25], 2);
        assert_eq!(dist[&AgeGroup::Over45], 1);
        assert!(!dist.contains_key(&AgeGroup::From26To35));

        assert!(age_group_distribution(&[]).is_empty());
    }

    #[test]
    fn top_movies_ranks_by_average_and_skips_unrated() {
        let a = movie("A");
        let b = movie("B");
        let c = movie("C");
        let movies = vec![a.clone(), b.clone(), c.clone()];

        // A: ten ratings averaging 4.5; B: five averaging 4.8; C: none.
        let mut fbs = feedbacks(a.id, &[4, 4, 4, 4, 4, 5, 5, 5, 5, 5]);
        fbs.extend(feedbacks(b.id, &[5, 5, 5, 5, 4]));

        let ranked = top_movies(&movies, &fbs, TOP_MOVIES_LIMIT);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].movie.id, b.id);
        assert_eq!(ranked[0].average_rating, 4.8);
        assert_eq!(ranked[0].total_feedbacks, 5);
        assert_eq!(ranked[1].movie.id, a.id);
        assert_eq!(ranked[1].average_rating, 4.5);
        assert_eq!(ranked[1].total_feedbacks, 10);
    }

    #[test]
    fn top_movies_truncates_and_breaks_ties_by_input_order() {
        let first = movie("first");
        let second = movie("second");
        let third = movie("third");
        let movies = vec![first.clone(), second.clone(), third.clone()];

        let mut fbs = feedbacks(first.id, &[4]);
        fbs.extend(feedbacks(second.id, &[4]));
        fbs.extend(feedbacks(third.id, &[2]));

        let ranked = top_movies(&movies, &fbs, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].movie.id, first.id);
        assert_eq!(ranked[1].movie.id, second.id);
    }

    #[test]
    fn per_movie_ratings_groups_by_movie() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut fbs = feedbacks(a, &[3, 4]);
        fbs.extend(feedbacks(b, &[5]));

        let ratings = per_movie_ratings(&fbs);
        assert_eq!(ratings[&a].average_rating, 3.5);
        assert_eq!(ratings[&a].total_feedbacks, 2);
        assert_eq!(ratings[&b].average_rating, 5.0);
        assert_eq!(ratings[&b].total_feedbacks, 1);
    }
}
