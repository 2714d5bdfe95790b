use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's rating of one movie, as listed for that user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRating {
    pub movie_id: Uuid,
    pub slug: String,
    pub rating: i32,
}

/// Shared average plus the caller's own rating for a single movie
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// `None` when nobody has rated the movie
    pub average: Option<f64>,
    pub user_rating: Option<i32>,
}
