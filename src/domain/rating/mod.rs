pub mod entity;
pub mod invariants;

pub use entity::{MovieRating, RatingSummary};
pub use invariants::{validate_rating, RATING_RANGE};
