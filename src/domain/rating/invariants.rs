use std::ops::RangeInclusive;

use crate::domain::validation::ValidationErrors;

pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;

/// A rating value must fall in [1, 5]
pub fn validate_rating(rating: i32) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(
        RATING_RANGE.contains(&rating),
        "rating",
        "Rating must be between 1 and 5",
    );
    errors.into_result()
}
