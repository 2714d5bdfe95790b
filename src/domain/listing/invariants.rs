use std::ops::RangeInclusive;

use super::options::{split_sort_by, ListMoviesRequest, SortField, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::domain::validation::ValidationErrors;

pub const PAGE_SIZE_RANGE: RangeInclusive<i64> = 1..=25;

/// Pages are stored as `u32`; anything above cannot be addressed
pub const MAX_PAGE: i64 = u32::MAX as i64;

/// Validates raw listing parameters, collecting every violation.
///
/// Absent page / page size are checked at their defaults.
pub fn validate_listing_request(
    request: &ListMoviesRequest,
    current_year: i32,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Some(year) = request.year {
        errors.check(
            year <= current_year,
            "year",
            format!("Year must be less than or equal to {}", current_year),
        );
    }

    if let Some((name, _)) = request.sort_by.as_deref().and_then(split_sort_by) {
        errors.check(
            SortField::parse(name).is_some(),
            "sort_field",
            "You can only sort by 'title' or 'year'",
        );
    }

    let page = request.page.unwrap_or(DEFAULT_PAGE);
    errors.check(page >= 1, "page", "Page must be at least 1");
    errors.check(
        page <= MAX_PAGE,
        "page",
        format!("Page must be at most {}", MAX_PAGE),
    );

    errors.check(
        PAGE_SIZE_RANGE.contains(&request.page_size.unwrap_or(DEFAULT_PAGE_SIZE)),
        "page_size",
        "Page size must be between 1 and 25",
    );

    errors.into_result()
}
