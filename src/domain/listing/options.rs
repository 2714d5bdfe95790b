use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invariants::validate_listing_request;
use crate::domain::validation::ValidationErrors;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Raw, untrusted listing parameters as they arrive from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMoviesRequest {
    pub title: Option<String>,
    pub year: Option<i32>,
    /// `title`, `+title` or `-title` (descending); same for `year`
    pub sort_by: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    Year,
}

impl SortField {
    /// Case-insensitive lookup; anything outside the whitelist is `None`
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("title") {
            Some(SortField::Title)
        } else if name.eq_ignore_ascii_case("year") {
            Some(SortField::Year)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// Split a `sort_by` value into its field name and direction.
/// Blank input means "no sorting requested".
pub(crate) fn split_sort_by(sort_by: &str) -> Option<(&str, SortOrder)> {
    let trimmed = sort_by.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(field) = trimmed.strip_prefix('-') {
        Some((field, SortOrder::Descending))
    } else if let Some(field) = trimmed.strip_prefix('+') {
        Some((field, SortOrder::Ascending))
    } else {
        Some((trimmed, SortOrder::Ascending))
    }
}

/// Validated filter / sort / page intent for a movie listing.
///
/// The only way to obtain one is `from_request`, so values reaching the
/// store are always in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingOptions {
    title: Option<String>,
    year_of_release: Option<i32>,
    sort: Option<SortSpec>,
    page: u32,
    page_size: u32,
    user_id: Option<Uuid>,
}

impl ListingOptions {
    /// Validate raw parameters against today's year and normalize them
    pub fn from_request(
        request: &ListMoviesRequest,
        user_id: Option<Uuid>,
    ) -> Result<Self, ValidationErrors> {
        Self::from_request_for_year(request, user_id, Utc::now().year())
    }

    pub fn from_request_for_year(
        request: &ListMoviesRequest,
        user_id: Option<Uuid>,
        current_year: i32,
    ) -> Result<Self, ValidationErrors> {
        validate_listing_request(request, current_year)?;

        let sort = request
            .sort_by
            .as_deref()
            .and_then(split_sort_by)
            .and_then(|(name, order)| SortField::parse(name).map(|field| SortSpec { field, order }));

        // Both range-checked by validate_listing_request
        let page = u32::try_from(request.page.unwrap_or(DEFAULT_PAGE)).map_err(|_| {
            let mut errors = ValidationErrors::new();
            errors.push("page", "Page is out of range");
            errors
        })?;
        let page_size = u32::try_from(request.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
            .map_err(|_| {
                let mut errors = ValidationErrors::new();
                errors.push("page_size", "Page size is out of range");
                errors
            })?;

        Ok(Self {
            title: request
                .title
                .as_ref()
                .filter(|t| !t.is_empty())
                .cloned(),
            year_of_release: request.year,
            sort,
            page,
            page_size,
            user_id,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn year_of_release(&self) -> Option<i32> {
        self.year_of_release
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Rows to skip before this page starts
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}
