// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod listing;
pub mod movie;
pub mod rating;
pub mod validation;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Movie Domain
pub use movie::{slugify, validate_movie, validate_movie_for_year, Movie};

// Rating Domain
pub use rating::{validate_rating, MovieRating, RatingSummary};

// Listing Domain
pub use listing::{
    validate_listing_request, ListMoviesRequest, ListingOptions, MoviesPage, SortField,
    SortOrder, SortSpec,
};

// Validation results
pub use validation::{FieldViolation, ValidationErrors};
