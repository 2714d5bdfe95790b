// src/lib.rs
// Movie Catalog - query and mutation engine for a movie catalog
//
// Architecture:
// - Domain-centric: validation rules and listing intent live in the domain
// - Explicit: collaborators are passed in, no global registry
// - Transactional: every multi-statement write commits whole or not at all
// - Cancellable: every operation takes the caller's cancellation token
// - Cache-aware: every committed mutation invalidates the "movies" tag

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repositories;

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub mod cache;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    slugify,
    validate_movie,
    validate_rating,
    FieldViolation,
    // Listing
    ListMoviesRequest,
    ListingOptions,
    // Movie
    Movie,
    // Rating
    MovieRating,
    MoviesPage,
    RatingSummary,
    SortField,
    SortOrder,
    SortSpec,
    // Validation
    ValidationErrors,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Configuration & Database
// ============================================================================

pub use config::CatalogConfig;
pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    MovieRepository, RatingRepository, SqliteMovieRepository, SqliteRatingRepository,
};

// ============================================================================
// PUBLIC API - Cache
// ============================================================================

pub use cache::{CacheInvalidator, EvictionLogEntry, TaggedOutputCache, MOVIES_CACHE_TAG};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{MovieService, MovieValidator, RatingService};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{CatalogState, ErrorResponse, ErrorType, OrNotFound, ToErrorResponse};

pub use tokio_util::sync::CancellationToken;
