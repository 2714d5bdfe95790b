// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO validation
// - NO cache invalidation
// - Explicit SQL only

pub mod movie_repository;
pub mod rating_aggregation;
pub mod rating_repository;

pub use movie_repository::{MovieRepository, SqliteMovieRepository};
pub use rating_repository::{RatingRepository, SqliteRatingRepository};

#[cfg(test)]
pub use movie_repository::MockMovieRepository;
#[cfg(test)]
pub use rating_repository::MockRatingRepository;
