// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// Services validate, sequence repository calls and signal cache
// invalidation. They hold no SQL.

pub mod movie_service;
pub mod movie_validator;
pub mod rating_service;

pub use movie_service::MovieService;
pub use movie_validator::MovieValidator;
pub use rating_service::RatingService;
