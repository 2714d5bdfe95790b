// src/application/state.rs
//
// Composition root. Every collaborator is built here and handed to its
// consumers explicitly.

use std::sync::Arc;

use crate::cache::CacheInvalidator;
use crate::config::CatalogConfig;
use crate::db::{create_connection_pool, get_connection, initialize_database, ConnectionPool};
use crate::error::AppResult;
use crate::repositories::{
    MovieRepository, RatingRepository, SqliteMovieRepository, SqliteRatingRepository,
};
use crate::services::{MovieService, MovieValidator, RatingService};

/// Shared catalog state.
/// All fields are Arc-wrapped for sharing across request handlers.
#[derive(Clone)]
pub struct CatalogState {
    pub movie_service: Arc<MovieService>,
    pub rating_service: Arc<RatingService>,
    pub cache: Arc<dyn CacheInvalidator>,
}

impl CatalogState {
    /// Wire repositories and services over an existing pool.
    /// The schema must already be initialized.
    pub fn new(pool: Arc<ConnectionPool>, cache: Arc<dyn CacheInvalidator>) -> Self {
        // 1. REPOSITORIES
        let movie_repo: Arc<dyn MovieRepository> =
            Arc::new(SqliteMovieRepository::new(Arc::clone(&pool)));
        let rating_repo: Arc<dyn RatingRepository> = Arc::new(SqliteRatingRepository::new(pool));

        // 2. SERVICES
        let validator = Arc::new(MovieValidator::new(Arc::clone(&movie_repo)));
        let movie_service = Arc::new(MovieService::new(
            Arc::clone(&movie_repo),
            Arc::clone(&rating_repo),
            validator,
            Arc::clone(&cache),
        ));
        let rating_service = Arc::new(RatingService::new(
            movie_repo,
            rating_repo,
            Arc::clone(&cache),
        ));

        Self {
            movie_service,
            rating_service,
            cache,
        }
    }

    /// Build the pool from configuration, initialize the schema (idempotent)
    /// and wire everything on top of it.
    pub fn open(config: &CatalogConfig, cache: Arc<dyn CacheInvalidator>) -> AppResult<Self> {
        let pool = Arc::new(create_connection_pool(config)?);
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }

        log::info!("Movie catalog ready ({} max connections)", config.max_connections);
        Ok(Self::new(pool, cache))
    }
}
