// src/services/movie_validator.rs
//
// Validation gate for movie writes.
//
// Combines the pure domain rules with the one rule that needs storage:
// no other movie may already own the slug.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use tokio_util::sync::CancellationToken;

use crate::domain::{validate_movie_for_year, Movie, ValidationErrors};
use crate::error::{AppError, AppResult};
use crate::repositories::MovieRepository;

pub struct MovieValidator {
    movie_repo: Arc<dyn MovieRepository>,
}

impl MovieValidator {
    pub fn new(movie_repo: Arc<dyn MovieRepository>) -> Self {
        Self { movie_repo }
    }

    /// `Err(AppError::Validation)` with every violation when the movie is rejected
    pub async fn validate(&self, movie: &Movie, cancel: &CancellationToken) -> AppResult<()> {
        self.validate_for_year(movie, Utc::now().year(), cancel).await
    }

    pub async fn validate_for_year(
        &self,
        movie: &Movie,
        current_year: i32,
        cancel: &CancellationToken,
    ) -> AppResult<()> {
        let mut errors = match validate_movie_for_year(movie, current_year) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        // A rejected title has no meaningful slug to check
        if !errors.has_field("title") {
            let slug = movie.slug();
            let owner = self.movie_repo.get_by_slug(&slug, None, cancel).await?;
            if owner.is_some_and(|existing| existing.id != movie.id) {
                errors.push("slug", "This movie already exists in the system");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            log::warn!("Rejected movie {}: {}", movie.id, errors);
            Err(AppError::Validation(errors))
        }
    }
}
