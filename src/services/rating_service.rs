// src/services/rating_service.rs
//
// Rating mutations. Ratings appear in every cached movie view, so each
// committed change invalidates the movies tag.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cache::{CacheInvalidator, MOVIES_CACHE_TAG};
use crate::domain::{validate_rating, MovieRating};
use crate::error::AppResult;
use crate::repositories::{MovieRepository, RatingRepository};

pub struct RatingService {
    movie_repo: Arc<dyn MovieRepository>,
    rating_repo: Arc<dyn RatingRepository>,
    cache: Arc<dyn CacheInvalidator>,
}

impl RatingService {
    pub fn new(
        movie_repo: Arc<dyn MovieRepository>,
        rating_repo: Arc<dyn RatingRepository>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            movie_repo,
            rating_repo,
            cache,
        }
    }

    /// Record (or replace) a user's rating. `false` when the movie does not exist.
    pub async fn rate_movie(
        &self,
        movie_id: Uuid,
        rating: i32,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        validate_rating(rating)?;

        if !self.movie_repo.exists_by_id(movie_id, cancel).await? {
            return Ok(false);
        }

        let rated = self
            .rating_repo
            .rate_movie(movie_id, rating, user_id, cancel)
            .await?;

        if rated {
            log::info!("User {} rated movie {} with {}", user_id, movie_id, rating);
            self.invalidate(cancel).await;
        }

        Ok(rated)
    }

    /// `false` when the user had not rated this movie
    pub async fn delete_rating(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        let deleted = self
            .rating_repo
            .delete_rating(movie_id, user_id, cancel)
            .await?;

        if deleted {
            log::info!("User {} removed rating for movie {}", user_id, movie_id);
            self.invalidate(cancel).await;
        }

        Ok(deleted)
    }

    pub async fn get_ratings_for_user(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<MovieRating>> {
        self.rating_repo.get_ratings_for_user(user_id, cancel).await
    }

    async fn invalidate(&self, cancel: &CancellationToken) {
        if let Err(e) = self.cache.evict_by_tag(MOVIES_CACHE_TAG, cancel).await {
            log::warn!("Cache invalidation for tag '{}' failed: {}", MOVIES_CACHE_TAG, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockCacheInvalidator;
    use crate::error::AppError;
    use crate::repositories::{MockMovieRepository, MockRatingRepository};

    fn service(
        movies: MockMovieRepository,
        ratings: MockRatingRepository,
        cache: MockCacheInvalidator,
    ) -> RatingService {
        RatingService::new(Arc::new(movies), Arc::new(ratings), Arc::new(cache))
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_rejected_before_any_lookup() {
        let mut movies = MockMovieRepository::new();
        movies.expect_exists_by_id().never();
        let mut ratings = MockRatingRepository::new();
        ratings.expect_rate_movie().never();
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().never();

        let service = service(movies, ratings, cache);
        for rating in [0, 6] {
            let err = service
                .rate_movie(Uuid::new_v4(), rating, Uuid::new_v4(), &CancellationToken::new())
                .await
                .unwrap_err();
            match err {
                AppError::Validation(errors) => assert!(errors.has_field("rating")),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_rating_missing_movie_writes_nothing() {
        let mut movies = MockMovieRepository::new();
        movies.expect_exists_by_id().returning(|_, _| Ok(false));
        let mut ratings = MockRatingRepository::new();
        ratings.expect_rate_movie().never();
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().never();

        let service = service(movies, ratings, cache);
        let rated = service
            .rate_movie(Uuid::new_v4(), 4, Uuid::new_v4(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!rated);
    }

    #[tokio::test]
    async fn test_rating_invalidates_movies_tag() {
        let mut movies = MockMovieRepository::new();
        movies.expect_exists_by_id().returning(|_, _| Ok(true));
        let mut ratings = MockRatingRepository::new();
        ratings
            .expect_rate_movie()
            .withf(|_, rating, _, _| *rating == 4)
            .times(1)
            .returning(|_, _, _, _| Ok(true));
        let mut cache = MockCacheInvalidator::new();
        cache
            .expect_evict_by_tag()
            .withf(|tag, _| tag.to_string() == MOVIES_CACHE_TAG)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(movies, ratings, cache);
        assert!(service
            .rate_movie(Uuid::new_v4(), 4, Uuid::new_v4(), &CancellationToken::new())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_deleting_absent_rating_skips_invalidation() {
        let mut ratings = MockRatingRepository::new();
        ratings.expect_delete_rating().returning(|_, _, _| Ok(false));
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().never();

        let service = service(MockMovieRepository::new(), ratings, cache);
        assert!(!service
            .delete_rating(Uuid::new_v4(), Uuid::new_v4(), &CancellationToken::new())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_deleting_rating_invalidates() {
        let mut ratings = MockRatingRepository::new();
        ratings.expect_delete_rating().returning(|_, _, _| Ok(true));
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().times(1).returning(|_, _| Ok(()));

        let service = service(MockMovieRepository::new(), ratings, cache);
        assert!(service
            .delete_rating(Uuid::new_v4(), Uuid::new_v4(), &CancellationToken::new())
            .await
            .unwrap());
    }
}
