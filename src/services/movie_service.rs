// src/services/movie_service.rs
//
// Movie mutation coordinator and read pass-through.
//
// Every mutation follows the same lifecycle:
//   Received -> Validated -> (Existence-Checked) -> Persisted -> Invalidated
// Nothing is written when validation or the existence check fails, and the
// cache is only told about mutations that actually committed.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cache::{CacheInvalidator, MOVIES_CACHE_TAG};
use crate::domain::{ListingOptions, Movie, MoviesPage};
use crate::error::{AppError, AppResult};
use crate::repositories::{MovieRepository, RatingRepository};
use crate::services::MovieValidator;

pub struct MovieService {
    movie_repo: Arc<dyn MovieRepository>,
    rating_repo: Arc<dyn RatingRepository>,
    validator: Arc<MovieValidator>,
    cache: Arc<dyn CacheInvalidator>,
}

impl MovieService {
    pub fn new(
        movie_repo: Arc<dyn MovieRepository>,
        rating_repo: Arc<dyn RatingRepository>,
        validator: Arc<MovieValidator>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            movie_repo,
            rating_repo,
            validator,
            cache,
        }
    }

    /// Validate and persist a new movie.
    ///
    /// A store that refuses the insert (id or slug taken by a concurrent
    /// writer) is reported as `AppError::Conflict`, never as success.
    pub async fn create(&self, movie: Movie, cancel: &CancellationToken) -> AppResult<Movie> {
        self.validator.validate(&movie, cancel).await?;

        if !self.movie_repo.create(&movie, cancel).await? {
            return Err(AppError::Conflict(format!(
                "Movie '{}' could not be created",
                movie.slug()
            )));
        }

        log::info!("Created movie {} ({})", movie.id, movie.slug());
        self.invalidate(cancel).await;

        Ok(movie)
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        self.movie_repo.get_by_id(id, user_id, cancel).await
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        self.movie_repo.get_by_slug(slug, user_id, cancel).await
    }

    pub async fn get_all(
        &self,
        options: &ListingOptions,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Movie>> {
        self.movie_repo.get_all(options, cancel).await
    }

    pub async fn get_count(
        &self,
        options: &ListingOptions,
        cancel: &CancellationToken,
    ) -> AppResult<u64> {
        self.movie_repo.get_count(options, cancel).await
    }

    /// One page of movies plus the total under the same filters
    pub async fn get_page(
        &self,
        options: &ListingOptions,
        cancel: &CancellationToken,
    ) -> AppResult<MoviesPage> {
        let items = self.movie_repo.get_all(options, cancel).await?;
        let total = self.movie_repo.get_count(options, cancel).await?;

        Ok(MoviesPage {
            items,
            page: options.page(),
            page_size: options.page_size(),
            total,
        })
    }

    pub async fn exists_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<bool> {
        self.movie_repo.exists_by_id(id, cancel).await
    }

    /// Replace a movie's title, year and genres.
    ///
    /// `Ok(None)` when no movie has this id. The returned record carries the
    /// current average rating and, when `user_id` is given, that user's own.
    pub async fn update(
        &self,
        movie: Movie,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        self.validator.validate(&movie, cancel).await?;

        if !self.movie_repo.exists_by_id(movie.id, cancel).await? {
            return Ok(None);
        }

        if !self.movie_repo.update(&movie, cancel).await? {
            return Err(AppError::Conflict(format!(
                "Movie {} changed while it was being updated",
                movie.id
            )));
        }

        log::info!("Updated movie {} ({})", movie.id, movie.slug());

        // The write has committed: invalidate even if the rating lookup fails
        let shaped = self.attach_ratings(movie, user_id, cancel).await;
        self.invalidate(cancel).await;

        shaped.map(Some)
    }

    /// `false` when no movie had this id
    pub async fn delete_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<bool> {
        let deleted = self.movie_repo.delete_by_id(id, cancel).await?;

        if deleted {
            log::info!("Deleted movie {}", id);
            self.invalidate(cancel).await;
        }

        Ok(deleted)
    }

    async fn attach_ratings(
        &self,
        mut movie: Movie,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Movie> {
        match user_id {
            Some(user_id) => {
                let summary = self.rating_repo.get_rating(movie.id, user_id, cancel).await?;
                movie.rating = summary.average;
                movie.user_rating = summary.user_rating;
            }
            None => {
                movie.rating = self.rating_repo.get_average_rating(movie.id, cancel).await?;
                movie.user_rating = None;
            }
        }
        Ok(movie)
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
    use crate::cache::{MockCacheInvalidator, TaggedOutputCache};
    use crate::db::connection::create_test_pool;
    use crate::domain::{ListMoviesRequest, RatingSummary};
    use crate::repositories::{
        MockMovieRepository, MockRatingRepository, SqliteMovieRepository, SqliteRatingRepository,
    };
    use crate::services::RatingService;
    use mockall::Sequence;
    use serde_json::json;

    fn service(
        movie_repo: MockMovieRepository,
        rating_repo: MockRatingRepository,
        cache: MockCacheInvalidator,
    ) -> MovieService {
        let movie_repo: Arc<dyn MovieRepository> = Arc::new(movie_repo);
        let validator = Arc::new(MovieValidator::new(Arc::clone(&movie_repo)));
        MovieService::new(movie_repo, Arc::new(rating_repo), validator, Arc::new(cache))
    }

    fn expect_eviction(cache: &mut MockCacheInvalidator, times: usize) {
        cache
            .expect_evict_by_tag()
            .withf(|tag, _| tag.to_string() == MOVIES_CACHE_TAG)
            .times(times)
            .returning(|_, _| Ok(()));
    }

    fn inception() -> Movie {
        Movie::new("Inception", 2010, ["Sci-Fi", "Thriller"])
    }

    #[tokio::test]
    async fn test_create_validates_then_persists_then_invalidates() {
        let mut seq = Sequence::new();
        let mut movies = MockMovieRepository::new();
        let mut cache = MockCacheInvalidator::new();

        movies
            .expect_get_by_slug()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(None));
        movies
            .expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));
        cache
            .expect_evict_by_tag()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let service = service(movies, MockRatingRepository::new(), cache);
        let movie = inception();
        let created = service.create(movie.clone(), &CancellationToken::new()).await.unwrap();
        assert_eq!(created, movie);
    }

    #[tokio::test]
    async fn test_invalid_create_writes_nothing() {
        let mut movies = MockMovieRepository::new();
        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies.expect_create().never();
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().never();

        let service = service(movies, MockRatingRepository::new(), cache);
        let err = service
            .create(Movie::new("Inception", 1700, ["Sci-Fi"]), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            AppError::Validation(errors) => assert!(errors.has_field("year_of_release")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refused_create_is_a_conflict() {
        let mut movies = MockMovieRepository::new();
        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies.expect_create().returning(|_, _| Ok(false));
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().never();

        let service = service(movies, MockRatingRepository::new(), cache);
        let err = service.create(inception(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_failed_invalidation_does_not_fail_create() {
        let mut movies = MockMovieRepository::new();
        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies.expect_create().returning(|_, _| Ok(true));
        let mut cache = MockCacheInvalidator::new();
        cache
            .expect_evict_by_tag()
            .times(1)
            .returning(|_, _| Err(AppError::Other("cache offline".to_string())));

        let service = service(movies, MockRatingRepository::new(), cache);
        assert!(service.create(inception(), &CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_movie_short_circuits() {
        let mut movies = MockMovieRepository::new();
        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies.expect_exists_by_id().times(1).returning(|_, _| Ok(false));
        movies.expect_update().never();
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().never();

        let service = service(movies, MockRatingRepository::new(), cache);
        let result = service
            .update(inception(), None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_attaches_caller_rating() {
        let movie = inception();
        let id = movie.id;
        let user = Uuid::new_v4();

        let mut seq = Sequence::new();
        let mut movies = MockMovieRepository::new();
        let mut ratings = MockRatingRepository::new();
        let mut cache = MockCacheInvalidator::new();

        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies
            .expect_exists_by_id()
            .withf(move |candidate, _| *candidate == id)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));
        movies
            .expect_update()
            .withf(move |candidate, _| candidate.id == id)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));
        ratings
            .expect_get_rating()
            .withf(move |movie_id, user_id, _| *movie_id == id && *user_id == user)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| {
                Ok(RatingSummary {
                    average: Some(4.5),
                    user_rating: Some(4),
                })
            });
        cache
            .expect_evict_by_tag()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let service = service(movies, ratings, cache);
        let updated = service
            .update(movie, Some(user), &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.rating, Some(4.5));
        assert_eq!(updated.user_rating, Some(4));
    }

    #[tokio::test]
    async fn test_anonymous_update_attaches_average_only() {
        let mut movies = MockMovieRepository::new();
        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies.expect_exists_by_id().returning(|_, _| Ok(true));
        movies.expect_update().returning(|_, _| Ok(true));
        let mut ratings = MockRatingRepository::new();
        ratings.expect_get_rating().never();
        ratings
            .expect_get_average_rating()
            .times(1)
            .returning(|_, _| Ok(Some(3.0)));
        let mut cache = MockCacheInvalidator::new();
        expect_eviction(&mut cache, 1);

        let service = service(movies, ratings, cache);
        let updated = service
            .update(inception(), None, &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.rating, Some(3.0));
        assert_eq!(updated.user_rating, None);
    }

    #[tokio::test]
    async fn test_zero_row_update_is_a_conflict() {
        let mut movies = MockMovieRepository::new();
        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies.expect_exists_by_id().returning(|_, _| Ok(true));
        movies.expect_update().returning(|_, _| Ok(false));
        let mut cache = MockCacheInvalidator::new();
        cache.expect_evict_by_tag().never();

        let service = service(movies, MockRatingRepository::new(), cache);
        let err = service
            .update(inception(), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_committed_update_invalidates_even_if_rating_lookup_fails() {
        let mut movies = MockMovieRepository::new();
        movies.expect_get_by_slug().returning(|_, _, _| Ok(None));
        movies.expect_exists_by_id().returning(|_, _| Ok(true));
        movies.expect_update().returning(|_, _| Ok(true));
        let mut ratings = MockRatingRepository::new();
        ratings
            .expect_get_average_rating()
            .returning(|_, _| Err(AppError::Pool("exhausted".to_string())));
        let mut cache = MockCacheInvalidator::new();
        expect_eviction(&mut cache, 1);

        let service = service(movies, ratings, cache);
        let err = service
            .update(inception(), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Pool(_)));
    }

    #[tokio::test]
    async fn test_delete_invalidates_only_when_something_was_deleted() {
        let mut movies = MockMovieRepository::new();
        movies.expect_delete_by_id().times(2).returning({
            let mut calls = 0;
            move |_, _| {
                calls += 1;
                Ok(calls == 1)
            }
        });
        let mut cache = MockCacheInvalidator::new();
        expect_eviction(&mut cache, 1);

        let service = service(movies, MockRatingRepository::new(), cache);
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        assert!(service.delete_by_id(id, &cancel).await.unwrap());
        assert!(!service.delete_by_id(id, &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_page_uses_same_options_for_items_and_total() {
        let options =
            ListingOptions::from_request(&ListMoviesRequest::default(), None).unwrap();
        let mut movies = MockMovieRepository::new();
        movies
            .expect_get_all()
            .times(1)
            .returning(|_, _| Ok(vec![Movie::new("Heat", 1995, ["Crime"])]));
        movies.expect_get_count().times(1).returning(|_, _| Ok(11));

        let service = service(movies, MockRatingRepository::new(), MockCacheInvalidator::new());
        let page = service.get_page(&options, &CancellationToken::new()).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.total, 11);
        assert!(page.has_next_page());
    }

    #[tokio::test]
    async fn test_inception_end_to_end() {
        let (_dir, pool) = create_test_pool().unwrap();
        let cache = TaggedOutputCache::new();
        let movie_repo: Arc<dyn MovieRepository> =
            Arc::new(SqliteMovieRepository::new(Arc::clone(&pool)));
        let rating_repo: Arc<dyn RatingRepository> =
            Arc::new(SqliteRatingRepository::new(Arc::clone(&pool)));
        let validator = Arc::new(MovieValidator::new(Arc::clone(&movie_repo)));
        let movies = MovieService::new(
            Arc::clone(&movie_repo),
            Arc::clone(&rating_repo),
            validator,
            Arc::new(cache.clone()),
        );
        let ratings = RatingService::new(movie_repo, rating_repo, Arc::new(cache.clone()));
        let cancel = CancellationToken::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        cache
            .store("/api/movies?page=1", [MOVIES_CACHE_TAG], json!([]))
            .unwrap();
        let movie = movies.create(inception(), &cancel).await.unwrap();
        assert!(cache.is_empty().unwrap());

        let fetched = movies
            .get_by_slug("inception-2010", None, &cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.title, "Inception");
        assert_eq!(fetched.year_of_release, 2010);
        assert_eq!(fetched.genres, movie.genres);
        assert_eq!(fetched.rating, None);
        assert_eq!(fetched.user_rating, None);

        assert!(ratings.rate_movie(movie.id, 5, alice, &cancel).await.unwrap());

        let for_alice = movies.get_by_id(movie.id, Some(alice), &cancel).await.unwrap().unwrap();
        assert_eq!(for_alice.rating, Some(5.0));
        assert_eq!(for_alice.user_rating, Some(5));

        let for_bob = movies.get_by_id(movie.id, Some(bob), &cancel).await.unwrap().unwrap();
        assert_eq!(for_bob.rating, Some(5.0));
        assert_eq!(for_bob.user_rating, None);

        let request = ListMoviesRequest {
            title: Some("incep".to_string()),
            page: Some(1),
            page_size: Some(25),
            ..Default::default()
        };
        let options = ListingOptions::from_request(&request, Some(alice)).unwrap();
        let page = movies.get_page(&options, &cancel).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, movie.id);
        assert_eq!(page.items[0].user_rating, Some(5));

        // Creating the same title and year again is rejected at the gate
        let err = movies.create(inception(), &cancel).await.unwrap_err();
        match err {
            AppError::Validation(errors) => assert!(errors.has_field("slug")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let mut renamed = movie.clone();
        renamed.genres = ["Sci-Fi".to_string()].into_iter().collect();
        let updated = movies
            .update(renamed, Some(alice), &cancel)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.genres.len(), 1);
        assert_eq!(updated.user_rating, Some(5));

        assert!(movies.delete_by_id(movie.id, &cancel).await.unwrap());
        assert!(!movies.exists_by_id(movie.id, &cancel).await.unwrap());

        // create, rate, update, delete
        let evictions = cache.eviction_log().unwrap();
        assert_eq!(evictions.len(), 4);
        assert!(evictions.iter().all(|entry| entry.tag == MOVIES_CACHE_TAG));
    }
}
