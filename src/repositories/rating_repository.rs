// src/repositories/rating_repository.rs
//
// Rating persistence: one row per (movie, user).

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::params;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::rating_aggregation::parse_uuid;
use crate::db::{run_blocking, ConnectionPool};
use crate::domain::{MovieRating, RatingSummary};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert or replace the user's rating
    async fn rate_movie(
        &self,
        movie_id: Uuid,
        rating: i32,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;

    async fn get_average_rating(
        &self,
        movie_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Option<f64>>;

    async fn get_rating(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<RatingSummary>;

    async fn delete_rating(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<bool>;

    async fn get_ratings_for_user(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<MovieRating>>;
}

pub struct SqliteRatingRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteRatingRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for SqliteRatingRepository {
    async fn rate_movie(
        &self,
        movie_id: Uuid,
        rating: i32,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        run_blocking(&self.pool, cancel, move |conn, _| {
            let affected = conn.execute(
                "INSERT INTO ratings (movieid, userid, rating)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (movieid, userid) DO UPDATE SET rating = excluded.rating",
                params![movie_id.to_string(), user_id.to_string(), rating],
            )?;
            Ok(affected > 0)
        })
        .await
    }

    async fn get_average_rating(
        &self,
        movie_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Option<f64>> {
        run_blocking(&self.pool, cancel, move |conn, _| {
            let average: Option<f64> = conn.query_row(
                "SELECT ROUND(AVG(rating), 1) FROM ratings WHERE movieid = ?1",
                params![movie_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(average)
        })
        .await
    }

    async fn get_rating(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<RatingSummary> {
        run_blocking(&self.pool, cancel, move |conn, _| {
            let summary = conn.query_row(
                "SELECT ROUND(AVG(rating), 1),
                        (SELECT rating FROM ratings WHERE movieid = ?1 AND userid = ?2)
                 FROM ratings
                 WHERE movieid = ?1",
                params![movie_id.to_string(), user_id.to_string()],
                |row| {
                    Ok(RatingSummary {
                        average: row.get(0)?,
                        user_rating: row.get(1)?,
                    })
                },
            )?;
            Ok(summary)
        })
        .await
    }

    async fn delete_rating(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<bool> {
        run_blocking(&self.pool, cancel, move |conn, _| {
            let deleted = conn.execute(
                "DELETE FROM ratings WHERE movieid = ?1 AND userid = ?2",
                params![movie_id.to_string(), user_id.to_string()],
            )?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn get_ratings_for_user(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<MovieRating>> {
        run_blocking(&self.pool, cancel, move |conn, _| {
            let mut stmt = conn.prepare(
                "SELECT r.movieid, m.slug, r.rating
                 FROM ratings r
                 INNER JOIN movies m ON m.id = r.movieid
                 WHERE r.userid = ?1
                 ORDER BY m.slug",
            )?;

            let ratings = stmt
                .query_map(params![user_id.to_string()], |row| {
                    let movie_id: String = row.get(0)?;
                    Ok(MovieRating {
                        movie_id: parse_uuid(&movie_id, 0)?,
                        slug: row.get(1)?,
                        rating: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ratings)
        })
        .await
    }
}
