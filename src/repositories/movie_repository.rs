// src/repositories/movie_repository.rs
//
// Movie persistence: movies + genres, with ratings joined on read.
//
// Writes touching both tables run in one transaction. Listing SQL is
// assembled only from the static fragments below; caller input is always
// bound as a parameter.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{named_params, params, Connection, Transaction};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::rating_aggregation::{row_to_rated_movie, RATED_MOVIE_COLUMNS, RATED_MOVIE_FROM};
use crate::db::{ensure_active, run_blocking, within_transaction, ConnectionPool, TxOutcome};
use crate::domain::movie::GENRE_SEPARATOR;
use crate::domain::{ListingOptions, Movie, SortField, SortOrder, SortSpec};
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Insert the movie and its genres. `false` when the id or slug is taken.
    async fn create(&self, movie: &Movie, cancel: &CancellationToken) -> AppResult<bool>;

    async fn get_by_id(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>>;

    async fn get_by_slug(
        &self,
        slug: &str,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>>;

    async fn get_all(
        &self,
        options: &ListingOptions,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Movie>>;

    /// Total rows matching the same filters as `get_all`
    async fn get_count(&self, options: &ListingOptions, cancel: &CancellationToken)
        -> AppResult<u64>;

    /// Replace genres and scalar fields. `false` when no row was updated.
    async fn update(&self, movie: &Movie, cancel: &CancellationToken) -> AppResult<bool>;

    /// `false` when no movie had this id
    async fn delete_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<bool>;

    async fn exists_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<bool>;
}

/// Genres folded into one column per movie, split again by `split_genres`
const GENRE_LIST_JOIN: &str = "LEFT JOIN (SELECT movieid, group_concat(DISTINCT name) AS genres
                FROM genres
                GROUP BY movieid) g ON g.movieid = m.id";

/// Shared by `get_all` and `get_count` so both see the same rows
const LISTING_FILTER: &str = r"WHERE (:title IS NULL OR m.title LIKE :title ESCAPE '\')
       AND (:year IS NULL OR m.yearofrelease = :year)";

const INSERT_GENRE: &str = "INSERT INTO genres (movieid, name) VALUES (?1, ?2)";

/// Fixed ORDER BY per sort choice; id breaks ties so pages never overlap
fn order_clause(sort: Option<SortSpec>) -> &'static str {
    match sort {
        None => "ORDER BY m.id ASC",
        Some(SortSpec { field: SortField::Title, order: SortOrder::Ascending }) => {
            "ORDER BY m.title ASC, m.id ASC"
        }
        Some(SortSpec { field: SortField::Title, order: SortOrder::Descending }) => {
            "ORDER BY m.title DESC, m.id ASC"
        }
        Some(SortSpec { field: SortField::Year, order: SortOrder::Ascending }) => {
            "ORDER BY m.yearofrelease ASC, m.id ASC"
        }
        Some(SortSpec { field: SortField::Year, order: SortOrder::Descending }) => {
            "ORDER BY m.yearofrelease DESC, m.id ASC"
        }
    }
}

/// Substring pattern with LIKE wildcards in the caller's text escaped
fn title_pattern(title: Option<&str>) -> Option<String> {
    title.map(|t| {
        let escaped = t
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

fn split_genres(aggregated: Option<String>) -> BTreeSet<String> {
    aggregated
        .map(|joined| {
            joined
                .split(GENRE_SEPARATOR)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn load_genres(conn: &Connection, movie_id: Uuid) -> Result<BTreeSet<String>, rusqlite::Error> {
    let mut stmt = conn.prepare_cached("SELECT name FROM genres WHERE movieid = ?1")?;
    let names = stmt
        .query_map(params![movie_id.to_string()], |row| row.get::<_, String>(0))?
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(names)
}

fn insert_genres(tx: &Transaction<'_>, movie: &Movie, cancel: &CancellationToken) -> AppResult<()> {
    let mut stmt = tx.prepare_cached(INSERT_GENRE)?;
    for name in &movie.genres {
        ensure_active(cancel)?;
        stmt.execute(params![movie.id.to_string(), name])?;
    }
    Ok(())
}

/// Single-movie read keyed on one column, then genres in a second query
fn find_one(
    conn: &Connection,
    key_column: &'static str,
    key: String,
    user_id: Option<Uuid>,
) -> AppResult<Option<Movie>> {
    let sql = format!(
        "SELECT {} {} WHERE {} = :key",
        RATED_MOVIE_COLUMNS, RATED_MOVIE_FROM, key_column
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    let found = stmt.query_row(
        named_params! {
            ":key": key,
            ":user_id": user_id.map(|u| u.to_string()),
        },
        row_to_rated_movie,
    );

    let mut movie = match found {
        Ok(movie) => movie,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(AppError::Database(e)),
    };

    movie.genres = load_genres(conn, movie.id)?;
    Ok(Some(movie))
}

pub struct SqliteMovieRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMovieRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieRepository for SqliteMovieRepository {
    async fn create(&self, movie: &Movie, cancel: &CancellationToken) -> AppResult<bool> {
        let movie = movie.clone();

        run_blocking(&self.pool, cancel, move |conn, cancel| {
            within_transaction(conn, cancel, |tx, cancel| {
                let inserted = tx.execute(
                    "INSERT INTO movies (id, slug, title, yearofrelease)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT DO NOTHING",
                    params![
                        movie.id.to_string(),
                        movie.slug(),
                        movie.title,
                        movie.year_of_release,
                    ],
                )?;

                if inserted == 0 {
                    log::debug!("Movie {} not inserted: id or slug already taken", movie.id);
                    return Ok(TxOutcome::Rollback(false));
                }

                insert_genres(tx, &movie, cancel)?;
                Ok(TxOutcome::Commit(true))
            })
        })
        .await
    }

    async fn get_by_id(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        run_blocking(&self.pool, cancel, move |conn, _| {
            find_one(conn, "m.id", id.to_string(), user_id)
        })
        .await
    }

    async fn get_by_slug(
        &self,
        slug: &str,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<Movie>> {
        let slug = slug.to_string();

        run_blocking(&self.pool, cancel, move |conn, _| {
            find_one(conn, "m.slug", slug, user_id)
        })
        .await
    }

    async fn get_all(
        &self,
        options: &ListingOptions,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<Movie>> {
        let options = options.clone();

        run_blocking(&self.pool, cancel, move |conn, _| {
            let sql = format!(
                "SELECT {}, g.genres AS genres {} {} {} {} LIMIT :limit OFFSET :offset",
                RATED_MOVIE_COLUMNS,
                RATED_MOVIE_FROM,
                GENRE_LIST_JOIN,
                LISTING_FILTER,
                order_clause(options.sort()),
            );
            log::debug!("Listing movies: {:?}", options);

            let mut stmt = conn.prepare_cached(&sql)?;
            let movies = stmt
                .query_map(
                    named_params! {
                        ":user_id": options.user_id().map(|u| u.to_string()),
                        ":title": title_pattern(options.title()),
                        ":year": options.year_of_release(),
                        ":limit": i64::from(options.page_size()),
                        ":offset": options.offset() as i64,
                    },
                    |row| {
                        let mut movie = row_to_rated_movie(row)?;
                        movie.genres = split_genres(row.get("genres")?);
                        Ok(movie)
                    },
                )?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(movies)
        })
        .await
    }

    async fn get_count(
        &self,
        options: &ListingOptions,
        cancel: &CancellationToken,
    ) -> AppResult<u64> {
        let title = title_pattern(options.title());
        let year = options.year_of_release();

        run_blocking(&self.pool, cancel, move |conn, _| {
            let sql = format!("SELECT COUNT(*) FROM movies m {}", LISTING_FILTER);
            let count: i64 = conn.query_row(
                &sql,
                named_params! { ":title": title, ":year": year },
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn update(&self, movie: &Movie, cancel: &CancellationToken) -> AppResult<bool> {
        let movie = movie.clone();

        run_blocking(&self.pool, cancel, move |conn, cancel| {
            within_transaction(conn, cancel, |tx, cancel| {
                // Genres first: a failed scalar update below rolls all of this back
                tx.execute(
                    "DELETE FROM genres WHERE movieid = ?1",
                    params![movie.id.to_string()],
                )?;
                insert_genres(tx, &movie, cancel)?;
                ensure_active(cancel)?;

                let updated = tx.execute(
                    "UPDATE OR IGNORE movies
                     SET slug = ?2, title = ?3, yearofrelease = ?4
                     WHERE id = ?1",
                    params![
                        movie.id.to_string(),
                        movie.slug(),
                        movie.title,
                        movie.year_of_release,
                    ],
                )?;

                if updated == 0 {
                    log::debug!("Movie {} not updated: row missing or slug taken", movie.id);
                    return Ok(TxOutcome::Rollback(false));
                }

                Ok(TxOutcome::Commit(true))
            })
        })
        .await
    }

    async fn delete_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<bool> {
        run_blocking(&self.pool, cancel, move |conn, cancel| {
            within_transaction(conn, cancel, |tx, cancel| {
                tx.execute("DELETE FROM genres WHERE movieid = ?1", params![id.to_string()])?;
                ensure_active(cancel)?;
                let deleted =
                    tx.execute("DELETE FROM movies WHERE id = ?1", params![id.to_string()])?;
                Ok(TxOutcome::Commit(deleted > 0))
            })
        })
        .await
    }

    async fn exists_by_id(&self, id: Uuid, cancel: &CancellationToken) -> AppResult<bool> {
        run_blocking(&self.pool, cancel, move |conn, _| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM movies WHERE id = ?1)",
                params![id.to_string()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
    }
}
