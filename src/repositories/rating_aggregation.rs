// src/repositories/rating_aggregation.rs
//
// Read-side rating joins shared by every query that returns a Movie.
//
// Two independent joins against `ratings`:
// - `avg_r` is pre-aggregated per movie, so the average sees every rating once
// - `myr` is keyed on (movie, :user_id) and contributes at most one row
// Neither can multiply the other's rows.

use std::collections::BTreeSet;

use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use crate::domain::Movie;

/// Scalar movie columns plus both rating views
pub(crate) const RATED_MOVIE_COLUMNS: &str = "m.id AS id,
            m.title AS title,
            m.yearofrelease AS yearofrelease,
            ROUND(avg_r.average, 1) AS rating,
            myr.rating AS userrating";

/// Binds `:user_id`; NULL (anonymous) never matches a rating row
pub(crate) const RATED_MOVIE_FROM: &str = "FROM movies m
     LEFT JOIN (SELECT movieid, AVG(rating) AS average
                FROM ratings
                GROUP BY movieid) avg_r ON avg_r.movieid = m.id
     LEFT JOIN ratings myr ON myr.movieid = m.id AND myr.userid = :user_id";

pub(crate) fn parse_uuid(value: &str, column: usize) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Map a row selected with `RATED_MOVIE_COLUMNS`. Genres are filled in by the caller.
pub(crate) fn row_to_rated_movie(row: &Row) -> Result<Movie, rusqlite::Error> {
    let id_str: String = row.get("id")?;
    let id = parse_uuid(&id_str, 0)?;

    Ok(Movie {
        id,
        title: row.get("title")?,
        year_of_release: row.get("yearofrelease")?,
        genres: BTreeSet::new(),
        rating: row.get("rating")?,
        user_rating: row.get("userrating")?,
    })
}
