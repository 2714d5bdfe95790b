pub mod entity;
pub mod invariants;

pub use entity::{slugify, Movie};
pub use invariants::{
    validate_movie, validate_movie_for_year, EARLIEST_RELEASE_YEAR, GENRE_SEPARATOR,
};
