use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalogued movie, as seen by one caller.
///
/// Returned values are copies: changing one never touches storage until it
/// is handed back through an explicit update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Internal immutable identifier
    pub id: Uuid,

    pub title: String,

    pub year_of_release: i32,

    /// Genre names, unique per movie
    pub genres: BTreeSet<String>,

    /// Average over all ratings, one decimal place. `None` when unrated.
    pub rating: Option<f64>,

    /// The calling user's own rating, if any
    pub user_rating: Option<i32>,
}

impl Movie {
    /// Create a new, unrated movie with a fresh identity
    pub fn new<I, S>(title: impl Into<String>, year_of_release: i32, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_id(Uuid::new_v4(), title, year_of_release, genres)
    }

    /// Build a movie for an existing identity (used by updates)
    pub fn with_id<I, S>(id: Uuid, title: impl Into<String>, year_of_release: i32, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            title: title.into(),
            year_of_release,
            genres: genres.into_iter().map(Into::into).collect(),
            rating: None,
            user_rating: None,
        }
    }

    /// URL-safe lookup key derived from title and year
    pub fn slug(&self) -> String {
        slugify(&self.title, self.year_of_release)
    }
}

/// `"Inception", 2010` becomes `inception-2010`
pub fn slugify(title: &str, year_of_release: i32) -> String {
    static SLUG_STRIP: OnceLock<Regex> = OnceLock::new();
    let strip = SLUG_STRIP
        .get_or_init(|| Regex::new(r"[^0-9A-Za-z _-]").expect("slug pattern is valid"));

    let cleaned = strip.replace_all(title, "");
    format!("{}-{}", cleaned.to_lowercase().replace(' ', "-"), year_of_release)
}
