use chrono::{Datelike, Utc};

use super::entity::Movie;
use crate::domain::validation::ValidationErrors;

/// First year a motion picture could have been released
pub const EARLIEST_RELEASE_YEAR: i32 = 1888;

/// Separator used when genre names are aggregated into one column
pub const GENRE_SEPARATOR: char = ',';

/// Validates the storage-independent Movie invariants against today's year
pub fn validate_movie(movie: &Movie) -> Result<(), ValidationErrors> {
    validate_movie_for_year(movie, Utc::now().year())
}

/// Validates all Movie invariants, collecting every violation
pub fn validate_movie_for_year(movie: &Movie, current_year: i32) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if movie.title.trim().is_empty() {
        errors.push("title", "Title cannot be empty");
    } else if !movie.title.chars().any(|c| c.is_ascii_alphanumeric()) {
        // The slug keeps only ASCII letters and digits of the title
        errors.push("title", "Title must contain at least one letter or digit");
    }

    errors.check(
        (EARLIEST_RELEASE_YEAR..=current_year).contains(&movie.year_of_release),
        "year_of_release",
        format!(
            "Year of release must be between {} and {}",
            EARLIEST_RELEASE_YEAR, current_year
        ),
    );

    validate_genres(movie, &mut errors);

    errors.into_result()
}

fn validate_genres(movie: &Movie, errors: &mut ValidationErrors) {
    if movie.genres.is_empty() {
        errors.push("genres", "A movie needs at least one genre");
        return;
    }

    for name in &movie.genres {
        if name.trim().is_empty() {
            errors.push("genres", "Genre names cannot be empty");
        } else if name.contains(GENRE_SEPARATOR) {
            errors.push("genres", format!("Genre '{}' cannot contain a comma", name));
        }
    }
}

/// Movie invariants:
///
/// 1. Identity (UUID) is immutable
/// 2. Title cannot be blank and must give the slug a non-empty stem
/// 3. Release year is plausible (not before the first film, not in the future)
/// 4. At least one genre, no blank names, no duplicates (enforced by the set)
/// 5. Slug is unique across the catalog (checked against storage by MovieValidator)

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_movie() {
        let movie = Movie::new("Inception", 2010, ["Sci-Fi", "Thriller"]);
        assert!(validate_movie_for_year(&movie, 2026).is_ok());
    }

    #[test]
    fn test_blank_title_fails() {
        let movie = Movie::new("   ", 2010, ["Drama"]);
        let err = validate_movie_for_year(&movie, 2026).unwrap_err();
        assert!(err.has_field("title"));
    }

    #[test]
    fn test_title_without_slug_stem_fails() {
        for title in ["!!!", "- -", "?"] {
            let movie = Movie::new(title, 2010, ["Drama"]);
            let err = validate_movie_for_year(&movie, 2026).unwrap_err();
            assert!(err.has_field("title"), "title {:?} should be rejected", title);
            assert_eq!(err.violations.len(), 1);
        }

        let movie = Movie::new("M*A*S*H", 1970, ["Comedy"]);
        assert!(validate_movie_for_year(&movie, 2026).is_ok());
    }

    #[test]
    fn test_future_year_fails() {
        let movie = Movie::new("Tomorrow", 2027, ["Drama"]);
        let err = validate_movie_for_year(&movie, 2026).unwrap_err();
        assert!(err.has_field("year_of_release"));
    }

    #[test]
    fn test_pre_cinema_year_fails() {
        let movie = Movie::new("Daguerreotype", 1850, ["Drama"]);
        assert!(validate_movie_for_year(&movie, 2026).is_err());
    }

    #[test]
    fn test_genre_rules() {
        let no_genres = Movie::new("Empty", 2000, Vec::<String>::new());
        assert!(validate_movie_for_year(&no_genres, 2026)
            .unwrap_err()
            .has_field("genres"));

        let comma = Movie::new("Comma", 2000, ["Sci-Fi,Horror"]);
        assert!(validate_movie_for_year(&comma, 2026).is_err());

        let blank = Movie::new("Blank", 2000, [" "]);
        assert!(validate_movie_for_year(&blank, 2026).is_err());
    }

    #[test]
    fn test_reports_all_violations_together() {
        let movie = Movie::new("", 3000, Vec::<String>::new());
        let err = validate_movie_for_year(&movie, 2026).unwrap_err();
        assert_eq!(err.violations.len(), 3);
    }
}
