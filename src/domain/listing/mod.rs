pub mod invariants;
pub mod options;
pub mod page;

pub use invariants::{validate_listing_request, MAX_PAGE, PAGE_SIZE_RANGE};
pub use options::{
    ListMoviesRequest, ListingOptions, SortField, SortOrder, SortSpec, DEFAULT_PAGE,
    DEFAULT_PAGE_SIZE,
};
pub use page::MoviesPage;
