use serde::{Deserialize, Serialize};

use crate::domain::movie::Movie;

/// One page of a listing plus the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviesPage {
    pub items: Vec<Movie>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl MoviesPage {
    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < self.total
    }
}
