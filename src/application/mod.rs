// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - This layer sits ABOVE the services
// - It wires the catalog together explicitly (no global registry)
// - It translates AppError into client-visible reports
// - Routing and transport stay outside the crate

pub mod error_handling;
pub mod state;

pub use error_handling::{ErrorResponse, ErrorType, OrNotFound, ToErrorResponse};
pub use state::CatalogState;
