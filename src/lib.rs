//! Florist Finder - store-locator pipeline for independent florists
//!
//! Geocodes a free-text location, ranks the bundled florist dataset by
//! distance and narrows it with price/service/category facets. The HTTP
//! service in `main.rs` exposes the same pipeline as JSON endpoints.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    haversine_distance, DiscoverySession, DiscoveryView, Facet, FilterState, RankState, SearchOutcome,
};
pub use models::{Coordinate, Florist, MapView, PriceTier, Product};
pub use services::{Dataset, Geocoder};
