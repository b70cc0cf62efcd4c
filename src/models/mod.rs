// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Coordinate, DistanceUnit, Florist, MapView, PriceTier, Product, Review};
pub use requests::{CreateSessionRequest, DiscoveryQuery, SearchRequest, ToggleFilterRequest};
pub use responses::{ErrorResponse, HealthResponse, ListingResponse, SearchResponse, SessionResponse};
