// Service exports
pub mod dataset;
pub mod geocoder;
pub mod sessions;

pub use dataset::{Dataset, DatasetError};
pub use geocoder::{GazetteerGeocoder, GeocodeError, Geocoder, NominatimGeocoder};
pub use sessions::{run_search, SessionHandle, SessionStore};
