// Core pipeline exports
pub mod distance;
pub mod filters;
pub mod ranking;
pub mod session;

pub use distance::{distance_km, haversine_distance};
pub use filters::{filter_florists, matches_filters, Facet, FilterError, FilterOptions, FilterState};
pub use ranking::{annotate_distances, rank_by_distance, sort_by_distance, RankState};
pub use session::{DiscoverySession, DiscoveryView, SearchOutcome, SearchTicket, SessionDefaults};
