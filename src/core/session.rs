use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::filters::{filter_florists, Facet, FilterError, FilterState};
use crate::core::ranking::{rank_by_distance, RankState};
use crate::models::{Coordinate, DistanceUnit, Florist, MapView};
use crate::services::{Dataset, Geocoder};

/// Map center used before any search (London)
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(51.505, -0.09);
pub const DEFAULT_ZOOM: u8 = 13;
pub const SEARCH_ZOOM: u8 = 14;

/// Per-deployment settings every new session starts from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionDefaults {
    pub map: MapView,
    pub search_zoom: u8,
    pub unit: DistanceUnit,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            map: MapView {
                center: DEFAULT_CENTER,
                zoom: DEFAULT_ZOOM,
            },
            search_zoom: SEARCH_ZOOM,
            unit: DistanceUnit::default(),
        }
    }
}

/// Handle for a search whose geocode is in flight
///
/// Only the ticket from the most recent `begin_search` can complete; older
/// ones are reported as stale and change nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a submitted search did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOutcome {
    /// Location resolved, list re-ranked and map moved
    Ranked,
    /// Geocoder found nothing; session unchanged
    Unresolved,
    /// A newer search (or a reset) superseded this one; session unchanged
    Stale,
    /// Blank query, nothing submitted
    Ignored,
}

/// Immutable snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryView {
    pub query: Option<String>,
    pub ranking: RankState,
    pub map: MapView,
    pub filters: FilterState,
    pub has_active_filters: bool,
    pub total: usize,
    pub florists: Vec<Florist>,
}

/// State of one user's discovery page
///
/// Holds the search query, ranking, filters and map view. The florist data
/// itself is shared and never mutated; every successful search builds a new
/// ranked list from it.
#[derive(Debug, Clone)]
pub struct DiscoverySession {
    dataset: Arc<Dataset>,
    defaults: SessionDefaults,
    query: Option<String>,
    rank: RankState,
    results: Vec<Florist>,
    filters: FilterState,
    map: MapView,
    generation: u64,
    created_at: DateTime<Utc>,
}

impl DiscoverySession {
    pub fn new(dataset: Arc<Dataset>, defaults: SessionDefaults) -> Self {
        let results = dataset.florists().to_vec();

        Self {
            dataset,
            defaults,
            query: None,
            rank: RankState::Unranked,
            results,
            filters: FilterState::new(),
            map: defaults.map,
            generation: 0,
            created_at: Utc::now(),
        }
    }

    /// Start a search. Blank queries are ignored and return `None`.
    pub fn begin_search(&mut self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.generation += 1;

        Some(SearchTicket {
            generation: self.generation,
            query: query.to_string(),
        })
    }

    /// Apply the geocode result for `ticket`
    pub fn complete_search(&mut self, ticket: SearchTicket, location: Option<Coordinate>) -> SearchOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale search '{}' (generation {} < {})",
                ticket.query,
                ticket.generation,
                self.generation
            );
            return SearchOutcome::Stale;
        }

        let Some(origin) = location else {
            tracing::debug!("Search '{}' unresolved, keeping current results", ticket.query);
            return SearchOutcome::Unresolved;
        };

        self.results = rank_by_distance(self.dataset.florists(), &origin, self.defaults.unit);
        self.rank = RankState::Ranked { origin };
        self.map = MapView {
            center: origin,
            zoom: self.defaults.search_zoom,
        };
        self.query = Some(ticket.query);

        SearchOutcome::Ranked
    }

    /// Geocode `query` and apply the result
    ///
    /// Holds `&mut self` across the lookup; callers sharing a session between
    /// tasks use `begin_search` / `complete_search` around their own lock.
    pub async fn search<G>(&mut self, geocoder: &G, query: &str) -> SearchOutcome
    where
        G: Geocoder + ?Sized,
    {
        let Some(ticket) = self.begin_search(query) else {
            return SearchOutcome::Ignored;
        };

        let location = geocoder.geocode(ticket.query()).await;
        self.complete_search(ticket, location)
    }

    /// Back to dataset order and the default map view
    ///
    /// In-flight searches started before the reset become stale.
    pub fn reset_search(&mut self) {
        self.generation += 1;
        self.query = None;
        self.rank = RankState::Unranked;
        self.results = self.dataset.florists().to_vec();
        self.map = self.defaults.map;
    }

    pub fn toggle_filter(&mut self, facet: Facet, value: &str) -> Result<bool, FilterError> {
        self.filters.toggle(facet, value)
    }

    /// Add a facet value; unlike toggling, repeating it keeps it selected
    pub fn select_filter(&mut self, facet: Facet, value: &str) -> Result<(), FilterError> {
        self.filters.select(facet, value)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn rank_state(&self) -> RankState {
        self.rank
    }

    pub fn map_view(&self) -> MapView {
        self.map
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Ranked (or dataset-ordered) list before filtering
    pub fn results(&self) -> &[Florist] {
        &self.results
    }

    /// Filtered list plus everything needed to render it
    pub fn view(&self) -> DiscoveryView {
        let florists = filter_florists(&self.results, &self.filters);

        DiscoveryView {
            query: self.query.clone(),
            ranking: self.rank,
            map: self.map,
            filters: self.filters.clone(),
            has_active_filters: self.filters.has_active_filters(),
            total: florists.len(),
            florists,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceTier;
    use crate::services::GazetteerGeocoder;

    fn create_florist(id: u32, lat: f64, lng: f64, tier: PriceTier) -> Florist {
        Florist {
            id,
            name: format!("Florist {}", id),
            location: Coordinate::new(lat, lng),
            rating: 4.5,
            price_tier: tier,
            image: String::new(),
            services: vec!["Delivery".to_string()],
            categories: vec![],
            top_sellers: vec![],
            description: None,
            address: None,
            reviews: vec![],
            distance: None,
        }
    }

    fn create_session() -> DiscoverySession {
        let dataset = Dataset::from_florists(vec![
            create_florist(1, 51.60, -0.20, PriceTier::Budget),
            create_florist(2, 51.506, -0.091, PriceTier::Moderate),
            create_florist(3, 53.48, -2.24, PriceTier::Moderate),
        ])
        .unwrap();

        DiscoverySession::new(Arc::new(dataset), SessionDefaults::default())
    }

    fn ids(view: &DiscoveryView) -> Vec<u32> {
        view.florists.iter().map(|f| f.id).collect()
    }

    #[test]
    fn test_new_session_is_unranked() {
        let session = create_session();
        let view = session.view();

        assert_eq!(view.ranking, RankState::Unranked);
        assert_eq!(ids(&view), vec![1, 2, 3]);
        assert_eq!(view.map.center, DEFAULT_CENTER);
        assert_eq!(view.map.zoom, DEFAULT_ZOOM);
        assert!(view.florists.iter().all(|f| f.distance.is_none()));
    }

    #[test]
    fn test_successful_search_ranks_and_moves_map() {
        let mut session = create_session();
        let manchester = Coordinate::new(53.4808, -2.2426);

        let ticket = session.begin_search("Manchester").unwrap();
        let outcome = session.complete_search(ticket, Some(manchester));

        assert_eq!(outcome, SearchOutcome::Ranked);
        let view = session.view();
        assert_eq!(ids(&view), vec![3, 1, 2]);
        assert_eq!(view.map, MapView { center: manchester, zoom: SEARCH_ZOOM });
        assert_eq!(view.query.as_deref(), Some("Manchester"));
    }

    #[test]
    fn test_unresolved_search_changes_nothing() {
        let mut session = create_session();
        let before = session.view();

        let ticket = session.begin_search("###invalid###").unwrap();
        assert_eq!(session.complete_search(ticket, None), SearchOutcome::Unresolved);

        assert_eq!(session.view(), before);
    }

    #[test]
    fn test_stale_completion_discarded() {
        let mut session = create_session();
        let london = Coordinate::new(51.505, -0.09);
        let manchester = Coordinate::new(53.4808, -2.2426);

        let first = session.begin_search("Manchester").unwrap();
        let second = session.begin_search("London").unwrap();

        // Second response arrives first, then the older one
        assert_eq!(session.complete_search(second, Some(london)), SearchOutcome::Ranked);
        assert_eq!(session.complete_search(first, Some(manchester)), SearchOutcome::Stale);

        assert_eq!(session.map_view().center, london);
        assert_eq!(session.view().florists[0].id, 2);
    }

    #[test]
    fn test_blank_query_ignored() {
        let mut session = create_session();
        assert!(session.begin_search("   ").is_none());
    }

    #[test]
    fn test_reset_returns_to_dataset_order() {
        let mut session = create_session();
        let ticket = session.begin_search("Manchester").unwrap();
        session.complete_search(ticket, Some(Coordinate::new(53.4808, -2.2426)));

        let pending = session.begin_search("London").unwrap();
        session.reset_search();

        let view = session.view();
        assert_eq!(view.ranking, RankState::Unranked);
        assert_eq!(ids(&view), vec![1, 2, 3]);
        assert_eq!(view.map, SessionDefaults::default().map);
        assert_eq!(view.query, None);

        assert_eq!(
            session.complete_search(pending, Some(Coordinate::new(51.505, -0.09))),
            SearchOutcome::Stale
        );
    }

    #[test]
    fn test_filters_apply_to_ranked_list() {
        let mut session = create_session();
        let ticket = session.begin_search("Manchester").unwrap();
        session.complete_search(ticket, Some(Coordinate::new(53.4808, -2.2426)));

        session.toggle_filter(Facet::Price, "$$").unwrap();

        let view = session.view();
        assert_eq!(ids(&view), vec![3, 2]);
        assert_eq!(view.total, 2);
        assert!(view.has_active_filters);

        session.clear_filters();
        assert_eq!(session.view().total, 3);
    }

    #[test]
    fn test_select_filter_twice_keeps_selection() {
        let mut session = create_session();

        session.select_filter(Facet::Price, "$$").unwrap();
        session.select_filter(Facet::Price, "$$").unwrap();

        let view = session.view();
        assert!(view.has_active_filters);
        assert_eq!(ids(&view), vec![2, 3]);
        assert!(session.select_filter(Facet::Price, "free").is_err());
    }

    #[tokio::test]
    async fn test_search_with_geocoder() {
        let mut session = create_session();
        let geocoder = GazetteerGeocoder::new([("London", DEFAULT_CENTER)]);

        assert_eq!(session.search(&geocoder, "London").await, SearchOutcome::Ranked);
        assert_eq!(session.search(&geocoder, "Atlantis").await, SearchOutcome::Unresolved);
        assert_eq!(session.search(&geocoder, "").await, SearchOutcome::Ignored);

        assert_eq!(session.rank_state().origin(), Some(DEFAULT_CENTER));
        assert_eq!(session.results()[0].id, 2);
    }
}
