use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Florist, PriceTier};

/// Services offered as filter toggles
pub const SERVICES: [&str; 2] = ["Delivery", "Pickup"];

/// Categories offered as filter toggles
pub const CATEGORIES: [&str; 7] = [
    "Bouquets", "Wedding", "Modern", "Plants", "Luxury", "Events", "Dried",
];

/// Errors raised by facet toggle events
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid price tier: {0}")]
    InvalidPriceTier(String),

    #[error("Empty value for facet {0}")]
    EmptyValue(Facet),
}

/// Independent filterable dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Price,
    Services,
    Categories,
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Facet::Price => "price",
            Facet::Services => "services",
            Facet::Categories => "categories",
        };
        f.write_str(name)
    }
}

/// Selected values per facet; an empty set imposes no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub price: BTreeSet<PriceTier>,
    #[serde(default)]
    pub services: BTreeSet<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value if absent, remove it if present.
    ///
    /// Returns whether the value is selected after the toggle.
    pub fn toggle(&mut self, facet: Facet, value: &str) -> Result<bool, FilterError> {
        if self.is_selected(facet, value)? {
            self.deselect(facet, value)?;
            Ok(false)
        } else {
            self.select(facet, value)?;
            Ok(true)
        }
    }

    /// Add a value to a facet. Selecting twice is a no-op.
    pub fn select(&mut self, facet: Facet, value: &str) -> Result<(), FilterError> {
        match facet {
            Facet::Price => {
                self.price.insert(parse_tier(value)?);
            }
            Facet::Services => {
                self.services.insert(tag(facet, value)?);
            }
            Facet::Categories => {
                self.categories.insert(tag(facet, value)?);
            }
        }
        Ok(())
    }

    /// Remove a value from a facet. Deselecting an absent value is a no-op.
    pub fn deselect(&mut self, facet: Facet, value: &str) -> Result<(), FilterError> {
        match facet {
            Facet::Price => {
                self.price.remove(&parse_tier(value)?);
            }
            Facet::Services => {
                self.services.remove(&tag(facet, value)?);
            }
            Facet::Categories => {
                self.categories.remove(&tag(facet, value)?);
            }
        }
        Ok(())
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> Result<bool, FilterError> {
        Ok(match facet {
            Facet::Price => self.price.contains(&parse_tier(value)?),
            Facet::Services => self.services.contains(&tag(facet, value)?),
            Facet::Categories => self.categories.contains(&tag(facet, value)?),
        })
    }

    pub fn clear(&mut self) {
        self.price.clear();
        self.services.clear();
        self.categories.clear();
    }

    pub fn has_active_filters(&self) -> bool {
        !self.price.is_empty() || !self.services.is_empty() || !self.categories.is_empty()
    }
}

fn parse_tier(value: &str) -> Result<PriceTier, FilterError> {
    value
        .parse()
        .map_err(|_| FilterError::InvalidPriceTier(value.to_string()))
}

fn tag(facet: Facet, value: &str) -> Result<String, FilterError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FilterError::EmptyValue(facet));
    }
    Ok(trimmed.to_string())
}

/// Facet values the presentation layer renders as toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub price: Vec<PriceTier>,
    pub services: Vec<String>,
    pub categories: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            price: PriceTier::ALL.to_vec(),
            services: SERVICES.iter().map(|s| s.to_string()).collect(),
            categories: CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Check whether a florist satisfies every non-empty facet
///
/// OR within a facet, AND across facets.
#[inline]
pub fn matches_filters(florist: &Florist, filters: &FilterState) -> bool {
    if !filters.price.is_empty() && !filters.price.contains(&florist.price_tier) {
        return false;
    }

    if !filters.services.is_empty()
        && !florist.services.iter().any(|s| filters.services.contains(s)) {
        return false;
    }

    if !filters.categories.is_empty()
        && !florist.categories.iter().any(|c| filters.categories.contains(c)) {
        return false;
    }

    true
}

/// Order-preserving subset of `florists` that passes `filters`
pub fn filter_florists(florists: &[Florist], filters: &FilterState) -> Vec<Florist> {
    florists
        .iter()
        .filter(|florist| matches_filters(florist, filters))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn create_florist(id: u32, tier: PriceTier, services: &[&str], categories: &[&str]) -> Florist {
        Florist {
            id,
            name: format!("Florist {}", id),
            location: Coordinate::new(51.5, -0.1),
            rating: 4.5,
            price_tier: tier,
            image: String::new(),
            services: services.iter().map(|s| s.to_string()).collect(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            top_sellers: vec![],
            description: None,
            address: None,
            reviews: vec![],
            distance: None,
        }
    }

    fn sample() -> Vec<Florist> {
        vec![
            create_florist(1, PriceTier::Budget, &["Delivery"], &["Bouquets"]),
            create_florist(2, PriceTier::Moderate, &["Delivery", "Pickup"], &["Wedding", "Luxury"]),
            create_florist(3, PriceTier::Moderate, &["Pickup"], &["Wedding"]),
            create_florist(4, PriceTier::Premium, &[], &[]),
            create_florist(5, PriceTier::Premium, &["Delivery"], &["Wedding", "Events"]),
        ]
    }

    fn ids(florists: &[Florist]) -> Vec<u32> {
        florists.iter().map(|f| f.id).collect()
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let florists = sample();
        let filtered = filter_florists(&florists, &FilterState::new());

        assert_eq!(filtered, florists);
    }

    #[test]
    fn test_price_filter() {
        let mut filters = FilterState::new();
        filters.toggle(Facet::Price, "$$").unwrap();

        let filtered = filter_florists(&sample(), &filters);

        assert_eq!(ids(&filtered), vec![2, 3]);
    }

    #[test]
    fn test_or_within_facet() {
        let mut filters = FilterState::new();
        filters.select(Facet::Price, "$").unwrap();
        filters.select(Facet::Price, "$$$").unwrap();

        assert_eq!(ids(&filter_florists(&sample(), &filters)), vec![1, 4, 5]);
    }

    #[test]
    fn test_and_across_facets() {
        let mut filters = FilterState::new();
        filters.select(Facet::Services, "Delivery").unwrap();
        filters.select(Facet::Categories, "Wedding").unwrap();

        assert_eq!(ids(&filter_florists(&sample(), &filters)), vec![2, 5]);
    }

    #[test]
    fn test_untagged_florist_fails_tag_filters() {
        let mut filters = FilterState::new();
        filters.select(Facet::Services, "Pickup").unwrap();

        let filtered = filter_florists(&sample(), &filters);
        assert!(!filtered.iter().any(|f| f.id == 4));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut filters = FilterState::new();
        filters.select(Facet::Categories, "Wedding").unwrap();

        let once = filter_florists(&sample(), &filters);
        let twice = filter_florists(&once, &filters);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut filters = FilterState::new();

        assert!(filters.toggle(Facet::Services, "Delivery").unwrap());
        assert!(filters.has_active_filters());
        assert!(!filters.toggle(Facet::Services, "Delivery").unwrap());
        assert_eq!(filters, FilterState::new());
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut filters = FilterState::new();
        filters.select(Facet::Categories, "Dried").unwrap();
        filters.select(Facet::Categories, "Dried").unwrap();

        assert_eq!(filters.categories.len(), 1);

        filters.deselect(Facet::Categories, "Modern").unwrap();
        assert_eq!(filters.categories.len(), 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut filters = FilterState::new();

        assert_eq!(
            filters.toggle(Facet::Price, "$$$$"),
            Err(FilterError::InvalidPriceTier("$$$$".to_string()))
        );
        assert_eq!(
            filters.toggle(Facet::Services, "  "),
            Err(FilterError::EmptyValue(Facet::Services))
        );
        assert!(!filters.has_active_filters());
    }

    #[test]
    fn test_clear() {
        let mut filters = FilterState::new();
        filters.select(Facet::Price, "$").unwrap();
        filters.select(Facet::Services, "Pickup").unwrap();
        filters.clear();

        assert!(!filters.has_active_filters());
    }

    #[test]
    fn test_default_options() {
        let options = FilterOptions::default();
        assert_eq!(options.price.len(), 3);
        assert_eq!(options.services, vec!["Delivery", "Pickup"]);
        assert!(options.categories.contains(&"Wedding".to_string()));
    }
}
